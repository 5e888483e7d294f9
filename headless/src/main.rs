use clap::{Parser, ValueEnum};
use heateq_core::io::DEFAULT_OUTPUT_PATH;
use heateq_core::{
    BackendKind, BoundaryMode, EngineConfig, HeatSimulation, Material, Meters, Result, Seconds,
    SimulationParameters, SplitPlate, SwapProtocol, TextGridWriter,
};
use std::num::NonZeroUsize;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Heat diffusion across a metal plate, left half hot and right half cold
#[derive(Parser, Debug)]
#[command(name = "heateq")]
#[command(about = "Parallel FTCS heat equation solver", long_about = None)]
struct Args {
    /// Grid size as WIDTHxHEIGHT cells (1 cell = 1 mm)
    #[arg(short, long, value_parser = parse_size)]
    size: Option<(usize, usize)>,

    /// Number of iterations
    #[arg(short = 'I', long)]
    iterations: Option<usize>,

    /// Time step in seconds
    #[arg(short = 't', long)]
    delta_t: Option<f64>,

    /// Grid spacing in metres (extension; the classic program fixes 0.001)
    #[arg(long)]
    delta_s: Option<f64>,

    /// Plate material (copper, aluminium, iron, silver)
    #[arg(short, long)]
    material: Option<Material>,

    /// JSON file with simulation parameters; flags above override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Worker threads for the barrier backend
    #[arg(short, long, default_value_t = 4)]
    workers: usize,

    /// Solver backend
    #[arg(short, long, value_enum, default_value_t = BackendArg::Barrier)]
    backend: BackendArg,

    /// How workers exchange buffer roles between rounds
    #[arg(long, value_enum, default_value_t = SwapArg::LocalFlip)]
    swap: SwapArg,

    /// Treatment of edge cells that lack a neighbour
    #[arg(long, value_enum, default_value_t = BoundaryArg::Omitted)]
    boundary: BoundaryArg,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_OUTPUT_PATH)]
    output: PathBuf,

    /// Also write the grid every N iterations (and at t = 0)
    #[arg(long)]
    snapshot_every: Option<NonZeroUsize>,

    /// Starting temperature of the left half
    #[arg(long, default_value_t = 550.5)]
    hot: f64,

    /// Starting temperature of the right half
    #[arg(long, default_value_t = 200.2)]
    cold: f64,

    /// Omit the `~~ t = ...s ~~` line before each grid
    #[arg(long)]
    no_header: bool,

    /// Skip the starting grid and write only the final one
    #[arg(long)]
    no_initial: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BackendArg {
    Barrier,
    Rayon,
    Sequential,
}

impl From<BackendArg> for BackendKind {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Barrier => BackendKind::Barrier,
            BackendArg::Rayon => BackendKind::Rayon,
            BackendArg::Sequential => BackendKind::Sequential,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SwapArg {
    LocalFlip,
    LeaderBarrier,
}

impl From<SwapArg> for SwapProtocol {
    fn from(arg: SwapArg) -> Self {
        match arg {
            SwapArg::LocalFlip => SwapProtocol::LocalFlip,
            SwapArg::LeaderBarrier => SwapProtocol::LeaderBarrier,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum BoundaryArg {
    Omitted,
    Insulated,
}

impl From<BoundaryArg> for BoundaryMode {
    fn from(arg: BoundaryArg) -> Self {
        match arg {
            BoundaryArg::Omitted => BoundaryMode::Omitted,
            BoundaryArg::Insulated => BoundaryMode::Insulated,
        }
    }
}

fn parse_size(s: &str) -> std::result::Result<(usize, usize), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let width = w.trim().parse().map_err(|e| format!("bad width '{w}': {e}"))?;
    let height = h.trim().parse().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok((width, height))
}

/// Config file (or defaults), then explicit flags on top.
///
/// Ranges are checked later by `SimulationParameters::validate`.
fn build_parameters(args: &Args) -> Result<SimulationParameters> {
    let mut params = match &args.config {
        Some(path) => SimulationParameters::from_json_file(path)?,
        None => SimulationParameters::default(),
    };
    if let Some((width, height)) = args.size {
        params.width = width;
        params.height = height;
    }
    if let Some(iterations) = args.iterations {
        params.num_iterations = iterations;
    }
    if let Some(delta_t) = args.delta_t {
        params.delta_t = Seconds::new_unchecked(delta_t);
    }
    if let Some(delta_s) = args.delta_s {
        params.delta_s = Meters::new_unchecked(delta_s);
    }
    if let Some(material) = args.material {
        params.material = material;
    }
    Ok(params)
}

fn run(args: &Args) -> Result<()> {
    let params = build_parameters(args)?;
    let engine = EngineConfig {
        swap_protocol: args.swap.into(),
        boundary: args.boundary.into(),
        ..EngineConfig::with_workers(args.workers)?
    };

    println!("=== Heat Equation Simulation ===\n");
    println!(
        "Plate: {}x{} cells of {}, material {}",
        params.width, params.height, params.delta_s, params.material
    );
    println!(
        "Time step: {} ({} iterations), stability limit {:.5}s",
        params.delta_t,
        params.num_iterations,
        params.stability_limit()
    );

    let mut sim = HeatSimulation::new(params, engine, args.backend.into())?
        .with_snapshot_every(args.snapshot_every)
        .with_initial_snapshot(!args.no_initial);
    sim.populate(&SplitPlate {
        hot: args.hot,
        cold: args.cold,
    });

    let mut writer = TextGridWriter::create(&args.output)?.with_header(!args.no_header);
    let summary = sim.run(&mut writer)?;
    writer.flush()?;

    println!("\n=== Simulation Complete ===");
    println!("Backend: {} ({} worker(s))", sim.backend().name(), sim.backend().workers());
    println!(
        "Simulated time: {:.6}s over {} iterations",
        summary.simulated_seconds, summary.iterations
    );
    println!(
        "Temperature: min {:.2}, max {:.2}, mean {:.2}",
        summary.min_temperature, summary.max_temperature, summary.mean_temperature
    );
    println!("Output written to {}", args.output.display());
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    debug!(?args, "parsed arguments");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("heateq: {e}");
            ExitCode::FAILURE
        }
    }
}
