use clap::Parser;
use holodeck_runner::{
    HoldAgent, ScheduledAgent, Simulation, SimulationConfig, SimulationError,
};
use log::error;
use std::path::PathBuf;
use std::process::ExitCode;

/// Holodeck - replay historical ticks against a simulated trading account
#[derive(Parser, Debug)]
#[command(name = "holodeck")]
#[command(about = "Replay historical ticks against a simulated trading account")]
#[command(version)]
struct Args {
    /// JSON run configuration
    #[arg(long, short)]
    config: PathBuf,

    /// Tick CSV (overrides csv.filepath)
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Speed multiplier (overrides speed.multiplier)
    #[arg(long)]
    speed: Option<f64>,

    /// JSON order schedule to replay; without it the agent only holds
    #[arg(long)]
    orders: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&args.log_level))
        .init();

    match run(&args) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            error!("{}", err);
            eprintln!("holodeck: {}", err);
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(args: &Args) -> Result<u8, SimulationError> {
    let mut config = SimulationConfig::load(&args.config)?;
    if let Some(csv) = &args.csv {
        config.csv.filepath = csv.clone();
    }
    if let Some(speed) = args.speed {
        config.speed.multiplier = speed;
    }

    let mut simulation = Simulation::from_csv(&config)?;
    match &args.orders {
        Some(path) => {
            let mut agent = ScheduledAgent::load(path)?;
            simulation.run(&mut agent)?;
        }
        None => {
            simulation.run(&mut HoldAgent)?;
        }
    }

    println!("{}", simulation.report());
    Ok(if simulation.is_blown() {
        SimulationError::AccountBlown.exit_code()
    } else {
        0
    })
}
