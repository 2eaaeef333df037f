use clap::Parser;
use log::*;
use royale_queen::*;
use std::io;
use std::process::ExitCode;

/// Queen agent. Reads the game state from stdin, writes commands to stdout
/// and logs to stderr.
#[derive(Parser, Debug)]
#[command(name = "royale-queen", version)]
struct Args {
    /// Log level for stderr output (off, error, warn, info, debug, trace).
    #[arg(long, default_value = "warn")]
    log_level: LevelFilter,

    /// Override the path planner's expansion cap.
    #[arg(long)]
    max_expansions: Option<usize>,

    /// Override the distance at which enemy knights count as a threat.
    #[arg(long)]
    threat_radius: Option<f64>,
}

fn main() -> ExitCode {
    let args = Args::parse();

    env_logger::Builder::new()
        .filter_level(args.log_level)
        .format_timestamp(None)
        .init();

    let mut config = AgentConfig::default();
    if let Some(max_expansions) = args.max_expansions {
        config.path.max_expansions = max_expansions;
    }
    if let Some(threat_radius) = args.threat_radius {
        config.threat_radius = threat_radius;
    }
    debug!("Config: {:?}", config);

    let stdin = io::stdin();
    let stdout = io::stdout();
    match run(stdin.lock(), stdout.lock(), config) {
        Ok(ticks) => {
            info!("Finished after {} ticks", ticks);
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
