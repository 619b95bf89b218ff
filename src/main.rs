use std::path::PathBuf;

use clap::Parser;
use edgarwatch::app::{App, Config};
use tokio::signal;
use tracing::{error, info};

/// Watch the SEC EDGAR feed and resolve earnings prediction markets.
#[derive(Parser)]
#[command(name = "edgarwatch", version, about)]
struct Cli {
    /// Path to the configuration file.
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
    /// Alert and resolve, but never submit orders.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let _ = dotenvy::dotenv();

    let mut config = match Config::load(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    };
    if cli.dry_run {
        config.dry_run = true;
    }

    config.init_logging();
    info!("edgarwatch starting");

    tokio::select! {
        result = App::run(config) => {
            if let Err(e) = result {
                error!(error = %e, "Fatal error");
                std::process::exit(1);
            }
        }
        _ = signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
    }

    info!("edgarwatch stopped");
}
