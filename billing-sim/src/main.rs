use std::process::ExitCode;

use billing_sim::{commands, config::SimConfig};
use clap::Parser;
use service_core::observability::init_tracing;

#[derive(Parser)]
#[command(name = "billing-sim")]
#[command(version)]
#[command(about = "Simulate subscriptions on a Stripe test clock and report their revenue", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: commands::Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match SimConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            // Tracing is configured from this config, so report directly.
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::from(e.exit_code());
        }
    };

    init_tracing(&config.service_name, &config.log_level);
    tracing::info!(command = cli.command.name(), "Starting billing-sim");

    match commands::run(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(
                command = cli.command.name(),
                kind = e.kind(),
                error = %e,
                "Command failed"
            );
            ExitCode::from(e.exit_code())
        }
    }
}
