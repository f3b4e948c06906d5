mod cli;
mod commands;
mod config;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::cli::{Cli, Command};
use crate::error::CliError;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Setup tracing based on verbosity
    init_tracing(cli.global.verbose);

    // Dispatch and handle errors with proper exit codes
    if let Err(err) = run(cli).await {
        let code = err.exit_code();
        eprintln!("{:?}", miette::Report::new(err));
        std::process::exit(code);
    }
}

fn init_tracing(verbosity: u8) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let cfg = gsa_config::load_config()?;
    let format = config::output_format(&cli.global, &cfg);

    match cli.command {
        // Config commands don't need an appliance
        Command::Config(args) => commands::config_cmd::handle(args, &cli.global, cfg, format),

        // The monitor opens one session per appliance itself
        Command::Monitor(args) => commands::monitor::handle(args, &cli.global, &cfg, format).await,

        // Fleet commands log in to every target appliance
        Command::Crawl(args) => commands::fleet::crawl(args, &cli.global, &cfg, format).await,
        Command::Index(args) => commands::fleet::index(args, &cli.global, &cfg, format).await,
        Command::DocLimit(args) => {
            commands::fleet::doc_limit(args, &cli.global, &cfg, format).await
        }

        // Everything else talks to one appliance
        cmd => {
            let connection = config::connection_config(&cli.global, &cfg)?;
            let client = connection.connect().await?;

            tracing::debug!(command = ?cmd, "dispatching command");
            commands::dispatch(cmd, &client, &cli.global, format).await
        }
    }
}
