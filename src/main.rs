//! Notes AI Server Entry Point
//!
//! Initializes logging and loads configuration, then either serves the HTTP
//! API until interrupted or runs one command-line operation.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use notes_ai_server::cli::{self, Cli, Commands};
use notes_ai_server::core::{
    Config, HttpTransport, NotesServer,
    config::LoggingConfig,
};

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Cli::parse();

    dotenvy::dotenv().ok();

    // Logging first so configuration warnings are visible
    init_logging(&LoggingConfig::from_env());

    let config = Config::from_env();

    match args.command {
        None | Some(Commands::Serve) => {
            serve(config).await?;
            Ok(ExitCode::SUCCESS)
        }
        Some(command) => Ok(cli::run(command, &config).await),
    }
}

async fn serve(config: Config) -> Result<()> {
    info!("Starting {} v{}", config.server.name, config.server.version);

    let transport = HttpTransport::new(config.http.clone());
    let server = NotesServer::new(config).context("Failed to initialize server")?;

    info!("Server initialized");

    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// Configures tracing with the specified log level and format.
fn init_logging(logging: &LoggingConfig) {
    let level = match logging.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);

    if logging.with_timestamps {
        builder.init();
    } else {
        builder.without_time().init();
    }
}
