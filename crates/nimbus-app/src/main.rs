//! Nimbus application binary - composition root.
//!
//! Ties together the Nimbus crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Build the Gemini backend (degraded startup when no API key is set)
//! 3. Start the axum REST API server

mod cli;

use clap::Parser;

use nimbus_ai::{GeminiBackend, Orchestrator};
use nimbus_api::routes;
use nimbus_api::state::AppState;
use nimbus_core::config::NimbusConfig;

use cli::CliArgs;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing: CLI log level overrides RUST_LOG, which overrides "info".
    let filter = match args.resolve_log_level() {
        Some(level) => tracing_subscriber::EnvFilter::new(level),
        None => tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    tracing::info!("Starting Nimbus v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = NimbusConfig::load_or_default(&config_file);
    config.server.port = args.resolve_port(config.server.port);
    tracing::info!(path = %config_file.display(), port = config.server.port, "Configuration loaded");

    // Gemini backend. A missing API key degrades startup instead of aborting:
    // info routes keep working and AI routes answer 503.
    let orchestrator = match GeminiBackend::from_config(&config.gemini) {
        Ok(backend) => {
            tracing::info!(
                flash = %config.gemini.flash_model,
                pro = %config.gemini.pro_model,
                "Gemini backend ready"
            );
            Some(Orchestrator::new(backend))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Gemini backend not configured; AI routes will answer 503");
            None
        }
    };

    let state = AppState::new(config, orchestrator);

    routes::start_server(state).await?;

    Ok(())
}
