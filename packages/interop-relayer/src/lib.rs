//! Interop relayer
//!
//! Loads configuration from the environment, connects to both chains and
//! runs a single relay to completion.

pub mod config;

use interop_rs::evm::EvmEndpoint;
use interop_rs::{ChainEndpoint, RelayError, RelayOrchestrator, RelayOutcome};
use tracing::info;

pub use config::Config;

/// Connect to both chains and relay the configured call once
pub async fn run(config: &Config) -> Result<RelayOutcome, RelayError> {
    let source = EvmEndpoint::connect(config.source.clone())
        .await
        .map_err(|e| RelayError::endpoint("connect source", e))?;
    let destination = EvmEndpoint::connect(config.destination.clone())
        .await
        .map_err(|e| RelayError::endpoint("connect destination", e))?;

    info!(
        source_chain_id = source.chain_id(),
        destination_chain_id = destination.chain_id(),
        mode = ?config.relay.mode,
        "Endpoints connected"
    );

    let message = config.outbound_message(destination.chain_id());
    let mut orchestrator = RelayOrchestrator::new(source, destination, config.relay.clone());
    orchestrator.run(&message).await
}

/// Initialize tracing/logging with structured output
pub fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,interop_relayer=debug,interop_rs=debug"));

    let json = std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false);
    if json {
        tracing_subscriber::registry()
            .with(fmt::layer().json().with_target(true))
            .with(filter)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(fmt::layer().with_target(true).with_thread_ids(true))
            .with(filter)
            .init();
    }
}
