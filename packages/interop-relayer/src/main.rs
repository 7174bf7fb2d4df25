use interop_relayer::{init_logging, run, Config};
use interop_rs::DestinationResult;

fn main() -> eyre::Result<()> {
    // Install color-eyre for better error reporting
    color_eyre::install()?;

    // Run the async main
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main())
}

async fn async_main() -> eyre::Result<()> {
    // Initialize logging
    init_logging();

    tracing::info!("Starting interop relayer");

    // Load configuration
    let config = Config::load()?;
    tracing::info!(
        source_rpc = %config.source.rpc_url,
        destination_rpc = %config.destination.rpc_url,
        target = %config.call.target,
        mode = ?config.relay.mode,
        "Configuration loaded"
    );

    let outcome = match run(&config).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(kind = ?e.kind(), error = %e, "Relay aborted");
            return Err(e.into());
        }
    };

    let destination_tx = match outcome.result {
        DestinationResult::Included => None,
        DestinationResult::Executed { tx_hash } => Some(tx_hash),
    };
    tracing::info!(
        source_tx = %outcome.source_tx_hash,
        bundle_hash = %outcome.bundle_hash,
        batch_number = outcome.batch_number,
        message_index = outcome.message_index,
        root = %outcome.root,
        destination_tx = ?destination_tx,
        "Relay succeeded"
    );

    Ok(())
}
