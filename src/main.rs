mod bootstrap;

use snapvault_auth::ConfigIdentityProvider;
use snapvault_events::{AppEvent, EventBus};
use crate::bootstrap::{config, logging, shell::Shell};
use anyhow::Result;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    logging::initialize();

    let events = EventBus::new(false);
    events.emit(AppEvent::Starting);

    let config_path = std::env::var("SNAPVAULT_CONFIG").unwrap_or_else(|_| "snapvault.toml".to_string());
    let config = config::load(&config_path, &events).await?;

    let provider = Arc::new(ConfigIdentityProvider::new(&config));
    let mut shell = Shell::new(config, Arc::clone(&events), provider);

    let shutdown_signal = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        tracing::info!("Shutdown signal received");
    };

    tokio::select! {
        result = shell.run() => result?,
        _ = shutdown_signal => {}
    }

    // Ctrl+C interrupts the loop; in-flight remote requests still settle
    shell.shutdown().await;

    events.emit(AppEvent::Shutdown);
    Ok(())
}
