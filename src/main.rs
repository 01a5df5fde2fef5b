use anyhow::{Context, Result};
use apsema::coordinator::DataUpdateCoordinator;
use apsema::logging::init_logging;
use apsema::readings::connectivity;
use apsema::{ApsClient, Config};
use std::sync::Arc;
use tracing::{error, info, warn};

const APP_VERSION: &str = env!("APP_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::load().context("Failed to load configuration")?;
    init_logging(&config.logging).context("Failed to initialize logging")?;
    config.validate().context("Invalid configuration")?;

    info!("apsema {} starting up", APP_VERSION);

    let client = ApsClient::from_config(&config)?;

    // `apsema check` only verifies the credentials
    if std::env::args().nth(1).as_deref() == Some("check") {
        if client.validate_credentials().await {
            info!("Credentials accepted");
            return Ok(());
        }
        anyhow::bail!("Credentials rejected by the EMA API");
    }

    let coordinator = Arc::new(DataUpdateCoordinator::new(
        Arc::new(client),
        config.poll_interval(),
    ));
    coordinator
        .setup()
        .await
        .context("No successful refresh at startup")?;

    let runner = {
        let coordinator = Arc::clone(&coordinator);
        tokio::spawn(async move { coordinator.run().await })
    };

    let mut snapshots = coordinator.subscribe();
    snapshots.mark_changed();

    loop {
        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                snapshots.borrow_and_update();
                // Also fires after a failed cycle, which leaves everything unavailable
                for r in coordinator.readings() {
                    match &r.raw {
                        Some(raw) => info!("{} = {} {}", r.entity_name(), raw, r.unit.as_str()),
                        None => warn!("{} unavailable", r.entity_name()),
                    }
                }
                info!(
                    "connectivity = {}",
                    connectivity(coordinator.last_update_success())
                );
            }
            signal = tokio::signal::ctrl_c() => {
                if let Err(e) = signal {
                    error!("Failed to listen for shutdown signal: {}", e);
                }
                break;
            }
        }
    }

    coordinator.request_shutdown();
    if let Err(e) = runner.await {
        error!("Coordinator task failed: {}", e);
    }
    info!("Shutdown complete");
    Ok(())
}
