//! Timer-driven refresh coordinator
//!
//! The coordinator owns the most recent [`SystemData`] snapshot. Each cycle
//! fetches the system summary and the ECU minutely energy concurrently; each
//! slot of the new snapshot is filled only if its own fetch succeeded. The
//! snapshot is swapped whole into a `watch` channel so any number of readers
//! can observe it without locking.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, watch};
use tokio::time::{Instant, MissedTickBehavior, interval_at};

use crate::api::{ApsClient, EcuMinutelyEnergyData, SystemData, SystemSummaryData};
use crate::error::{ApsError, Result};
use crate::logging::{StructuredLogger, get_logger};
use crate::readings::{Reading, readings};

/// Where a coordinator gets its data from
#[async_trait::async_trait]
pub trait SystemDataSource: Send + Sync {
    async fn fetch_summary(&self) -> Result<SystemSummaryData>;
    async fn fetch_minutely_energy(&self) -> Result<EcuMinutelyEnergyData>;
}

#[async_trait::async_trait]
impl SystemDataSource for ApsClient {
    async fn fetch_summary(&self) -> Result<SystemSummaryData> {
        self.system_summary().await
    }

    async fn fetch_minutely_energy(&self) -> Result<EcuMinutelyEnergyData> {
        self.ecu_minutely_energy_today().await
    }
}

pub type SnapshotReceiver = watch::Receiver<Option<Arc<SystemData>>>;

pub struct DataUpdateCoordinator {
    source: Arc<dyn SystemDataSource>,
    update_interval: Duration,
    data_tx: watch::Sender<Option<Arc<SystemData>>>,
    last_update_success: AtomicBool,
    // Held for the duration of a cycle so cycles never overlap
    cycle: Mutex<()>,
    shutdown_tx: watch::Sender<bool>,
    logger: StructuredLogger,
}

impl std::fmt::Debug for DataUpdateCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataUpdateCoordinator")
            .field("update_interval", &self.update_interval)
            .field("last_update_success", &self.last_update_success())
            .finish_non_exhaustive()
    }
}

impl DataUpdateCoordinator {
    pub fn new(source: Arc<dyn SystemDataSource>, update_interval: Duration) -> Self {
        let (data_tx, _) = watch::channel(None);
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            source,
            update_interval,
            data_tx,
            last_update_success: AtomicBool::new(false),
            cycle: Mutex::new(()),
            shutdown_tx,
            logger: get_logger("coordinator"),
        }
    }

    pub fn update_interval(&self) -> Duration {
        self.update_interval
    }

    /// Latest successful snapshot, if any cycle has succeeded yet
    pub fn data(&self) -> Option<Arc<SystemData>> {
        self.data_tx.borrow().clone()
    }

    /// Whether the most recent cycle succeeded
    pub fn last_update_success(&self) -> bool {
        self.last_update_success.load(Ordering::Acquire)
    }

    /// Receivers are notified after every cycle. A failed cycle keeps the
    /// previous snapshot, so check [`Self::last_update_success`] as well.
    pub fn subscribe(&self) -> SnapshotReceiver {
        self.data_tx.subscribe()
    }

    /// Current readouts. All unavailable until a cycle succeeds, and again
    /// after any failed cycle.
    pub fn readings(&self) -> Vec<Reading> {
        readings(self.data().as_deref(), self.last_update_success())
    }

    fn report_fetch_failure(&self, what: &str, e: &ApsError) {
        let message = format!("{} unavailable this cycle: {}", what, e);
        if e.is_fetch_error() {
            self.logger.warn(&message);
        } else {
            self.logger.error(&message);
        }
    }

    /// Run one fetch cycle without touching the cached snapshot.
    ///
    /// A failed sub-fetch is logged and leaves its slot empty. The cycle
    /// only fails when both sub-fetches fail.
    pub async fn poll(&self) -> Result<SystemData> {
        let (summary, minutely) = tokio::join!(
            self.source.fetch_summary(),
            self.source.fetch_minutely_energy()
        );

        let mut failures = Vec::new();
        let system_summary = match summary {
            Ok(s) => Some(s),
            Err(e) => {
                self.report_fetch_failure("System summary", &e);
                failures.push(format!("summary: {}", e));
                None
            }
        };
        let ecu_minutely_energy = match minutely {
            Ok(m) => Some(m),
            Err(e) => {
                self.report_fetch_failure("ECU minutely energy", &e);
                failures.push(format!("minutely energy: {}", e));
                None
            }
        };

        let data = SystemData::new(system_summary, ecu_minutely_energy);
        if data.is_empty() {
            return Err(ApsError::update_failed(failures.join("; ")));
        }
        Ok(data)
    }

    /// Run one cycle and publish its result.
    ///
    /// On failure the previous snapshot stays in place and
    /// `last_update_success` turns false.
    pub async fn refresh(&self) -> Result<Arc<SystemData>> {
        let _cycle = self.cycle.lock().await;
        match self.poll().await {
            Ok(data) => {
                let data = Arc::new(data);
                self.data_tx.send_replace(Some(Arc::clone(&data)));
                self.last_update_success.store(true, Ordering::Release);
                self.logger.debug("Refresh succeeded");
                Ok(data)
            }
            Err(e) => {
                self.last_update_success.store(false, Ordering::Release);
                // Snapshot unchanged; wake readers so they mark it unavailable
                self.data_tx.send_modify(|_| {});
                self.logger.error(&format!("Refresh failed: {}", e));
                Err(e)
            }
        }
    }

    /// First refresh. Failing here means the data can never be made available.
    pub async fn setup(&self) -> Result<Arc<SystemData>> {
        self.refresh()
            .await
            .map_err(|e| ApsError::not_ready(format!("Initial refresh failed: {}", e)))
    }

    /// Refresh every `update_interval` until shutdown is requested.
    ///
    /// The first cycle runs one interval after the call; use [`Self::setup`]
    /// for the initial fetch. Failures are reported once per cycle and never
    /// retried before the next tick.
    pub async fn run(&self) {
        let mut shutdown = self.shutdown_tx.subscribe();
        if *shutdown.borrow() {
            return;
        }

        let mut ticker = interval_at(Instant::now() + self.update_interval, self.update_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        self.logger.info(&format!(
            "Polling every {}s",
            self.update_interval.as_secs()
        ));

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    // Already logged inside refresh
                    let _ = self.refresh().await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.logger.info("Shutdown signal received");
                        break;
                    }
                }
            }
        }
    }

    /// Ask a running [`Self::run`] loop to stop after the current cycle
    pub fn request_shutdown(&self) {
        self.shutdown_tx.send_replace(true);
    }
}
