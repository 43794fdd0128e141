//! Cache synchronizer: republishes the whole catalog into the read cache.

use std::sync::Arc;
use std::time::{Duration, Instant};

use bannerd_core::BannerKey;
use bannerd_storage::{BannerFilter, DynBannerStorage};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{error, info, warn};

use super::error::ServiceError;
use crate::cache::ReadCache;

/// Counts from one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Banners returned by the catalog listing.
    pub banners: usize,
    /// Cache entries written.
    pub written: usize,
    /// Cache writes that failed.
    pub failed: usize,
}

/// Periodically copies every banner into the read cache, one entry per tag.
pub struct CacheSynchronizer {
    storage: DynBannerStorage,
    cache: Arc<dyn ReadCache>,
    ttl: Duration,
    interval: Duration,
}

impl CacheSynchronizer {
    /// Creates a synchronizer that writes entries with `ttl` every `interval`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Invalid` if `interval` is zero.
    pub fn new(
        storage: DynBannerStorage,
        cache: Arc<dyn ReadCache>,
        ttl: Duration,
        interval: Duration,
    ) -> Result<Self, ServiceError> {
        if interval.is_zero() {
            return Err(ServiceError::Invalid(
                "cache sync interval must be greater than zero".into(),
            ));
        }
        Ok(Self {
            storage,
            cache,
            ttl,
            interval,
        })
    }

    /// Runs one sweep. Failures are logged and counted, never returned.
    pub async fn sweep(&self) -> SweepReport {
        let started = Instant::now();
        let mut report = SweepReport::default();

        let banners = match self.storage.list(&BannerFilter::new()).await {
            Ok(banners) => banners,
            Err(e) => {
                error!(error = %e, "cache sweep could not list the catalog");
                return report;
            }
        };
        report.banners = banners.len();

        for banner in &banners {
            for &tag_id in &banner.tag_ids {
                let key = BannerKey::new(banner.feature_id, tag_id);
                match self.cache.set(key, banner, self.ttl).await {
                    Ok(()) => report.written += 1,
                    Err(e) => {
                        report.failed += 1;
                        warn!(key = %key, banner_id = banner.id, error = %e, "cache write failed");
                    }
                }
            }
        }

        let purged = self.cache.purge_expired();

        info!(
            banners = report.banners,
            written = report.written,
            failed = report.failed,
            purged,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "cache sweep finished"
        );
        report
    }

    /// Spawns the loop: one sweep now, then one per interval until stopped.
    pub fn start(self) -> SyncHandle {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

        let task = tokio::spawn(async move {
            info!(
                interval_secs = self.interval.as_secs(),
                ttl_secs = self.ttl.as_secs(),
                "cache synchronizer started"
            );

            let mut ticker = interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    changed = shutdown_rx.changed() => {
                        // A dropped sender also means stop.
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                    _ = ticker.tick() => {
                        self.sweep().await;
                    }
                }
            }

            info!("cache synchronizer stopped");
        });

        SyncHandle { shutdown_tx, task }
    }
}

/// Handle to a running synchronizer.
pub struct SyncHandle {
    shutdown_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SyncHandle {
    /// Requests a stop and waits for the loop to exit. A sweep already in
    /// progress completes; no new one starts.
    pub async fn stop(self) {
        let _ = self.shutdown_tx.send(true);
        if let Err(e) = self.task.await {
            error!(error = %e, "cache synchronizer task failed");
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
