//! # Collection Runner
//!
//! Drives the enabled collectors: collect, archive, sleep, repeat.
//!
//! A cycle polls each enabled collector in turn and archives its snapshot
//! under the collector's source. Archive writes are blocking filesystem
//! calls and run on tokio's blocking pool. A failure in one collector is
//! logged and does not stop the others.
//!
//! Between cycles the runner sleeps the configured interval, or the retry
//! delay when every collector failed. A shutdown request lets the current
//! cycle finish and cuts the sleep short.

use std::time::Duration;

use anyhow::{Context, Result};
use luft_archive::{ArchiveId, ArchiveStore};
use luft_collector::{Collector, CollectorKind};
use luft_core::Telemetry;
use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::LuftConfig;

/// Wait after a cycle in which every collector failed.
pub const RETRY_DELAY: Duration = Duration::from_secs(60);

/// What happened to one collector in one cycle.
#[derive(Debug)]
pub struct CollectorOutcome {
    pub kind: CollectorKind,
    pub succeeded: usize,
    pub failed: usize,
    /// Where the snapshot was archived, or why it was not.
    pub archive: Result<ArchiveId, String>,
}

impl CollectorOutcome {
    /// No endpoint answered, or the snapshot could not be stored.
    pub fn is_failure(&self) -> bool {
        self.archive.is_err() || (self.succeeded == 0 && self.failed > 0)
    }
}

/// Results of one cycle.
#[derive(Debug, Default)]
pub struct CycleReport {
    pub outcomes: Vec<CollectorOutcome>,
}

impl CycleReport {
    pub fn all_failed(&self) -> bool {
        !self.outcomes.is_empty() && self.outcomes.iter().all(CollectorOutcome::is_failure)
    }

    pub fn archived(&self) -> impl Iterator<Item = &ArchiveId> {
        self.outcomes.iter().filter_map(|o| o.archive.as_ref().ok())
    }
}

/// Runs collection cycles against one archive store.
#[derive(Debug)]
pub struct Runner {
    store: ArchiveStore,
    collectors: Vec<Collector>,
    interval: Duration,
    retry_delay: Duration,
    telemetry: Telemetry,
}

impl Runner {
    pub fn new(store: ArchiveStore, collectors: Vec<Collector>, interval: Duration) -> Self {
        let telemetry = store.telemetry().clone();
        Self {
            store,
            collectors,
            interval,
            retry_delay: RETRY_DELAY,
            telemetry,
        }
    }

    /// Build the store and every enabled collector from configuration.
    ///
    /// The cycle interval is `collectors.solar_wind.interval`.
    pub fn from_config(config: &LuftConfig, telemetry: Telemetry) -> Result<Self> {
        let store = ArchiveStore::open(&config.storage.archive_path, telemetry.clone())
            .context("failed to open archive store")?;
        let mut collectors = Vec::new();
        for kind in CollectorKind::ALL {
            if !config.collector(kind).enabled {
                telemetry.in_scope(|| info!(collector = %kind, "collector disabled"));
                continue;
            }
            let collector = Collector::new(kind, config.collector_config(kind)?, telemetry.clone())
                .with_context(|| format!("failed to build {kind} collector"))?;
            collectors.push(collector);
        }
        if collectors.is_empty() {
            telemetry.in_scope(|| warn!("no collectors enabled"));
        }
        let interval = Duration::from_secs(config.collectors.solar_wind.interval);
        Ok(Self::new(store, collectors, interval))
    }

    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn collectors(&self) -> &[Collector] {
        &self.collectors
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run a single collect-and-archive cycle.
    pub async fn run_once(&self) -> CycleReport {
        self.telemetry.instrument(self.cycle()).await
    }

    async fn cycle(&self) -> CycleReport {
        let mut report = CycleReport::default();
        for collector in &self.collectors {
            let kind = collector.kind();
            let snapshot = collector.collect_realtime_data().await;
            let (succeeded, failed) = (snapshot.success_count(), snapshot.error_count());

            let store = self.store.clone();
            let metadata = collector.archive_metadata();
            let archive = tokio::task::spawn_blocking(move || {
                store.archive(&snapshot, kind.archive_source(), metadata)
            })
            .await
            .map_err(|e| format!("archive task failed: {e}"))
            .and_then(|r| r.map_err(|e| e.to_string()));

            match &archive {
                Ok(id) => info!(collector = %kind, archive = %id, succeeded, failed, "snapshot archived"),
                Err(e) => error!(collector = %kind, error = %e, "failed to archive snapshot"),
            }
            report.outcomes.push(CollectorOutcome {
                kind,
                succeeded,
                failed,
                archive,
            });
        }
        report
    }

    /// Run cycles until `shutdown` turns true or its sender is dropped.
    pub async fn run_continuous(&self, mut shutdown: watch::Receiver<bool>) {
        self.telemetry.in_scope(|| {
            info!(
                collectors = self.collectors.len(),
                interval_secs = self.interval.as_secs(),
                "starting continuous collection"
            )
        });
        while !*shutdown.borrow() {
            let report = self.run_once().await;
            let delay = if report.all_failed() {
                self.telemetry.in_scope(|| {
                    warn!(retry_secs = self.retry_delay.as_secs(), "every collector failed, retrying")
                });
                self.retry_delay
            } else {
                self.interval
            };
            tokio::select! {
                _ = shutdown.changed() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }
        self.telemetry.in_scope(|| info!("collection stopped"));
    }
}

/// Resolve on SIGINT or, on unix, SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// A receiver that turns true when the process is asked to stop.
pub fn spawn_shutdown_listener(telemetry: Telemetry) -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(telemetry.instrument(async move {
        shutdown_signal().await;
        info!("shutdown requested, finishing current cycle");
        let _ = tx.send(true);
    }));
    rx
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(succeeded: usize, failed: usize, archived: bool) -> CollectorOutcome {
        CollectorOutcome {
            kind: CollectorKind::SolarWind,
            succeeded,
            failed,
            archive: if archived {
                Ok(ArchiveId::new("/a/solar_wind/x.json"))
            } else {
                Err("disk full".into())
            },
        }
    }

    #[test]
    fn all_failed_needs_every_collector_to_fail() {
        assert!(!CycleReport::default().all_failed());
        let report = CycleReport {
            outcomes: vec![outcome(0, 3, true), outcome(2, 1, false)],
        };
        assert!(report.all_failed());
        let report = CycleReport {
            outcomes: vec![outcome(0, 3, true), outcome(1, 2, true)],
        };
        assert!(!report.all_failed());
        assert_eq!(report.archived().count(), 2);
    }
}
