//! SweepLoop - アクセス不能になった artifact の定期回収
//!
//! # フロー
//! 1. interval ごとに ShareService::sweep() を呼ぶ
//! 2. 期限切れ / 上限到達の artifact を Blob ごと削除
//! 3. shutdown が来たら次の tick を待たずに抜ける
//!
//! アクセス時の判定は遅延評価なので、このループがないと誰もアクセスしない artifact は
//! いつまでもストレージに残ります。

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use super::service::ShareService;

pub struct SweepLoop {
    service: Arc<ShareService>,
    interval: Duration,
}

/// Handle of a spawned sweep loop.
/// - `request_shutdown()` で停止を要求
/// - `shutdown_and_join()` で停止を待つ
pub struct SweepHandle {
    shutdown_tx: watch::Sender<bool>,
    join: JoinHandle<()>,
}

impl SweepLoop {
    pub fn new(service: Arc<ShareService>, interval: Duration) -> Self {
        Self {
            service,
            // tokio::time::interval panics on zero
            interval: interval.max(Duration::from_millis(1)),
        }
    }

    pub fn spawn(self) -> SweepHandle {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let join = tokio::spawn(self.run(shutdown_rx));
        SweepHandle { shutdown_tx, join }
    }

    /// Run until `shutdown_rx` flips to `true` or its sender is dropped.
    pub async fn run(self, mut shutdown_rx: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            if *shutdown_rx.borrow() {
                break;
            }

            tokio::select! {
                changed = shutdown_rx.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    continue;
                }
                _ = ticker.tick() => {}
            }

            match self.service.sweep().await {
                Ok(report) => debug!(
                    removed = report.removed.len(),
                    failed = report.failed.len(),
                    "sweep tick"
                ),
                Err(e) => warn!(error = %e, "sweep failed"),
            }
        }
        debug!("sweep loop stopped");
    }
}

impl SweepHandle {
    pub fn request_shutdown(&self) {
        // ignore send error: the loop may already be gone
        let _ = self.shutdown_tx.send(true);
    }

    pub async fn shutdown_and_join(self) {
        self.request_shutdown();
        if let Err(e) = self.join.await {
            warn!(error = %e, "sweep loop task ended abnormally");
        }
    }
}
