//! Background loop feeding the session with the prediction stream.
//!
//! Polls the recognition backend on a fixed cadence with at most one request
//! in flight: the loop awaits each fetch before the next tick, and ticks that
//! elapse during a slow fetch are skipped rather than queued. Failures
//! degrade to `Prediction::Unavailable` and polling continues indefinitely;
//! staleness is cheap and availability must be re-checked continuously, so
//! there is no backoff.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;

use signvoice_client::traits::PredictionSource;
use signvoice_core::types::Prediction;

use crate::orchestrator::SessionOrchestrator;

/// Repeating prediction poll task with graceful shutdown.
pub struct PredictionPoller {
    source: Arc<dyn PredictionSource>,
    orchestrator: Arc<SessionOrchestrator>,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl PredictionPoller {
    /// Create a poller over `source` updating `orchestrator` every `interval`.
    pub fn new(
        source: Arc<dyn PredictionSource>,
        orchestrator: Arc<SessionOrchestrator>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            orchestrator,
            interval,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Run the polling loop until [`shutdown`](Self::shutdown) is called.
    pub async fn run(&self) {
        tracing::info!(interval_ms = self.interval.as_millis() as u64, "Prediction poller started");

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let prediction = match self.source.fetch_prediction().await {
                        Ok(p) => p,
                        Err(e) => {
                            tracing::debug!(error = %e, "Prediction fetch failed");
                            Prediction::Unavailable
                        }
                    };
                    if let Err(e) = self.orchestrator.set_prediction(prediction) {
                        tracing::warn!(error = %e, "Failed to record prediction");
                    }
                }
                _ = self.shutdown.notified() => {
                    tracing::info!("Prediction poller stopped");
                    return;
                }
            }
        }
    }

    /// Signal the polling loop to stop after the current iteration.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

// =============================================================================
// Tests
// =============================================================================
