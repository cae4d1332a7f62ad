//! Background cooldown flush.
//!
//! Periodically writes every online player's cooldowns to the repository so
//! a crash loses at most one interval of cooldown state.

use std::sync::Arc;

use tokio::time::{self, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::engine::Engine;

/// Worker that flushes cooldowns on a fixed interval until cancelled.
pub struct FlushWorker {
    engine: Arc<Engine>,
    interval: Duration,
    shutdown: CancellationToken,
}

impl FlushWorker {
    pub fn new(engine: Arc<Engine>, interval: Duration, shutdown: CancellationToken) -> Self {
        Self {
            engine,
            interval,
            shutdown,
        }
    }

    /// Main worker loop.
    ///
    /// The first flush happens one interval after start.
    pub async fn run(self) {
        info!(interval_ms = self.interval.as_millis() as u64, "FlushWorker started");
        let period = self.interval.max(Duration::from_millis(1));
        let mut ticker = time::interval_at(time::Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => {
                    let report = self.engine.flush_cooldowns();
                    if report.is_complete() {
                        debug!(saved = report.saved, "periodic cooldown flush");
                    } else {
                        warn!(
                            saved = report.saved,
                            failed = report.failed.len(),
                            "periodic cooldown flush incomplete"
                        );
                    }
                }
            }
        }
        info!("FlushWorker stopped");
    }
}
