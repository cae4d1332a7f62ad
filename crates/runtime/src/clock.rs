//! Wall-clock milliseconds for cooldown bookkeeping.
//!
//! The epoch is read once at startup; elapsed time comes from tokio's clock,
//! so expiry stamps and the timers that clear them share one time source.

use chrono::Utc;
use tokio::time::Instant;

#[derive(Clone, Copy, Debug)]
pub struct SessionClock {
    epoch_ms: i64,
    origin: Instant,
}

impl SessionClock {
    /// Anchors the clock at the current wall-clock time.
    pub fn start() -> Self {
        Self::anchored_at(Utc::now().timestamp_millis())
    }

    /// Anchors the clock at a fixed epoch value.
    pub fn anchored_at(epoch_ms: i64) -> Self {
        Self {
            epoch_ms,
            origin: Instant::now(),
        }
    }

    /// Epoch milliseconds now.
    pub fn now_ms(&self) -> i64 {
        let elapsed = i64::try_from(self.origin.elapsed().as_millis()).unwrap_or(i64::MAX);
        self.epoch_ms.saturating_add(elapsed)
    }
}
