//! Process-wide task scheduler.
//!
//! Thin layer over the tokio timer wheel that hands out cancellable
//! [`TaskHandle`]s. Every arming gets a fresh [`CancellationToken`], so a
//! handle can never cancel a later arming of the same logical timer.
//!
//! Callbacks are short and synchronous. A panicking callback is caught and
//! logged; for fixed-rate tasks the next period still runs.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::error;

/// Shortest period accepted for fixed-rate tasks.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Cancels one scheduled task. Cancelling twice, or after the task fired, is a no-op.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    token: CancellationToken,
}

impl TaskHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Spawns timer tasks onto the runtime captured at construction.
#[derive(Clone, Debug)]
pub struct Scheduler {
    runtime: Handle,
}

impl Scheduler {
    /// Binds to the tokio runtime of the calling context.
    pub fn current() -> Self {
        Self {
            runtime: Handle::current(),
        }
    }

    /// Runs `task` once after `delay` unless cancelled first.
    pub fn schedule_once<F>(&self, label: &'static str, delay: Duration, task: F) -> TaskHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let token = CancellationToken::new();
        let guard = token.clone();
        let deadline = Instant::now() + delay;
        self.runtime.spawn(async move {
            tokio::select! {
                biased;
                _ = guard.cancelled() => {}
                _ = tokio::time::sleep_until(deadline) => {
                    if guard.is_cancelled() {
                        return;
                    }
                    if catch_unwind(AssertUnwindSafe(task)).is_err() {
                        error!(task = label, "scheduled task panicked");
                    }
                }
            }
        });
        TaskHandle { token }
    }

    /// Runs `task` after `initial`, then every `period`, until cancelled.
    pub fn schedule_fixed_rate<F>(
        &self,
        label: &'static str,
        initial: Duration,
        period: Duration,
        mut task: F,
    ) -> TaskHandle
    where
        F: FnMut() + Send + 'static,
    {
        let token = CancellationToken::new();
        let guard = token.clone();
        let start = Instant::now() + initial;
        self.runtime.spawn(async move {
            let mut interval = tokio::time::interval_at(start, period.max(MIN_PERIOD));
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = guard.cancelled() => break,
                    _ = interval.tick() => {
                        if guard.is_cancelled() {
                            break;
                        }
                        if catch_unwind(AssertUnwindSafe(&mut task)).is_err() {
                            error!(task = label, "periodic task panicked; keeping schedule");
                        }
                    }
                }
            }
        });
        TaskHandle { token }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn once_fires_after_delay() {
        let scheduler = Scheduler::current();
        let hits = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&hits);
        scheduler.schedule_once("test", Duration::from_millis(100), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(99)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        tokio::time::sleep(Duration::from_millis(2)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_is_idempotent() {
        let scheduler = Scheduler::current();
        let hits = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&hits);
        let handle = scheduler.schedule_once("test", Duration::from_millis(10), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        handle.cancel();
        handle.cancel();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(hits.load(Ordering::SeqCst), 0);
        assert!(handle.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_rate_survives_panics() {
        let scheduler = Scheduler::current();
        let hits = Arc::new(AtomicU32::new(0));
        let counter = Arc::clone(&hits);
        let handle = scheduler.schedule_fixed_rate(
            "test",
            Duration::from_millis(10),
            Duration::from_millis(10),
            move || {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    panic!("first tick fails");
                }
            },
        );

        tokio::time::sleep(Duration::from_millis(35)).await;
        handle.cancel();
        let seen = hits.load(Ordering::SeqCst);
        assert_eq!(seen, 3);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(hits.load(Ordering::SeqCst), seen);
    }
}
