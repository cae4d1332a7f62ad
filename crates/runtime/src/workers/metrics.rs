//! Cast and companion metrics.
//!
//! Tracks how many casts start, complete, get interrupted or rejected, and how
//! busy companion agents are.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

/// Counters updated by the cast state machine and companion agents.
///
/// Uses atomics for lock-free access across threads.
#[derive(Debug, Default)]
pub struct CastMetrics {
    /// Casts that entered CASTING (including instant casts)
    started: AtomicU64,

    /// Casts whose effects were dispatched
    completed: AtomicU64,

    /// Casts broken off before completion
    interrupted: AtomicU64,

    /// Requests rejected by validation
    rejected: AtomicU64,

    /// Requests parked in the queued slot
    queued: AtomicU64,

    /// Companion ticks that ran while the agent was active
    companion_ticks: AtomicU64,

    /// Companion ticks that reached the effect dispatcher
    companion_casts: AtomicU64,

    /// Cooldown entries re-armed from persisted records
    cooldowns_restored: AtomicU64,
}

impl CastMetrics {
    /// Creates a new empty metrics tracker.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_started(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_completed(&self) {
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_interrupted(&self) {
        self.interrupted.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_queued(&self) {
        self.queued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_companion_tick(&self) {
        self.companion_ticks.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_companion_cast(&self) {
        self.companion_casts.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_restored(&self, count: usize) {
        self.cooldowns_restored
            .fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Share of finished casts that completed, as a percentage (0-100).
    pub fn completion_rate(&self) -> f64 {
        let completed = self.completed.load(Ordering::Relaxed);
        let interrupted = self.interrupted.load(Ordering::Relaxed);
        let total = completed + interrupted;

        if total == 0 {
            100.0
        } else {
            (completed as f64 / total as f64) * 100.0
        }
    }

    /// Creates a snapshot of all metrics for display/logging.
    ///
    /// Note: This is not atomic across all fields - individual fields
    /// are read atomically but the snapshot as a whole may be inconsistent
    /// if metrics are being updated concurrently.
    pub fn snapshot(&self) -> CastMetricsSnapshot {
        CastMetricsSnapshot {
            started: self.started.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            interrupted: self.interrupted.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed),
            companion_ticks: self.companion_ticks.load(Ordering::Relaxed),
            companion_casts: self.companion_casts.load(Ordering::Relaxed),
            cooldowns_restored: self.cooldowns_restored.load(Ordering::Relaxed),
            completion_rate: self.completion_rate(),
        }
    }
}

/// Snapshot of metrics at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CastMetricsSnapshot {
    pub started: u64,
    pub completed: u64,
    pub interrupted: u64,
    pub rejected: u64,
    pub queued: u64,
    pub companion_ticks: u64,
    pub companion_casts: u64,
    pub cooldowns_restored: u64,
    pub completion_rate: f64,
}
