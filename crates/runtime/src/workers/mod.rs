//! Worker tasks that back the runtime orchestration.
//!
//! The flush worker persists cooldowns in the background; metrics are shared
//! by the cast state machine and the companion agents.

mod flush;
mod metrics;

pub(crate) use flush::FlushWorker;
pub use metrics::{CastMetrics, CastMetricsSnapshot};
