//! Topic-based event bus for runtime events.
//!
//! Every [`cast_core::Notification`] the rules emit is published to a topic;
//! consumers subscribe only to the topics they need.

mod bus;

pub use bus::{BusNotifier, Event, EventBus, Topic};
