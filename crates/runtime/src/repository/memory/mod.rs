//! In-memory repository implementations for testing and development.

mod cooldown;

pub use cooldown::InMemoryCooldownRepo;
