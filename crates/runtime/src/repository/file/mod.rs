//! File-based repository implementations.

mod cooldown;

pub use cooldown::FileCooldownRepository;
