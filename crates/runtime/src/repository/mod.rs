//! Repository layer for dynamic runtime data
//!
//! Repositories handle data that CHANGES during gameplay. Here that is the
//! per-actor cooldown record list, written at logout and by the periodic
//! flush, and read back at login.
//!
//! Static game content (skills, companion kinds) is handled by Oracles, not Repositories.

mod error;
mod file;
mod memory;
mod traits;

pub use error::{RepositoryError, Result};
pub use file::FileCooldownRepository;
pub use memory::InMemoryCooldownRepo;
pub use traits::CooldownRepository;
