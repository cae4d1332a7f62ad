//! Repository contracts for saving and loading mutable runtime state.

use cast_core::{ActorId, CooldownRecord};

use super::Result;

/// Repository for per-actor cooldown records.
///
/// Records carry absolute expiry stamps, so a save followed by a load on
/// another process restores the same remaining time.
pub trait CooldownRepository: Send + Sync {
    /// Load the saved records of an actor; empty when nothing was saved.
    fn load_cooldowns(&self, actor: ActorId) -> Result<Vec<CooldownRecord>>;

    /// Replace the saved records of an actor.
    ///
    /// Saving an empty list removes whatever was stored.
    fn save_cooldowns(&self, actor: ActorId, records: &[CooldownRecord]) -> Result<()>;

    /// Actors with stored records, in ascending order.
    fn list_actors(&self) -> Result<Vec<ActorId>> {
        Ok(vec![])
    }
}
