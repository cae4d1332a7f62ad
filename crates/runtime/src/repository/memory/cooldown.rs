//! In-memory CooldownRepository implementation for tests and local runs.

use std::collections::HashMap;
use std::sync::RwLock;

use cast_core::{ActorId, CooldownRecord};

use crate::repository::{CooldownRepository, RepositoryError, Result};

/// In-memory implementation of CooldownRepository.
#[derive(Default)]
pub struct InMemoryCooldownRepo {
    records: RwLock<HashMap<ActorId, Vec<CooldownRecord>>>,
}

impl InMemoryCooldownRepo {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CooldownRepository for InMemoryCooldownRepo {
    fn load_cooldowns(&self, actor: ActorId) -> Result<Vec<CooldownRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        Ok(records.get(&actor).cloned().unwrap_or_default())
    }

    fn save_cooldowns(&self, actor: ActorId, records: &[CooldownRecord]) -> Result<()> {
        let mut stored = self
            .records
            .write()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        if records.is_empty() {
            stored.remove(&actor);
        } else {
            stored.insert(actor, records.to_vec());
        }
        Ok(())
    }

    fn list_actors(&self) -> Result<Vec<ActorId>> {
        let records = self
            .records
            .read()
            .map_err(|_| RepositoryError::LockPoisoned)?;
        let mut actors: Vec<_> = records.keys().copied().collect();
        actors.sort_unstable();
        Ok(actors)
    }
}
