//! File-based CooldownRepository implementation.

use std::fs;
use std::path::{Path, PathBuf};

use cast_core::{ActorId, CooldownRecord};

use crate::repository::{CooldownRepository, RepositoryError, Result};

/// File-based implementation of CooldownRepository.
///
/// Stores each actor's records as `cooldowns_{actor}.bin` in bincode format.
/// Writes go to a temp file first and are renamed into place, so a crash
/// mid-write leaves the previous save intact.
pub struct FileCooldownRepository {
    base_dir: PathBuf,
}

impl FileCooldownRepository {
    /// Create a new file-based cooldown repository.
    pub fn new(base_dir: impl AsRef<Path>) -> Result<Self> {
        let base_dir = base_dir.as_ref().to_path_buf();
        fs::create_dir_all(&base_dir).map_err(RepositoryError::Io)?;
        Ok(Self { base_dir })
    }

    fn record_path(&self, actor: ActorId) -> PathBuf {
        self.base_dir.join(format!("cooldowns_{}.bin", actor.0))
    }
}

impl CooldownRepository for FileCooldownRepository {
    fn load_cooldowns(&self, actor: ActorId) -> Result<Vec<CooldownRecord>> {
        let path = self.record_path(actor);

        if !path.exists() {
            return Ok(Vec::new());
        }

        let bytes = fs::read(&path).map_err(RepositoryError::Io)?;
        let records: Vec<CooldownRecord> = bincode::deserialize(&bytes)
            .map_err(|e| RepositoryError::CorruptedData(format!("{}: {}", path.display(), e)))?;

        tracing::debug!("Loaded {} cooldowns for {} from {}", records.len(), actor, path.display());

        Ok(records)
    }

    fn save_cooldowns(&self, actor: ActorId, records: &[CooldownRecord]) -> Result<()> {
        let path = self.record_path(actor);

        if records.is_empty() {
            if path.exists() {
                fs::remove_file(&path).map_err(RepositoryError::Io)?;
                tracing::debug!("Deleted cooldowns for {}", actor);
            }
            return Ok(());
        }

        let temp_path = path.with_extension("bin.tmp");

        let bytes = bincode::serialize(records)
            .map_err(|e| RepositoryError::Serialization(e.to_string()))?;

        fs::write(&temp_path, bytes).map_err(RepositoryError::Io)?;

        // Atomic rename
        fs::rename(&temp_path, &path).map_err(RepositoryError::Io)?;

        tracing::debug!("Saved {} cooldowns for {} to {}", records.len(), actor, path.display());

        Ok(())
    }

    fn list_actors(&self) -> Result<Vec<ActorId>> {
        let mut actors = Vec::new();

        let entries = fs::read_dir(&self.base_dir).map_err(RepositoryError::Io)?;

        for entry in entries {
            let entry = entry.map_err(RepositoryError::Io)?;
            let path = entry.path();

            if let Some(filename) = path.file_name().and_then(|s| s.to_str())
                && let Some(id) = filename
                    .strip_prefix("cooldowns_")
                    .and_then(|s| s.strip_suffix(".bin"))
                && let Ok(id) = id.parse::<u32>()
            {
                actors.push(ActorId(id));
            }
        }

        actors.sort_unstable();
        Ok(actors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<CooldownRecord> {
        vec![
            CooldownRecord {
                skill_id: 1177,
                skill_level: 3,
                expiry_epoch_ms: 1_700_000_005_000,
                original_duration_ms: 5_000,
            },
            CooldownRecord {
                skill_id: 1230,
                skill_level: 1,
                expiry_epoch_ms: 1_700_000_030_000,
                original_duration_ms: 30_000,
            },
        ]
    }

    #[test]
    fn save_then_load_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCooldownRepository::new(dir.path()).unwrap();
        repo.save_cooldowns(ActorId(7), &records()).unwrap();

        let reopened = FileCooldownRepository::new(dir.path()).unwrap();
        assert_eq!(reopened.load_cooldowns(ActorId(7)).unwrap(), records());
        assert_eq!(reopened.list_actors().unwrap(), vec![ActorId(7)]);
        assert!(!dir.path().join("cooldowns_7.bin.tmp").exists());
    }

    #[test]
    fn missing_actor_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCooldownRepository::new(dir.path()).unwrap();
        assert!(repo.load_cooldowns(ActorId(1)).unwrap().is_empty());
    }

    #[test]
    fn empty_save_removes_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCooldownRepository::new(dir.path()).unwrap();
        repo.save_cooldowns(ActorId(2), &records()).unwrap();
        repo.save_cooldowns(ActorId(2), &[]).unwrap();
        assert!(repo.list_actors().unwrap().is_empty());
    }

    #[test]
    fn garbage_is_reported_as_corruption() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileCooldownRepository::new(dir.path()).unwrap();
        fs::write(dir.path().join("cooldowns_3.bin"), [0xff, 0xff, 0xff]).unwrap();
        assert!(matches!(
            repo.load_cooldowns(ActorId(3)),
            Err(RepositoryError::CorruptedData(_))
        ));
    }
}
