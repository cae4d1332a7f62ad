//! Casting configuration loader.

use std::path::Path;

use cast_core::CastConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for casting configuration from TOML files.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    ///
    /// Keys missing from the file keep their [`CastConfig::default`] value.
    pub fn load(path: &Path) -> LoadResult<CastConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))
    }

    pub fn parse(content: &str) -> LoadResult<CastConfig> {
        let config: CastConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.max_companions_per_owner == 0 {
            anyhow::bail!("max_companions_per_owner must be at least 1");
        }
        if config.cooldown_flush_interval_ms == 0 {
            anyhow::bail!("cooldown_flush_interval_ms must be positive");
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_file_keeps_defaults() {
        let config = ConfigLoader::parse("companion_radius = 1200\n").unwrap();
        assert_eq!(config.companion_radius, 1_200);
        assert_eq!(
            config.restore_epsilon_ms,
            CastConfig::DEFAULT_RESTORE_EPSILON_MS
        );
        assert!(config.interrupt_on_damage);
    }

    #[test]
    fn empty_file_is_the_default() {
        assert_eq!(ConfigLoader::parse("").unwrap(), CastConfig::default());
    }

    #[test]
    fn zero_companion_limit_is_rejected() {
        assert!(ConfigLoader::parse("max_companions_per_owner = 0").is_err());
    }

    #[test]
    fn loads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "restore_epsilon_ms = 250\ninterrupt_on_damage = false\n").unwrap();
        let config = ConfigLoader::load(&path).unwrap();
        assert_eq!(config.restore_epsilon_ms, 250);
        assert!(!config.interrupt_on_damage);
    }
}
