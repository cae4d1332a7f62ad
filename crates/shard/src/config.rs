//! Shard configuration read from the process environment.
use std::env;
use std::path::PathBuf;

use anyhow::Result;
use cast_content::{ConfigLoader, Content, ContentFactory, builtin};
use cast_core::CastConfig;
use cast_runtime::RuntimeConfig;

/// Everything the shard needs before it can build a runtime.
#[derive(Clone, Debug)]
pub struct ShardConfig {
    /// TOML file with casting tunables; the shipped defaults when unset.
    pub config_path: Option<PathBuf>,
    /// Directory holding `skills.ron` and `companions.ron`; the embedded tables when unset.
    pub data_dir: Option<PathBuf>,
    pub save_data_dir: Option<PathBuf>,
    pub enable_persistence: bool,
    pub session_id: Option<String>,
    pub event_buffer: usize,
    pub encounter_secs: u64,
}

impl Default for ShardConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            data_dir: None,
            save_data_dir: None,
            enable_persistence: true,
            session_id: None,
            event_buffer: RuntimeConfig::default().event_buffer_size,
            encounter_secs: 30,
        }
    }
}

impl ShardConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `SHARD_CONFIG` - Path to the casting config TOML (default: built-in)
    /// - `SHARD_DATA_DIR` - Directory with skill and companion tables (default: built-in)
    /// - `SAVE_DATA_DIR` - Directory for persisted cooldowns (default: platform-specific)
    /// - `ENABLE_PERSISTENCE` - Persist cooldowns to disk (default: true)
    /// - `SHARD_SESSION_ID` - Session identifier for log files (default: timestamp)
    /// - `SHARD_EVENT_BUFFER` - Per-topic event channel capacity (default: 100)
    /// - `SHARD_ENCOUNTER_SECS` - Length of the scripted encounter (default: 30)
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.config_path = env::var("SHARD_CONFIG").ok().map(PathBuf::from);
        config.data_dir = env::var("SHARD_DATA_DIR").ok().map(PathBuf::from);
        config.save_data_dir = env::var("SAVE_DATA_DIR").ok().map(PathBuf::from);

        if let Some(enable) = read_env::<bool>("ENABLE_PERSISTENCE") {
            config.enable_persistence = enable;
        }

        config.session_id = env::var("SHARD_SESSION_ID").ok();

        if let Some(capacity) = read_env::<usize>("SHARD_EVENT_BUFFER") {
            config.event_buffer = capacity.max(1);
        }
        if let Some(secs) = read_env::<u64>("SHARD_ENCOUNTER_SECS") {
            config.encounter_secs = secs;
        }

        config
    }

    pub fn load_cast_config(&self) -> Result<CastConfig> {
        match &self.config_path {
            Some(path) => ConfigLoader::load(path),
            None => builtin::config(),
        }
    }

    pub fn load_content(&self) -> Result<Content> {
        match &self.data_dir {
            Some(dir) => ContentFactory::new(dir).load_content(),
            None => builtin::content(),
        }
    }

    pub fn runtime_config(&self, cast: CastConfig) -> RuntimeConfig {
        let save_dir = self.enable_persistence.then(|| {
            self.save_data_dir
                .clone()
                .unwrap_or_else(RuntimeConfig::default_save_dir)
        });
        RuntimeConfig {
            cast,
            event_buffer_size: self.event_buffer,
            save_dir,
        }
    }
}

fn read_env<T>(key: &str) -> Option<T>
where
    T: std::str::FromStr,
{
    env::var(key).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn persistence_off_keeps_cooldowns_in_memory() {
        let config = ShardConfig {
            enable_persistence: false,
            save_data_dir: Some(PathBuf::from("/tmp/ignored")),
            ..ShardConfig::default()
        };
        let runtime = config.runtime_config(CastConfig::default());
        assert!(runtime.save_dir.is_none());
        assert_eq!(runtime.event_buffer_size, 100);
    }

    #[test]
    fn explicit_save_dir_wins() {
        let config = ShardConfig {
            save_data_dir: Some(PathBuf::from("/srv/shard/cooldowns")),
            ..ShardConfig::default()
        };
        let runtime = config.runtime_config(CastConfig::default());
        assert_eq!(runtime.save_dir, Some(PathBuf::from("/srv/shard/cooldowns")));
    }

    #[test]
    fn defaults_use_builtin_tables() {
        let config = ShardConfig::default();
        assert_eq!(config.load_cast_config().unwrap(), CastConfig::default());
        assert!(!config.load_content().unwrap().companions.is_empty());
    }
}
