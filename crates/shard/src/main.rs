//! Cast shard binary.
//!
//! Composition root: reads the environment, installs logging, loads the
//! content tables, boots a [`cast_runtime::Runtime`] and plays a scripted
//! encounter against it. Cooldowns are flushed on the way out.
//!
//! ```bash
//! RUST_LOG=debug SHARD_ENCOUNTER_SECS=60 cargo run -p shard
//! ```
mod config;
mod encounter;
mod logging;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use cast_runtime::{CompanionOracleImpl, OracleManager, Runtime, SkillOracleImpl};
use tracing::{info, warn};

use crate::config::ShardConfig;
use crate::encounter::Encounter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    dotenvy::dotenv().ok();

    let config = ShardConfig::from_env();
    let _log_guard = logging::setup_logging(config.session_id.as_deref())?;

    info!("Starting shard");
    info!(persistence = config.enable_persistence, "configuration loaded");

    let cast_config = config.load_cast_config()?;
    let content = config.load_content()?;
    info!(
        skills = content.skills.len(),
        companions = content.companions.len(),
        "content loaded"
    );

    let oracles = OracleManager::new(
        Arc::new(SkillOracleImpl::new(content.skills)),
        Arc::new(CompanionOracleImpl::new(content.companions)),
    );
    let runtime = Runtime::builder()
        .config(config.runtime_config(cast_config))
        .oracles(oracles)
        .build()
        .await?;

    let encounter = Encounter::new(
        runtime.handle(),
        Duration::from_secs(config.encounter_secs),
    );
    tokio::select! {
        result = encounter.run() => result?,
        _ = tokio::signal::ctrl_c() => warn!("interrupted, shutting down"),
    }

    runtime.shutdown().await?;
    info!("shard stopped");
    Ok(())
}
