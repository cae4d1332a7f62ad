//! Runtime wrappers around static game content oracles.
//!
//! These implementations expose the `cast-core` oracle traits and bundle them
//! into an [`OracleManager`]. The data is immutable at runtime; dynamic state
//! lives in the world and in repositories.
mod companions;
mod skills;

use std::sync::Arc;

pub use companions::CompanionOracleImpl;
pub use skills::SkillOracleImpl;

/// Manages all oracle implementations and provides unified access
#[derive(Clone, Debug)]
pub struct OracleManager {
    pub(crate) skills: Arc<SkillOracleImpl>,
    pub(crate) companions: Arc<CompanionOracleImpl>,
}

impl OracleManager {
    /// Creates a new oracle manager
    pub fn new(skills: Arc<SkillOracleImpl>, companions: Arc<CompanionOracleImpl>) -> Self {
        Self { skills, companions }
    }

    pub fn skills(&self) -> &SkillOracleImpl {
        &self.skills
    }

    pub fn companions(&self) -> &CompanionOracleImpl {
        &self.companions
    }
}
