//! Capabilities the rules consume but do not implement.
//!
//! Skill tables, combat formulas, line of sight, resource accounting,
//! randomness and the notification sink are injected as read-only trait
//! objects. The [`CastEnv`] aggregate bundles them so validation and the
//! effect dispatcher can reach everything they need without depending on
//! concrete implementations.
mod formulas;
mod notify;
mod oracle;
mod rng;
mod world;

pub use formulas::{CombatFormulas, DrainResolver, DrainResult, ShieldBlock};
pub use notify::{Notification, Notifier, NullNotifier};
pub use oracle::{CompanionOracle, SkillOracle};
pub use rng::RandomSource;
pub use world::{Pathfinding, Resource, ResourceGate, VitalsGate};

use crate::config::CastConfig;

/// Aggregates the capabilities required by validation and effect dispatch.
#[derive(Clone, Copy)]
pub struct CastEnv<'a> {
    pub skills: &'a dyn SkillOracle,
    pub formulas: &'a dyn CombatFormulas,
    pub drain: &'a dyn DrainResolver,
    pub pathfinding: &'a dyn Pathfinding,
    pub resources: &'a dyn ResourceGate,
    pub notifier: &'a dyn Notifier,
    pub config: &'a CastConfig,
}

impl std::fmt::Debug for CastEnv<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CastEnv")
            .field("config", self.config)
            .finish_non_exhaustive()
    }
}
