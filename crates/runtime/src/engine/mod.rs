//! Shared execution context for casting, cooldowns and companions.
//!
//! [`Engine`] is the single owner of the world, the scheduler and the
//! capability objects. It lives behind an `Arc` so timer callbacks can hold a
//! reference of their own; every entry point that may arm a timer therefore
//! takes `self: &Arc<Self>`.
//!
//! Lock discipline:
//! - at most one actor lock is held at a time
//! - a companion agent lock may be held while taking an actor lock, never the
//!   other way around
//! - registry locks (world map, companion map) are only held to clone handles
mod cast;
mod companion;
mod cooldown;

pub use companion::CompanionAgent;
pub use cooldown::FlushReport;

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use cast_core::{
    ActorId, CastConfig, CastEnv, CombatFormulas, CompanionId, DrainResolver, Notification,
    Notifier, Pathfinding, RandomSource, ResourceGate, SkillOracle, SkillRef, SkillTemplate,
    VitalsGate,
};

use crate::capability::{OpenField, StandardDrain, StandardFormulas, ThreadRandom};
use crate::clock::SessionClock;
use crate::oracle::OracleManager;
use crate::repository::CooldownRepository;
use crate::scheduler::Scheduler;
use crate::workers::CastMetrics;
use crate::world::World;

/// Pluggable collaborators consumed by the rules.
#[derive(Clone)]
pub struct Capabilities {
    pub formulas: Arc<dyn CombatFormulas>,
    pub drain: Arc<dyn DrainResolver>,
    pub pathfinding: Arc<dyn Pathfinding>,
    pub resources: Arc<dyn ResourceGate>,
    pub rng: Arc<dyn RandomSource>,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            formulas: Arc::new(StandardFormulas),
            drain: Arc::new(StandardDrain),
            pathfinding: Arc::new(OpenField),
            resources: Arc::new(VitalsGate),
            rng: Arc::new(ThreadRandom),
        }
    }
}

pub struct Engine {
    pub(crate) world: World,
    pub(crate) scheduler: Scheduler,
    pub(crate) clock: SessionClock,
    pub(crate) oracles: OracleManager,
    pub(crate) capabilities: Capabilities,
    pub(crate) notifier: Arc<dyn Notifier>,
    pub(crate) config: CastConfig,
    pub(crate) metrics: CastMetrics,
    pub(crate) repository: Option<Arc<dyn CooldownRepository>>,
    companions: RwLock<HashMap<CompanionId, Arc<CompanionAgent>>>,
    next_companion: AtomicU64,
}

impl Engine {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        scheduler: Scheduler,
        clock: SessionClock,
        oracles: OracleManager,
        capabilities: Capabilities,
        notifier: Arc<dyn Notifier>,
        config: CastConfig,
        repository: Option<Arc<dyn CooldownRepository>>,
    ) -> Self {
        Self {
            world: World::new(),
            scheduler,
            clock,
            oracles,
            capabilities,
            notifier,
            config,
            metrics: CastMetrics::new(),
            repository,
            companions: RwLock::new(HashMap::new()),
            next_companion: AtomicU64::new(1),
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn metrics(&self) -> &CastMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &CastConfig {
        &self.config
    }

    /// Wall-clock epoch milliseconds, as seen by cooldowns and companion deadlines.
    pub fn now_ms(&self) -> i64 {
        self.clock.now_ms()
    }

    pub(crate) fn env(&self) -> CastEnv<'_> {
        CastEnv {
            skills: self.oracles.skills(),
            formulas: self.capabilities.formulas.as_ref(),
            drain: self.capabilities.drain.as_ref(),
            pathfinding: self.capabilities.pathfinding.as_ref(),
            resources: self.capabilities.resources.as_ref(),
            notifier: self.notifier.as_ref(),
            config: &self.config,
        }
    }

    pub(crate) fn template(&self, skill: SkillRef) -> Option<&SkillTemplate> {
        self.oracles.skills().skill(skill)
    }

    pub(crate) fn notify(&self, recipient: ActorId, notification: Notification) {
        self.notifier.notify(recipient, notification);
    }

    // ===== companion registry =====

    pub fn companion(&self, id: CompanionId) -> Option<Arc<CompanionAgent>> {
        self.companions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned()
    }

    pub fn companion_count(&self) -> usize {
        self.companions
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn register_companion(&self, agent: Arc<CompanionAgent>) {
        self.companions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(agent.id(), agent);
    }

    fn unregister_companion(&self, id: CompanionId) {
        self.companions
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&id);
    }

    fn allocate_companion_id(&self) -> CompanionId {
        CompanionId(self.next_companion.fetch_add(1, Ordering::Relaxed))
    }
}
