//! Cloneable façade for driving the runtime.
//!
//! [`RuntimeHandle`] wraps the shared engine and the event bus. Every call is
//! synchronous and short: requests are validated and committed inline, and
//! anything that has to wait (cast completion, cooldown expiry, companion
//! ticks) runs later on the scheduler.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use cast_core::{
    ActorId, ActorView, CastError, CastOptions, CastOutcome, CompanionId, CompanionKindId,
    CooldownRecord, InterruptReason, SkillFamilyId, SkillId, SkillRef, TargetingContext,
};

use super::errors::Result;
use crate::engine::{CompanionAgent, Engine};
use crate::events::{Event, EventBus, Topic};
use crate::workers::CastMetricsSnapshot;
use crate::world::Actor;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct RuntimeHandle {
    engine: Arc<Engine>,
    event_bus: Arc<EventBus>,
}

impl RuntimeHandle {
    pub(crate) fn new(engine: Arc<Engine>, event_bus: Arc<EventBus>) -> Self {
        Self { engine, event_bus }
    }

    // ===== world =====

    /// Adds an actor to the world. Players go through [`Self::login`] instead
    /// when their cooldowns should be restored.
    pub fn spawn_actor(&self, actor: Actor) {
        self.engine.world.insert(actor);
    }

    pub fn view(&self, actor: ActorId) -> Option<ActorView> {
        self.engine.world.view(actor)
    }

    /// Runs `f` under the actor's lock.
    pub fn with_actor<R>(&self, actor: ActorId, f: impl FnOnce(&mut Actor) -> R) -> Option<R> {
        self.engine.world.with_actor(actor, f)
    }

    // ===== casting =====

    pub fn request_cast(
        &self,
        actor: ActorId,
        skill: SkillId,
        options: CastOptions,
    ) -> std::result::Result<CastOutcome, CastError> {
        self.engine.request_cast(actor, skill, options)
    }

    /// Orders the actor's summon to use one of its skills.
    pub fn command_summon_cast(
        &self,
        owner: ActorId,
        skill: SkillId,
        options: CastOptions,
    ) -> std::result::Result<CastOutcome, CastError> {
        self.engine.command_summon_cast(owner, skill, options)
    }

    pub fn complete_cast(&self, actor: ActorId) -> bool {
        self.engine.complete_cast(actor)
    }

    pub fn interrupt_cast(&self, actor: ActorId, reason: InterruptReason) -> bool {
        self.engine.interrupt_cast(actor, reason)
    }

    // ===== cooldowns =====

    pub fn is_on_cooldown(&self, actor: ActorId, family: SkillFamilyId) -> bool {
        self.engine.is_on_cooldown(actor, family)
    }

    pub fn cooldown_remaining(&self, actor: ActorId, family: SkillFamilyId) -> Option<u64> {
        self.engine.cooldown_remaining(actor, family)
    }

    pub fn apply_cooldown(&self, actor: ActorId, skill: SkillRef, reuse_ms: u64) -> Result<()> {
        self.engine.apply_cooldown(actor, skill, reuse_ms)
    }

    pub fn snapshot_cooldowns(&self, actor: ActorId) -> Option<Vec<CooldownRecord>> {
        self.engine.snapshot_cooldowns(actor)
    }

    pub fn restore_cooldowns(&self, actor: ActorId, records: &[CooldownRecord]) -> Result<usize> {
        self.engine.restore_cooldowns(actor, records)
    }

    pub fn pending_cooldown_timers(&self, actor: ActorId) -> usize {
        self.engine.pending_cooldown_timers(actor)
    }

    // ===== companions =====

    pub fn spawn_companion(&self, owner: ActorId, kind: CompanionKindId) -> Result<CompanionId> {
        self.engine.spawn_companion(owner, kind)
    }

    pub fn activate_companion(&self, id: CompanionId) -> bool {
        self.engine.activate_companion(id)
    }

    pub fn dismiss_companion(&self, id: CompanionId) -> bool {
        self.engine.dismiss_companion(id)
    }

    pub fn companion(&self, id: CompanionId) -> Option<Arc<CompanionAgent>> {
        self.engine.companion(id)
    }

    pub fn companions_of(&self, owner: ActorId) -> Vec<CompanionId> {
        self.engine.companions_of(owner)
    }

    // ===== owner lifecycle =====

    pub fn engage(&self, owner: ActorId) -> usize {
        self.engine.on_owner_engaged(owner)
    }

    pub fn disengage(&self, owner: ActorId) {
        self.engine.on_owner_disengaged(owner)
    }

    pub fn owner_died(&self, owner: ActorId) -> Result<usize> {
        self.engine.on_owner_death(owner)
    }

    /// Persists the player's cooldowns and removes it from the world.
    pub fn logout(&self, owner: ActorId) -> Result<()> {
        self.engine.on_owner_logout(owner)
    }

    /// Inserts the player and restores its persisted cooldowns.
    pub fn login(&self, actor: Actor) -> Result<usize> {
        self.engine.on_owner_login(actor)
    }

    // ===== observability =====

    pub fn metrics(&self) -> CastMetricsSnapshot {
        self.engine.metrics.snapshot()
    }

    pub fn now_ms(&self) -> i64 {
        self.engine.now_ms()
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Cast` - Cast lifecycle, damage, heals and effects
    /// - `Topic::Cooldown` - Skills becoming available again
    /// - `Topic::Companion` - Companion casts and owner collection changes
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use cast_runtime::Topic;
    ///
    /// let mut cooldowns = handle.subscribe(Topic::Cooldown);
    /// while let Ok(event) = cooldowns.recv().await {
    ///     // Refresh the skill bar of event.recipient
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }
}
