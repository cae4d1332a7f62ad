//! Cooldown registry: entries plus their expiry tasks.
//!
//! An entry and its timer are always installed and removed together under
//! the actor's lock. The expiry task only removes the entry it was armed for,
//! so a timer that loses a race against a re-arm leaves the newer entry alone.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use cast_core::{
    ActorId, CooldownEntry, CooldownRecord, GameError, Notification, SkillFamilyId, SkillOracle,
    SkillRef, SkillTemplate, plan_restore,
};

use super::Engine;
use crate::api::{Result, RuntimeError};
use crate::world::Actor;

/// Outcome of one flush pass over the online players.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub saved: usize,
    /// Players whose save failed; their records stay in memory for the next pass.
    pub failed: Vec<ActorId>,
}

impl FlushReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

impl Engine {
    pub fn is_on_cooldown(&self, actor: ActorId, family: SkillFamilyId) -> bool {
        let now = self.now_ms();
        self.world
            .with_actor(actor, |a| a.cooldowns.is_on_cooldown(family, now))
            .unwrap_or(false)
    }

    /// Time left on `family` for `actor`, if it is cooling down.
    pub fn cooldown_remaining(&self, actor: ActorId, family: SkillFamilyId) -> Option<u64> {
        let now = self.now_ms();
        self.world
            .with_actor(actor, |a| a.cooldowns.remaining_ms(family, now))
            .flatten()
    }

    /// Starts (or restarts) the cooldown of `skill`'s family.
    pub fn apply_cooldown(
        self: &Arc<Self>,
        actor: ActorId,
        skill: SkillRef,
        reuse_ms: u64,
    ) -> Result<()> {
        let family = self.oracles.skills().family(skill);
        let entry = CooldownEntry::started_at(family, skill, reuse_ms, self.now_ms());
        self.world
            .with_actor(actor, |a| self.arm_cooldown(a, entry))
            .ok_or(RuntimeError::UnknownActor(actor))
    }

    /// Active cooldowns of `actor` in persisted form.
    pub fn snapshot_cooldowns(&self, actor: ActorId) -> Option<Vec<CooldownRecord>> {
        let now = self.now_ms();
        self.world.with_actor(actor, |a| a.cooldowns.snapshot(now))
    }

    /// Re-arms persisted cooldowns. Records that are over, or within the
    /// restore epsilon of being over, are dropped.
    ///
    /// Returns the number of entries armed.
    pub fn restore_cooldowns(
        self: &Arc<Self>,
        actor: ActorId,
        records: &[CooldownRecord],
    ) -> Result<usize> {
        let entries = plan_restore(
            records,
            self.now_ms(),
            self.config.restore_epsilon_ms,
            self.oracles.skills(),
        );
        let restored = entries.len();
        self.world
            .with_actor(actor, |a| {
                for entry in entries {
                    self.arm_cooldown(a, entry);
                }
            })
            .ok_or(RuntimeError::UnknownActor(actor))?;
        self.metrics.record_restored(restored);
        debug!(%actor, restored, dropped = records.len() - restored, "cooldowns restored");
        Ok(restored)
    }

    /// Expiry tasks still pending for `actor`.
    pub fn pending_cooldown_timers(&self, actor: ActorId) -> usize {
        self.world
            .with_actor(actor, |a| {
                a.cooldown_timers
                    .values()
                    .filter(|timer| !timer.is_cancelled())
                    .count()
            })
            .unwrap_or(0)
    }

    /// Writes the cooldowns of one actor to the repository.
    pub fn save_cooldowns(&self, actor: ActorId) -> Result<usize> {
        let Some(repository) = &self.repository else {
            return Ok(0);
        };
        let records = self
            .snapshot_cooldowns(actor)
            .ok_or(RuntimeError::UnknownActor(actor))?;
        repository.save_cooldowns(actor, &records)?;
        Ok(records.len())
    }

    /// Saves every online player's cooldowns. A failing save is logged and
    /// the pass moves on to the next player.
    pub fn flush_cooldowns(&self) -> FlushReport {
        let mut report = FlushReport::default();
        if self.repository.is_none() {
            return report;
        }
        for actor in self.world.ids() {
            let online = self
                .world
                .with_actor(actor, |a| a.kind.is_player() && a.is_online())
                .unwrap_or(false);
            if !online {
                continue;
            }
            match self.save_cooldowns(actor) {
                Ok(_) => report.saved += 1,
                // Logged out between listing and saving.
                Err(RuntimeError::UnknownActor(_)) => {}
                Err(err) => {
                    warn!(
                        %actor,
                        error = %err,
                        code = err.error_code(),
                        severity = err.severity().as_str(),
                        "cooldown save failed"
                    );
                    report.failed.push(actor);
                }
            }
        }
        info!(saved = report.saved, failed = report.failed.len(), "cooldowns flushed");
        report
    }

    pub(crate) fn start_cooldown(self: &Arc<Self>, actor: &mut Actor, template: &SkillTemplate) {
        let entry = CooldownEntry::started_at(
            template.family,
            template.skill_ref(),
            template.reuse_ms,
            self.now_ms(),
        );
        self.arm_cooldown(actor, entry);
    }

    /// Installs `entry` and its expiry task, replacing any running one.
    pub(crate) fn arm_cooldown(self: &Arc<Self>, actor: &mut Actor, entry: CooldownEntry) {
        let remaining = entry.remaining_ms(self.now_ms());
        let (id, family, expiry) = (actor.id, entry.family, entry.expiry_epoch_ms);
        actor.cooldowns.insert(entry);

        let engine = Arc::clone(self);
        let timer = self.scheduler.schedule_once(
            "cooldown_expiry",
            Duration::from_millis(remaining),
            move || engine.expire_cooldown(id, family, expiry),
        );
        if let Some(previous) = actor.cooldown_timers.insert(family, timer) {
            previous.cancel();
        }
    }

    fn expire_cooldown(&self, actor: ActorId, family: SkillFamilyId, expiry_epoch_ms: i64) {
        let expired = self
            .world
            .with_actor(actor, |a| {
                let removed = a.cooldowns.remove_if_expiry(family, expiry_epoch_ms);
                if removed {
                    a.cooldown_timers.remove(&family);
                }
                removed
            })
            .unwrap_or(false);
        if expired {
            self.notify(actor, Notification::SkillAvailable { actor, family });
            debug!(%actor, %family, "cooldown expired");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use cast_core::{
        ActorId, CastConfig, NullNotifier, SkillCategory, SkillFamilyId, SkillRef, SkillTemplate,
    };

    use crate::clock::SessionClock;
    use crate::engine::{Capabilities, Engine};
    use crate::oracle::{CompanionOracleImpl, OracleManager, SkillOracleImpl};
    use crate::scheduler::Scheduler;
    use crate::world::Actor;

    const EPOCH_MS: i64 = 1_000_000;
    const FOCUS: SkillRef = SkillRef::new(60, 1);

    fn engine() -> Arc<Engine> {
        let focus = SkillTemplate::new(FOCUS, "Focus", SkillCategory::Buff).with_timing(0, 5_000);
        let oracles = OracleManager::new(
            Arc::new(SkillOracleImpl::new([focus])),
            Arc::new(CompanionOracleImpl::new([])),
        );
        Arc::new(Engine::new(
            Scheduler::current(),
            SessionClock::anchored_at(EPOCH_MS),
            oracles,
            Capabilities::default(),
            Arc::new(NullNotifier),
            CastConfig::default(),
            None,
        ))
    }

    #[tokio::test(start_paused = true)]
    async fn stale_expiry_leaves_the_newer_entry() {
        let engine = engine();
        engine.world.insert(Actor::player(1));
        let family = SkillFamilyId(FOCUS.id.0);

        engine.apply_cooldown(ActorId(1), FOCUS, 5_000).unwrap();
        tokio::time::sleep(Duration::from_millis(1_000)).await;
        engine.apply_cooldown(ActorId(1), FOCUS, 5_000).unwrap();

        // The first arming's expiry task runs late, after the re-arm.
        engine.expire_cooldown(ActorId(1), family, EPOCH_MS + 5_000);
        assert_eq!(engine.cooldown_remaining(ActorId(1), family), Some(5_000));
        assert_eq!(engine.pending_cooldown_timers(ActorId(1)), 1);

        engine.expire_cooldown(ActorId(1), family, EPOCH_MS + 6_000);
        assert!(!engine.is_on_cooldown(ActorId(1), family));
        assert_eq!(engine.pending_cooldown_timers(ActorId(1)), 0);
    }
}
