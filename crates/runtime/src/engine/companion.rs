//! Companion agents and the owner lifecycle hooks that drive them.
//!
//! Each agent carries two timers: a one-shot lifetime timer armed at spawn
//! and a fixed-rate periodic timer armed on activation. Every transition runs
//! under the agent's own mutex, and a tick holds that mutex for its whole
//! duration, so a tick and a termination never interleave.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::{debug, error, info, info_span, warn};

use cast_core::{
    ActorId, CasterProfile, CompanionId, CompanionKindId, CompanionOracle, CompanionState,
    CompanionTemplate, Damageable, GameError, InterruptReason, Notification, SkillOracle,
    SkipReason, StatusFlags, Targetable, TerminationCause, TickPlan, mode_for, plan_tick,
    select_target,
};

use super::Engine;
use crate::api::{Result, RuntimeError};
use crate::scheduler::TaskHandle;
use crate::world::{Actor, lock};

/// One spawned companion.
#[derive(Debug)]
pub struct CompanionAgent {
    id: CompanionId,
    owner: ActorId,
    template: CompanionTemplate,
    /// Epoch milliseconds after which the next tick terminates the agent.
    deadline_ms: i64,
    inner: Mutex<AgentInner>,
}

#[derive(Debug)]
struct AgentInner {
    state: CompanionState,
    periodic: Option<TaskHandle>,
    lifetime: Option<TaskHandle>,
    ticks: u64,
    casts: u64,
}

impl CompanionAgent {
    fn new(id: CompanionId, owner: ActorId, template: CompanionTemplate, now_ms: i64) -> Self {
        let lifetime = i64::try_from(template.lifetime_ms).unwrap_or(i64::MAX);
        Self {
            id,
            owner,
            deadline_ms: now_ms.saturating_add(lifetime),
            template,
            inner: Mutex::new(AgentInner {
                state: CompanionState::Spawned,
                periodic: None,
                lifetime: None,
                ticks: 0,
                casts: 0,
            }),
        }
    }

    pub fn id(&self) -> CompanionId {
        self.id
    }

    pub fn owner(&self) -> ActorId {
        self.owner
    }

    pub fn kind(&self) -> CompanionKindId {
        self.template.kind
    }

    pub fn state(&self) -> CompanionState {
        self.lock().state
    }

    /// Ticks that found the agent active.
    pub fn ticks(&self) -> u64 {
        self.lock().ticks
    }

    /// Ticks that reached the effect dispatcher.
    pub fn casts(&self) -> u64 {
        self.lock().casts
    }

    pub fn has_periodic_timer(&self) -> bool {
        self.lock()
            .periodic
            .as_ref()
            .is_some_and(|timer| !timer.is_cancelled())
    }

    pub fn has_lifetime_timer(&self) -> bool {
        self.lock()
            .lifetime
            .as_ref()
            .is_some_and(|timer| !timer.is_cancelled())
    }

    fn lock(&self) -> MutexGuard<'_, AgentInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// What a tick ended up doing.
enum TickStep {
    Idle,
    Cast,
    Dormant,
    Terminate(TerminationCause),
}

impl Engine {
    /// Spawns a companion of `kind` for `owner`.
    ///
    /// A living companion of the same kind is replaced. The lifetime timer is
    /// armed here; the periodic timer only when the kind auto-activates or the
    /// owner engages.
    pub fn spawn_companion(
        self: &Arc<Self>,
        owner: ActorId,
        kind: CompanionKindId,
    ) -> Result<CompanionId> {
        let template = self
            .oracles
            .companions()
            .companion(kind)
            .cloned()
            .ok_or(RuntimeError::UnknownCompanionKind(kind))?;

        let shared = self
            .world
            .get(owner)
            .ok_or(RuntimeError::UnknownActor(owner))?;

        let auto_activate = template.auto_activate;
        let lifetime = Duration::from_millis(template.lifetime_ms);
        let id = self.allocate_companion_id();
        let agent = Arc::new(CompanionAgent::new(id, owner, template, self.now_ms()));

        // The agent is registered and locked before its id reaches the owner,
        // so an owner death or logout that sees the id waits for the timers
        // to be armed and then cancels them.
        let replaced = {
            let mut inner = agent.lock();
            self.register_companion(Arc::clone(&agent));
            let published = {
                let mut o = lock(&shared);
                if o.is_dead() || !o.is_online() {
                    Err(RuntimeError::OwnerUnavailable(owner))
                } else {
                    let replaced = o.companions.iter().copied().find(|id| {
                        self.companion(*id)
                            .is_some_and(|other| other.kind() == kind)
                    });
                    let remaining = o.companions.len() - usize::from(replaced.is_some());
                    let limit = self.config.max_companions_per_owner;
                    if remaining >= limit {
                        Err(RuntimeError::CompanionLimit { owner, limit })
                    } else {
                        o.companions.push(id);
                        Ok(replaced)
                    }
                }
            };
            let replaced = match published {
                Ok(replaced) => replaced,
                Err(err) => {
                    inner.state = CompanionState::Terminated;
                    self.unregister_companion(id);
                    return Err(err);
                }
            };

            let engine = Arc::clone(self);
            inner.lifetime = Some(self.scheduler.schedule_once(
                "companion_lifetime",
                lifetime,
                move || {
                    engine.terminate_companion(id, TerminationCause::LifetimeExpired);
                },
            ));
            if auto_activate {
                self.activate_locked(&agent, &mut inner);
            }
            replaced
        };

        if let Some(old) = replaced {
            self.terminate_companion(old, TerminationCause::Replaced);
        }

        self.notify(owner, Notification::CompanionsChanged { owner });
        info!(companion = %id, %owner, kind = kind.0, "companion spawned");
        Ok(id)
    }

    /// Arms the periodic timer. Returns false when the agent is already
    /// active, terminated or unknown.
    pub fn activate_companion(self: &Arc<Self>, id: CompanionId) -> bool {
        let Some(agent) = self.companion(id) else {
            return false;
        };
        let mut inner = agent.lock();
        self.activate_locked(&agent, &mut inner)
    }

    /// Terminates the companion at the owner's request.
    pub fn dismiss_companion(&self, id: CompanionId) -> bool {
        self.terminate_companion(id, TerminationCause::Dismissed)
    }

    /// Terminates a companion. Idempotent: only the first call has any effect.
    pub fn terminate_companion(&self, id: CompanionId, cause: TerminationCause) -> bool {
        let Some(agent) = self.companion(id) else {
            return false;
        };
        let mut inner = agent.lock();
        self.terminate_locked(&agent, &mut inner, cause)
    }

    /// Companion ids of `owner`, in spawn order.
    pub fn companions_of(&self, owner: ActorId) -> Vec<CompanionId> {
        self.world
            .with_actor(owner, |o| o.companions.clone())
            .unwrap_or_default()
    }

    /// Owner entered attack stance: its companions wake up.
    pub fn on_owner_engaged(self: &Arc<Self>, owner: ActorId) -> usize {
        let Some(companions) = self.world.with_actor(owner, |o| {
            o.status.insert(StatusFlags::ATTACK_STANCE);
            o.companions.clone()
        }) else {
            return 0;
        };
        companions
            .into_iter()
            .filter(|id| self.activate_companion(*id))
            .count()
    }

    /// Owner left attack stance. Stance-bound companions go dormant on their next tick.
    pub fn on_owner_disengaged(&self, owner: ActorId) {
        self.world
            .with_actor(owner, |o| o.status.remove(StatusFlags::ATTACK_STANCE));
    }

    /// Owner died: the cast is broken off, toggles drop and every companion stops.
    pub fn on_owner_death(self: &Arc<Self>, owner: ActorId) -> Result<usize> {
        let companions = self
            .world
            .with_actor(owner, |o| {
                o.status.insert(StatusFlags::DEAD);
                o.status.remove(StatusFlags::ATTACK_STANCE);
                o.companions.clone()
            })
            .ok_or(RuntimeError::UnknownActor(owner))?;
        self.interrupt_cast(owner, InterruptReason::Death);
        self.world.with_actor(owner, |o| {
            for toggle in std::mem::take(&mut o.toggles) {
                o.remove_skill_effects(toggle);
            }
        });
        let terminated = self.terminate_all(&companions, TerminationCause::OwnerDeath);
        info!(%owner, terminated, "owner died");
        Ok(terminated)
    }

    /// Owner logged out: cooldowns are persisted, companions stop and the
    /// actor leaves the world.
    ///
    /// A failed save leaves the owner online and untouched so the logout can
    /// be retried without losing cooldowns.
    pub fn on_owner_logout(self: &Arc<Self>, owner: ActorId) -> Result<()> {
        if self.world.get(owner).is_none() {
            return Err(RuntimeError::UnknownActor(owner));
        }
        // Settles any cooldown the interrupted cast consumes before the save.
        self.interrupt_cast(owner, InterruptReason::Logout);
        let saved = match self.save_cooldowns(owner) {
            Ok(saved) => saved,
            Err(err) => {
                warn!(
                    %owner,
                    error = %err,
                    code = err.error_code(),
                    "logout aborted, cooldowns not saved"
                );
                return Err(err);
            }
        };

        let companions = self
            .world
            .with_actor(owner, |o| {
                o.status.remove(StatusFlags::ONLINE);
                o.companions.clone()
            })
            .ok_or(RuntimeError::UnknownActor(owner))?;
        self.terminate_all(&companions, TerminationCause::OwnerLogout);
        self.world.with_actor(owner, Actor::clear_cooldowns);
        self.world.remove(owner);
        info!(%owner, saved, "owner logged out");
        Ok(())
    }

    /// Puts a player back into the world and re-arms its persisted cooldowns.
    pub fn on_owner_login(self: &Arc<Self>, actor: Actor) -> Result<usize> {
        let id = actor.id;
        self.world.insert(actor.with_status(StatusFlags::ONLINE));
        let Some(repository) = &self.repository else {
            return Ok(0);
        };
        let records = repository.load_cooldowns(id)?;
        let restored = self.restore_cooldowns(id, &records)?;
        info!(actor = %id, restored, "owner logged in");
        Ok(restored)
    }

    /// Stops every companion in the world. Used at shutdown.
    pub(crate) fn terminate_every_companion(&self) -> usize {
        let ids: Vec<_> = self.world.ids();
        let mut terminated = 0;
        for owner in ids {
            let companions = self.companions_of(owner);
            terminated += self.terminate_all(&companions, TerminationCause::OwnerLogout);
        }
        terminated
    }

    fn terminate_all(&self, companions: &[CompanionId], cause: TerminationCause) -> usize {
        companions
            .iter()
            .filter(|id| self.terminate_companion(**id, cause))
            .count()
    }

    fn activate_locked(self: &Arc<Self>, agent: &CompanionAgent, inner: &mut AgentInner) -> bool {
        if !inner.state.can_activate() {
            return false;
        }
        let id = agent.id;
        let period = Duration::from_millis(agent.template.period_ms);
        let engine = Arc::clone(self);
        inner.periodic = Some(self.scheduler.schedule_fixed_rate(
            "companion_tick",
            period,
            period,
            move || engine.companion_tick(id),
        ));
        inner.state = CompanionState::Active;
        debug!(companion = %id, owner = %agent.owner, "companion activated");
        true
    }

    /// Cancels both timers, marks the agent terminated and removes it from
    /// its owner. The owner is notified only if it still listed the agent.
    fn terminate_locked(
        &self,
        agent: &CompanionAgent,
        inner: &mut AgentInner,
        cause: TerminationCause,
    ) -> bool {
        if inner.state.is_terminated() {
            return false;
        }
        if let Some(periodic) = inner.periodic.take() {
            periodic.cancel();
        }
        if let Some(lifetime) = inner.lifetime.take() {
            lifetime.cancel();
        }
        inner.state = CompanionState::Terminated;
        self.unregister_companion(agent.id);

        let owner = agent.owner;
        let removed = self
            .world
            .with_actor(owner, |o| {
                let before = o.companions.len();
                o.companions.retain(|id| *id != agent.id);
                o.companions.len() != before
            })
            .unwrap_or(false);
        if removed {
            self.notify(owner, Notification::CompanionsChanged { owner });
        }
        info!(companion = %agent.id, %owner, %cause, ticks = inner.ticks, "companion terminated");
        true
    }

    /// One periodic tick. Holds the agent lock throughout.
    pub(crate) fn companion_tick(self: &Arc<Self>, id: CompanionId) {
        let Some(agent) = self.companion(id) else {
            return;
        };
        let span = info_span!("companion_tick", companion = %id, owner = %agent.owner);
        let _entered = span.enter();

        let mut inner = agent.lock();
        if inner.state != CompanionState::Active {
            return;
        }
        inner.ticks += 1;
        self.metrics.record_companion_tick();

        match self.run_tick(&agent) {
            Ok(TickStep::Idle) => {}
            Ok(TickStep::Cast) => inner.casts += 1,
            Ok(TickStep::Dormant) => {
                if let Some(periodic) = inner.periodic.take() {
                    periodic.cancel();
                }
                inner.state = CompanionState::Dormant;
                debug!("companion dormant");
            }
            Ok(TickStep::Terminate(cause)) => {
                self.terminate_locked(&agent, &mut inner, cause);
            }
            Err(err) => error!(error = %err, code = err.error_code(), "companion tick failed"),
        }
    }

    fn run_tick(self: &Arc<Self>, agent: &CompanionAgent) -> Result<TickStep> {
        let owner = self.world.with_actor(agent.owner, |o| o.view());
        let skills = self.oracles.skills();
        let plan = plan_tick(
            &agent.template,
            owner.as_ref(),
            self.now_ms(),
            agent.deadline_ms,
            self.capabilities.rng.as_ref(),
            |skill| skills.skill(skill).map(mode_for),
        );

        let (skill, mode) = match plan {
            TickPlan::Terminate(cause) => return Ok(TickStep::Terminate(cause)),
            TickPlan::GoDormant => return Ok(TickStep::Dormant),
            TickPlan::Skip(reason) => {
                debug!(%reason, "tick skipped");
                return Ok(TickStep::Idle);
            }
            TickPlan::Cast { skill, mode } => (skill, mode),
        };
        let owner = owner.ok_or(RuntimeError::UnknownActor(agent.owner))?;
        let template = skills
            .skill(skill)
            .ok_or(RuntimeError::UnknownSkill(skill))?;

        let radius = self.config.companion_radius;
        let Some(target) = select_target(&owner, mode, &self.world, radius) else {
            debug!(reason = %SkipReason::NoTarget, "tick skipped");
            return Ok(TickStep::Idle);
        };
        let Some(target_position) = self.world.with_actor(target, |t| t.position) else {
            debug!(reason = %SkipReason::NoTarget, "tick skipped");
            return Ok(TickStep::Idle);
        };
        if template.cast_range > 0
            && !owner.position.within_range(target_position, template.cast_range)
        {
            debug!(reason = %SkipReason::OutOfRange, "tick skipped");
            return Ok(TickStep::Idle);
        }

        self.notify(
            agent.owner,
            Notification::CompanionCast {
                companion: agent.id,
                owner: agent.owner,
                skill,
                target,
            },
        );
        let caster = CasterProfile {
            credited: owner.id,
            kind: owner.kind,
            position: owner.position,
            combat: owner.combat,
        };
        self.apply_to(&caster, template, target);
        self.metrics.record_companion_cast();
        debug!(%skill, %target, "companion cast");
        Ok(TickStep::Cast)
    }
}
