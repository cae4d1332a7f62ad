//! Cast state machine.
//!
//! A request runs in three steps so validation never happens under a lock:
//! snapshot the caster, validate the snapshot, then commit under the caster's
//! lock if nothing changed in between (`cast_seq` is the witness). Completion
//! and interrupt race on the same slot; whichever flips the phase first wins.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use cast_core::{
    ActorId, ActorView, BlockReason, CastError, CastOptions, CastOutcome, CasterSkillState,
    Damageable, EffectOutcome, GameError, InterruptReason, Notification, ResolvedCast,
    SkillCategory, SkillCaster, SkillId, SkillRef, SkillTemplate, SkillUseHolder, StatusFlags,
    Targetable, validate_cast,
};

use super::Engine;
use crate::world::{Actor, CastPhase, CurrentCast, lock};

/// Caster state captured before validation.
struct Snapshot {
    view: ActorView,
    holder: SkillUseHolder,
    state: CasterSkillState,
    seq: u64,
}

enum Admission {
    Validate(Snapshot),
    Queued(SkillRef),
}

enum Commit {
    Done(CastOutcome),
    /// The caster changed while the snapshot was being validated.
    Retry,
}

impl Engine {
    /// Requests `skill` for `actor`.
    ///
    /// Queues the request when another skill is in flight. Rejections leave the
    /// caster untouched, except that recasting an active toggle switches it off.
    pub fn request_cast(
        self: &Arc<Self>,
        actor: ActorId,
        skill: SkillId,
        options: CastOptions,
    ) -> Result<CastOutcome, CastError> {
        loop {
            let snapshot = match self.admit(actor, skill, options)? {
                Admission::Queued(skill) => {
                    self.metrics.record_queued();
                    debug!(%actor, %skill, "cast queued");
                    return Ok(CastOutcome::Queued { skill });
                }
                Admission::Validate(snapshot) => snapshot,
            };
            let template = self
                .template(snapshot.holder.skill)
                .ok_or(CastError::ActorStateBlocked(BlockReason::SkillNotLearned))?;

            let env = self.env();
            let resolved = match validate_cast(
                &snapshot.view,
                template,
                snapshot.state,
                snapshot.holder.options(),
                &env,
                &self.world,
            ) {
                Ok(resolved) => resolved,
                Err(CastError::TogglePreventsRecast) => {
                    self.cancel_toggle(actor, template);
                    return Err(CastError::TogglePreventsRecast);
                }
                Err(err) => {
                    self.metrics.record_rejected();
                    debug!(%actor, skill = %snapshot.holder.skill, error = %err, "cast rejected");
                    return Err(err);
                }
            };

            match self.commit(actor, &snapshot, template, resolved)? {
                Commit::Done(outcome) => return Ok(outcome),
                Commit::Retry => continue,
            }
        }
    }

    /// Completes the in-flight cast now instead of waiting for its timer.
    ///
    /// Returns false when there is nothing left to complete.
    pub fn complete_cast(self: &Arc<Self>, actor: ActorId) -> bool {
        let seq = self.world.with_actor(actor, |a| {
            a.current
                .as_ref()
                .filter(|current| current.phase == CastPhase::Casting)
                .map(|current| current.seq)
        });
        match seq.flatten() {
            Some(seq) => self.finish_cast(actor, seq),
            None => false,
        }
    }

    /// Breaks off the in-flight cast.
    ///
    /// A no-op once effects are being dispatched, or when nothing is being
    /// cast. The queued request is dropped with the current one.
    pub fn interrupt_cast(self: &Arc<Self>, actor: ActorId, reason: InterruptReason) -> bool {
        let Some(shared) = self.world.get(actor) else {
            return false;
        };
        let mut a = lock(&shared);
        let interruptible = a
            .current
            .as_ref()
            .is_some_and(|current| current.phase == CastPhase::Casting);
        if !interruptible {
            return false;
        }
        let Some(current) = a.current.take() else {
            return false;
        };
        if let Some(completion) = &current.completion {
            completion.cancel();
        }
        a.status.remove(StatusFlags::CASTING);
        a.cast_seq += 1;
        a.queued = None;

        let skill = current.holder.skill;
        if let Some(template) = self.template(skill)
            && template.consumed_on_interrupt
            && template.reuse_ms > 0
        {
            self.start_cooldown(&mut a, template);
        }
        drop(a);

        self.notify(
            actor,
            Notification::CastInterrupted {
                caster: actor,
                skill,
                reason,
            },
        );
        self.metrics.record_interrupted();
        debug!(%actor, %skill, %reason, "cast interrupted");
        true
    }

    /// Orders `owner`'s summon to cast `skill`.
    ///
    /// The order occupies the owner's companion slot while the summon's own
    /// request runs.
    pub fn command_summon_cast(
        self: &Arc<Self>,
        owner: ActorId,
        skill: SkillId,
        options: CastOptions,
    ) -> Result<CastOutcome, CastError> {
        let summon = self
            .world
            .with_actor(owner, |a| a.summon)
            .ok_or(CastError::ActorStateBlocked(BlockReason::UnknownActor))?
            .ok_or(CastError::ActorStateBlocked(BlockReason::UnknownActor))?;
        let learned = self
            .world
            .with_actor(summon, |s| s.learned(skill))
            .ok_or(CastError::ActorStateBlocked(BlockReason::UnknownActor))?
            .ok_or(CastError::ActorStateBlocked(BlockReason::SkillNotLearned))?;

        self.world.with_actor(owner, |a| {
            a.current_companion = Some(SkillUseHolder::new(learned, options));
        });
        let result = self.request_cast(summon, skill, options);
        self.world.with_actor(owner, |a| a.current_companion = None);
        result
    }

    /// Takes the caster snapshot, or parks the request in the queued slot.
    fn admit(
        &self,
        actor: ActorId,
        skill: SkillId,
        options: CastOptions,
    ) -> Result<Admission, CastError> {
        let shared = self
            .world
            .get(actor)
            .ok_or(CastError::ActorStateBlocked(BlockReason::UnknownActor))?;
        let mut a = lock(&shared);
        let skill = a
            .learned(skill)
            .ok_or(CastError::ActorStateBlocked(BlockReason::SkillNotLearned))?;
        let Some(template) = self.template(skill) else {
            warn!(%actor, %skill, "learned skill has no template");
            return Err(CastError::ActorStateBlocked(BlockReason::SkillNotLearned));
        };
        let holder = SkillUseHolder::new(skill, options);

        if let Some(current) = &a.current {
            if current.holder.skill.id == skill.id {
                return Err(CastError::ActorStateBlocked(BlockReason::SameSkillInFlight));
            }
            a.queued = Some(holder);
            drop(a);
            self.notify(actor, Notification::CastQueued { caster: actor, skill });
            return Ok(Admission::Queued(skill));
        }

        let state = CasterSkillState {
            toggle_active: a.toggles.contains(&skill.id),
            cooldown_remaining_ms: a.cooldowns.remaining_ms(template.family, self.now_ms()),
        };
        Ok(Admission::Validate(Snapshot {
            view: a.view(),
            holder,
            state,
            seq: a.cast_seq,
        }))
    }

    /// Occupies the current slot with a validated request.
    fn commit(
        self: &Arc<Self>,
        actor: ActorId,
        snapshot: &Snapshot,
        template: &SkillTemplate,
        resolved: ResolvedCast,
    ) -> Result<Commit, CastError> {
        let shared = self
            .world
            .get(actor)
            .ok_or(CastError::ActorStateBlocked(BlockReason::UnknownActor))?;
        let mut a = lock(&shared);
        if a.cast_seq != snapshot.seq || a.current.is_some() {
            return Ok(Commit::Retry);
        }
        // Vitals may have moved since the snapshot was taken.
        if let Err(resource) = self.capabilities.resources.check(&a.view(), template) {
            self.metrics.record_rejected();
            return Err(CastError::InsufficientResource(resource));
        }
        self.capabilities.resources.consume(&mut a.vitals, template);

        a.cast_seq += 1;
        let seq = a.cast_seq;
        let skill = template.skill_ref();
        let cast_time_ms = template.cast_time_ms;
        let completion = (cast_time_ms > 0).then(|| {
            let engine = Arc::clone(self);
            self.scheduler.schedule_once(
                "cast_completion",
                Duration::from_millis(cast_time_ms),
                move || {
                    engine.finish_cast(actor, seq);
                },
            )
        });
        let primary = resolved.primary;
        a.status.insert(StatusFlags::CASTING);
        a.current = Some(CurrentCast {
            holder: snapshot.holder,
            resolved,
            phase: CastPhase::Casting,
            seq,
            completion,
        });
        drop(a);

        self.notify(
            actor,
            Notification::CastStarted {
                caster: actor,
                skill,
                target: primary,
                cast_time_ms,
            },
        );
        self.metrics.record_started();
        debug!(%actor, %skill, cast_time_ms, "cast started");

        if cast_time_ms == 0 {
            self.finish_cast(actor, seq);
            return Ok(Commit::Done(CastOutcome::Completed { skill }));
        }
        Ok(Commit::Done(CastOutcome::Started {
            skill,
            cast_time_ms,
        }))
    }

    /// Dispatches the effects of cast `seq` and frees the slot.
    ///
    /// Returns false when the cast was already interrupted or completed.
    pub(crate) fn finish_cast(self: &Arc<Self>, actor: ActorId, seq: u64) -> bool {
        let Some(shared) = self.world.get(actor) else {
            return false;
        };
        let (caster, resolved) = {
            let mut a = lock(&shared);
            let Some(current) = a.current.as_mut() else {
                return false;
            };
            if current.seq != seq || current.phase != CastPhase::Casting {
                return false;
            }
            current.phase = CastPhase::Completing;
            if let Some(completion) = current.completion.take() {
                completion.cancel();
            }
            let resolved = current.resolved.clone();
            a.status.remove(StatusFlags::CASTING);
            (a.view(), resolved)
        };

        let template = self.template(resolved.skill);
        if let Some(template) = template {
            for &target in &resolved.targets {
                self.apply_to(&caster, template, target);
            }
        } else {
            warn!(%actor, skill = %resolved.skill, "template vanished before completion");
        }

        let queued = {
            let mut a = lock(&shared);
            if a.current.as_ref().is_none_or(|current| current.seq != seq) {
                return false;
            }
            if let Some(template) = template {
                if template.is_toggle() {
                    a.toggles.insert(template.id);
                }
                if template.reuse_ms > 0 {
                    self.start_cooldown(&mut a, template);
                }
            }
            a.current = None;
            a.cast_seq += 1;
            a.queued.take()
        };

        self.notify(
            actor,
            Notification::CastCompleted {
                caster: actor,
                skill: resolved.skill,
            },
        );
        self.metrics.record_completed();
        debug!(%actor, skill = %resolved.skill, "cast completed");

        if let Some(holder) = queued {
            self.promote(actor, holder);
        }
        true
    }

    /// Applies one cast to one target, then runs the follow-ups outside the
    /// target's lock.
    pub(crate) fn apply_to<C>(self: &Arc<Self>, caster: &C, template: &SkillTemplate, target: ActorId)
    where
        C: SkillCaster + ?Sized,
    {
        let Some(shared) = self.world.get(target) else {
            return;
        };
        let env = self.env();
        let (outcome, died) = {
            let mut t = lock(&shared);
            if t.is_dead() && template.category != SkillCategory::Sweep {
                return;
            }
            let outcome = cast_core::dispatch(caster, template, &mut *t, &env);
            (outcome, t.is_dead())
        };
        self.follow_up(caster.credited_actor(), target, template, outcome, died);
    }

    fn follow_up(
        self: &Arc<Self>,
        credited: ActorId,
        target: ActorId,
        template: &SkillTemplate,
        outcome: EffectOutcome,
        died: bool,
    ) {
        if let Some(applied) = outcome.applied
            && applied.duration_ms > 0
        {
            let engine = Arc::clone(self);
            self.scheduler.schedule_once(
                "effect_expiry",
                Duration::from_millis(applied.duration_ms),
                move || {
                    engine
                        .world
                        .with_actor(target, |t: &mut Actor| t.remove_effect(applied.id));
                },
            );
        }

        if died {
            self.interrupt_cast(target, InterruptReason::Death);
        } else if outcome.interrupt_target {
            let reason = if outcome.damage > 0 {
                InterruptReason::Damage
            } else {
                InterruptReason::Disabled
            };
            self.interrupt_cast(target, reason);
        }

        if outcome.absorbed > 0 {
            self.world
                .with_actor(credited, |c| c.restore_hp(outcome.absorbed));
        }
        debug!(
            %credited,
            %target,
            skill = %template.skill_ref(),
            damage = outcome.damage,
            landed = outcome.landed,
            "effects applied"
        );
    }

    /// Starts the request that waited behind a finished cast.
    fn promote(self: &Arc<Self>, actor: ActorId, holder: SkillUseHolder) {
        match self.request_cast(actor, holder.skill.id, holder.options()) {
            Ok(outcome) => debug!(%actor, skill = %outcome.skill(), "queued cast promoted"),
            Err(err) => {
                debug!(%actor, skill = %holder.skill, error = %err, "queued cast failed");
                self.notify(
                    actor,
                    Notification::CastFailed {
                        caster: actor,
                        skill: holder.skill,
                        code: err.error_code(),
                    },
                );
            }
        }
    }

    /// Switches an active toggle off along with the effects it keeps alive.
    fn cancel_toggle(&self, actor: ActorId, template: &SkillTemplate) {
        let cancelled = self
            .world
            .with_actor(actor, |a| {
                let removed = a.toggles.remove(&template.id);
                if removed {
                    a.remove_skill_effects(template.id);
                }
                removed
            })
            .unwrap_or(false);
        if cancelled {
            self.notify(
                actor,
                Notification::ToggleCancelled {
                    caster: actor,
                    skill: template.skill_ref(),
                },
            );
            debug!(%actor, skill = %template.skill_ref(), "toggle cancelled");
        }
    }
}
