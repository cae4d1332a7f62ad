//! Effect dispatcher.
//!
//! Routes one `(caster, skill, target)` triple to the matching combat formula
//! and applies the result to the target. The dispatcher only sees the
//! [`SkillCaster`] and [`Damageable`] capabilities, so the player path and the
//! companion path call it identically.
//!
//! Side effects that touch other actors (drain healing the caster, damage
//! breaking the target's cast) are reported in [`EffectOutcome`] and applied by
//! the caller once it has released the target.

use crate::capability::{CastEnv, Notification, ShieldBlock};
use crate::skill::{DisableKind, EffectSpec, SkillCategory, SkillTemplate};
use crate::state::{ActiveEffect, ActorKind, Damageable, EffectId, EffectKind, SkillCaster};

/// Hate added by aggro-grab skills is scaled by this constant.
const AGGRO_GRAB_FACTOR: u64 = 150;

/// What one dispatch did to its target.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EffectOutcome {
    /// HP actually removed from the target.
    pub damage: u32,
    pub critical: bool,
    pub reflected: bool,
    /// The skill's success roll passed (always true for skills that do not roll).
    pub landed: bool,
    /// The target was casting and must be interrupted by the caller.
    pub interrupt_target: bool,
    /// HP the caller must return to the caster.
    pub absorbed: u32,
    pub healed: u32,
    pub applied: Option<AppliedEffect>,
    pub negated: u32,
}

/// An effect the dispatcher placed on the target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AppliedEffect {
    pub id: EffectId,
    /// Zero means the effect stays until removed.
    pub duration_ms: u64,
}

/// Applies `skill` from `caster` to `target`.
pub fn dispatch<C, T>(
    caster: &C,
    skill: &SkillTemplate,
    target: &mut T,
    env: &CastEnv<'_>,
) -> EffectOutcome
where
    C: SkillCaster + ?Sized,
    T: Damageable + ?Sized,
{
    match skill.category {
        SkillCategory::Disable(kind) => disable(caster, skill, kind, target, env),
        SkillCategory::MagicDamage => magic_damage(caster, skill, target, env),
        SkillCategory::Continuous => continuous(caster, skill, target, env),
        SkillCategory::Drain => drain(caster, skill, target, env),
        SkillCategory::Heal => {
            let healed = target.restore_hp(skill.power);
            env.notifier.notify(
                target.actor_id(),
                Notification::Healed {
                    target: target.actor_id(),
                    skill: skill.skill_ref(),
                    amount: healed,
                },
            );
            EffectOutcome {
                landed: true,
                healed,
                ..EffectOutcome::default()
            }
        }
        SkillCategory::Buff | SkillCategory::Toggle => {
            let applied = skill
                .effect
                .map(|spec| apply(caster, skill, spec, false, target, env));
            EffectOutcome {
                landed: true,
                applied,
                ..EffectOutcome::default()
            }
        }
        SkillCategory::Sweep => EffectOutcome {
            landed: target.clear_loot_mark(caster.credited_actor()),
            ..EffectOutcome::default()
        },
    }
}

fn disable<C, T>(
    caster: &C,
    skill: &SkillTemplate,
    kind: DisableKind,
    target: &mut T,
    env: &CastEnv<'_>,
) -> EffectOutcome
where
    C: SkillCaster + ?Sized,
    T: Damageable + ?Sized,
{
    let attacker = caster.combat_profile();
    let defender = target.combat_profile();
    let shield = env.formulas.resolve_shield_block(&defender, skill);
    let landed = shield != ShieldBlock::Perfect
        && env
            .formulas
            .roll_skill_success(&attacker, &defender, skill, shield);
    if !landed {
        notify_missed(caster, skill, target, env);
        return EffectOutcome::default();
    }

    let mut outcome = EffectOutcome {
        landed,
        ..EffectOutcome::default()
    };
    match kind {
        DisableKind::Stun | DisableKind::Paralyze | DisableKind::Root => {
            let spec = skill.effect.unwrap_or(EffectSpec {
                kind: match kind {
                    DisableKind::Stun => EffectKind::Stun,
                    DisableKind::Paralyze => EffectKind::Paralyze,
                    _ => EffectKind::Root,
                },
                duration_ms: 0,
                persistent: false,
            });
            outcome.applied = Some(apply(caster, skill, spec, true, target, env));
            outcome.interrupt_target = !matches!(kind, DisableKind::Root)
                && target.is_casting()
                && !target.is_uninterruptible();
        }
        DisableKind::AggroGrab => {
            if matches!(target.kind(), ActorKind::Monster) {
                let hate = AGGRO_GRAB_FACTOR * u64::from(skill.power)
                    / (u64::from(defender.level) + 7);
                target.add_hate(
                    caster.credited_actor(),
                    u32::try_from(hate).unwrap_or(u32::MAX),
                );
            }
        }
        DisableKind::Cleanse => {
            outcome.negated = target.negate_effects(skill.max_negated);
        }
    }
    outcome
}

fn magic_damage<C, T>(
    caster: &C,
    skill: &SkillTemplate,
    target: &mut T,
    env: &CastEnv<'_>,
) -> EffectOutcome
where
    C: SkillCaster + ?Sized,
    T: Damageable + ?Sized,
{
    if target.is_fake_dead() {
        target.stop_fake_death();
    }
    let attacker = caster.combat_profile();
    let defender = target.combat_profile();

    let critical = env.formulas.roll_critical(&attacker, skill);
    let shield = env.formulas.resolve_shield_block(&defender, skill);
    let reflected = env.formulas.resolve_skill_reflect(&defender, skill);
    let raw = if reflected {
        0
    } else {
        env.formulas
            .compute_magic_damage(&attacker, &defender, skill, shield, critical)
    };

    let mut outcome = EffectOutcome {
        critical,
        reflected,
        landed: true,
        ..EffectOutcome::default()
    };
    if raw == 0 {
        return outcome;
    }

    outcome.damage = target.reduce_hp(raw, caster.credited_actor());
    outcome.interrupt_target = env.config.interrupt_on_damage
        && target.is_casting()
        && !target.is_uninterruptible();
    env.notifier.notify(
        caster.credited_actor(),
        Notification::DamageDealt {
            attacker: caster.credited_actor(),
            target: target.actor_id(),
            skill: skill.skill_ref(),
            amount: outcome.damage,
            critical,
        },
    );

    if let Some(spec) = skill.on_hit {
        if !target.is_dead()
            && env
                .formulas
                .roll_skill_success(&attacker, &defender, skill, shield)
        {
            outcome.applied = Some(apply(caster, skill, spec, true, target, env));
        }
    }
    outcome
}

fn continuous<C, T>(
    caster: &C,
    skill: &SkillTemplate,
    target: &mut T,
    env: &CastEnv<'_>,
) -> EffectOutcome
where
    C: SkillCaster + ?Sized,
    T: Damageable + ?Sized,
{
    let Some(spec) = skill.effect else {
        return EffectOutcome::default();
    };
    if skill.offensive {
        let attacker = caster.combat_profile();
        let defender = target.combat_profile();
        let shield = env.formulas.resolve_shield_block(&defender, skill);
        if !env
            .formulas
            .roll_skill_success(&attacker, &defender, skill, shield)
        {
            notify_missed(caster, skill, target, env);
            return EffectOutcome::default();
        }
    }
    EffectOutcome {
        landed: true,
        applied: Some(apply(caster, skill, spec, skill.offensive, target, env)),
        ..EffectOutcome::default()
    }
}

fn drain<C, T>(caster: &C, skill: &SkillTemplate, target: &mut T, env: &CastEnv<'_>) -> EffectOutcome
where
    C: SkillCaster + ?Sized,
    T: Damageable + ?Sized,
{
    let result = env.drain.resolve_drain(
        &caster.combat_profile(),
        &target.combat_profile(),
        target.vitals(),
        skill,
        env.formulas,
    );
    let damage = target.reduce_hp(result.damage, caster.credited_actor());
    if damage > 0 {
        env.notifier.notify(
            caster.credited_actor(),
            Notification::DamageDealt {
                attacker: caster.credited_actor(),
                target: target.actor_id(),
                skill: skill.skill_ref(),
                amount: damage,
                critical: false,
            },
        );
    }
    EffectOutcome {
        damage,
        landed: true,
        absorbed: result.absorbed.min(damage),
        interrupt_target: damage > 0
            && env.config.interrupt_on_damage
            && target.is_casting()
            && !target.is_uninterruptible(),
        ..EffectOutcome::default()
    }
}

fn apply<C, T>(
    caster: &C,
    skill: &SkillTemplate,
    spec: EffectSpec,
    hostile: bool,
    target: &mut T,
    env: &CastEnv<'_>,
) -> AppliedEffect
where
    C: SkillCaster + ?Sized,
    T: Damageable + ?Sized,
{
    let id = target.apply_effect(ActiveEffect {
        id: EffectId(0),
        skill: skill.skill_ref(),
        kind: spec.kind,
        source: caster.credited_actor(),
        hostile,
        persistent: spec.persistent,
        duration_ms: spec.duration_ms,
    });
    env.notifier.notify(
        target.actor_id(),
        Notification::EffectApplied {
            target: target.actor_id(),
            skill: skill.skill_ref(),
            kind: spec.kind,
        },
    );
    AppliedEffect {
        id,
        duration_ms: spec.duration_ms,
    }
}

fn notify_missed<C, T>(caster: &C, skill: &SkillTemplate, target: &T, env: &CastEnv<'_>)
where
    C: SkillCaster + ?Sized,
    T: Damageable + ?Sized,
{
    env.notifier.notify(
        caster.credited_actor(),
        Notification::Missed {
            caster: caster.credited_actor(),
            target: target.actor_id(),
            skill: skill.skill_ref(),
        },
    );
}
