//! Companion agents: owner-bound AIs that cast on a timer.
//!
//! This module holds the kind definitions and the pure per-tick decision
//! ([`plan_tick`]). Timers, locking and the owner's companion collection live
//! in `cast-runtime`.

use std::fmt;

use crate::capability::RandomSource;
use crate::skill::{SkillRef, SkillTemplate};
use crate::state::{ActorView, StatusFlags};
use crate::targeting::TargetMode;

/// Runtime identifier of a spawned companion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompanionId(pub u64);

impl fmt::Display for CompanionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "companion#{}", self.0)
    }
}

/// Identifier of a companion kind in the content tables.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompanionKindId(pub u32);

/// Static definition of a companion kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompanionTemplate {
    pub kind: CompanionKindId,
    pub name: String,
    /// Delay between action ticks.
    pub period_ms: u64,
    /// Chance in percent that a tick acts at all.
    pub chance_percent: u32,
    /// Total lifetime from spawn.
    pub lifetime_ms: u64,
    pub skills: Vec<SkillRef>,
    /// Only acts while the owner is in attack stance.
    #[cfg_attr(feature = "serde", serde(default))]
    pub requires_stance: bool,
    /// Starts ticking at spawn instead of waiting for an explicit trigger.
    #[cfg_attr(feature = "serde", serde(default))]
    pub auto_activate: bool,
}

/// Lifecycle of one companion.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CompanionState {
    /// Lifetime timer armed, periodic timer not yet.
    Spawned,
    /// Periodic timer armed.
    Active,
    /// Owner left the required stance; periodic timer cancelled, lifetime keeps running.
    Dormant,
    Terminated,
}

impl CompanionState {
    /// `activate()` arms the periodic timer only from these states.
    pub fn can_activate(self) -> bool {
        matches!(self, Self::Spawned | Self::Dormant)
    }

    pub fn is_terminated(self) -> bool {
        matches!(self, Self::Terminated)
    }
}

/// Why a companion stopped for good.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum TerminationCause {
    OwnerDeath,
    OwnerLogout,
    Dismissed,
    LifetimeExpired,
    /// A new companion of the same kind took its place.
    Replaced,
}

/// Why a tick did nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum SkipReason {
    ChanceFailed,
    NoSkills,
    UnknownSkill,
    NoTarget,
    OutOfRange,
}

/// Decision for one periodic tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickPlan {
    Terminate(TerminationCause),
    GoDormant,
    Skip(SkipReason),
    /// Cast `skill`; the target is resolved next, in `mode`.
    Cast { skill: SkillRef, mode: TargetMode },
}

/// Target mode a companion uses for one of its skills.
pub fn mode_for(skill: &SkillTemplate) -> TargetMode {
    if skill.offensive {
        TargetMode::Offensive { force: false }
    } else {
        TargetMode::Supportive
    }
}

/// Decides what a tick does before any target is looked at.
///
/// Order: lifetime, owner presence, stance, activation roll, skill choice.
/// `owner` is `None` when the owner no longer exists in the world.
pub fn plan_tick(
    template: &CompanionTemplate,
    owner: Option<&ActorView>,
    now_ms: i64,
    deadline_ms: i64,
    rng: &dyn RandomSource,
    lookup: impl Fn(SkillRef) -> Option<TargetMode>,
) -> TickPlan {
    if now_ms >= deadline_ms {
        return TickPlan::Terminate(TerminationCause::LifetimeExpired);
    }
    let Some(owner) = owner else {
        return TickPlan::Terminate(TerminationCause::OwnerLogout);
    };
    if owner.status.contains(StatusFlags::DEAD) {
        return TickPlan::Terminate(TerminationCause::OwnerDeath);
    }
    if !owner.is_online() {
        return TickPlan::Terminate(TerminationCause::OwnerLogout);
    }
    if template.requires_stance && !owner.status.contains(StatusFlags::ATTACK_STANCE) {
        return TickPlan::GoDormant;
    }
    if rng.roll_percent() > template.chance_percent {
        return TickPlan::Skip(SkipReason::ChanceFailed);
    }
    if template.skills.is_empty() {
        return TickPlan::Skip(SkipReason::NoSkills);
    }
    let skill = template.skills[rng.pick(template.skills.len()) % template.skills.len()];
    match lookup(skill) {
        Some(mode) => TickPlan::Cast { skill, mode },
        None => TickPlan::Skip(SkipReason::UnknownSkill),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::state::{
        ActorId, ActorKind, CombatProfile, Position, SocialContext, StatusFlags, Vitals,
        ZoneFlags,
    };

    struct Fixed {
        roll: u32,
        picks: AtomicU32,
    }

    impl RandomSource for Fixed {
        fn roll_percent(&self) -> u32 {
            self.roll
        }

        fn pick(&self, _len: usize) -> usize {
            self.picks.fetch_add(1, Ordering::Relaxed) as usize
        }
    }

    fn rng(roll: u32) -> Fixed {
        Fixed {
            roll,
            picks: AtomicU32::new(0),
        }
    }

    fn template(requires_stance: bool) -> CompanionTemplate {
        CompanionTemplate {
            kind: CompanionKindId(1),
            name: "spark".into(),
            period_ms: 2_000,
            chance_percent: 50,
            lifetime_ms: 60_000,
            skills: vec![SkillRef::new(1, 1), SkillRef::new(2, 1)],
            requires_stance,
            auto_activate: !requires_stance,
        }
    }

    fn owner(status: StatusFlags) -> ActorView {
        ActorView {
            id: ActorId(1),
            kind: ActorKind::Player,
            position: Position::ORIGIN,
            vitals: Vitals::default(),
            status,
            zones: ZoneFlags::empty(),
            social: SocialContext::default(),
            combat: CombatProfile::default(),
            summon: None,
            target: None,
            loot_mark: None,
        }
    }

    fn supportive(_: SkillRef) -> Option<TargetMode> {
        Some(TargetMode::Supportive)
    }

    #[test]
    fn lifetime_wins_over_everything() {
        let online = owner(StatusFlags::ONLINE);
        let plan = plan_tick(&template(false), Some(&online), 10, 10, &rng(1), supportive);
        assert_eq!(plan, TickPlan::Terminate(TerminationCause::LifetimeExpired));
    }

    #[test]
    fn owner_death_and_logout_terminate() {
        let dead = owner(StatusFlags::ONLINE | StatusFlags::DEAD);
        let offline = owner(StatusFlags::empty());
        let t = template(false);
        assert_eq!(
            plan_tick(&t, Some(&dead), 0, 10, &rng(1), supportive),
            TickPlan::Terminate(TerminationCause::OwnerDeath)
        );
        assert_eq!(
            plan_tick(&t, Some(&offline), 0, 10, &rng(1), supportive),
            TickPlan::Terminate(TerminationCause::OwnerLogout)
        );
        assert_eq!(
            plan_tick(&t, None, 0, 10, &rng(1), supportive),
            TickPlan::Terminate(TerminationCause::OwnerLogout)
        );
    }

    #[test]
    fn combat_kind_goes_dormant_without_stance() {
        let calm = owner(StatusFlags::ONLINE);
        let engaged = owner(StatusFlags::ONLINE | StatusFlags::ATTACK_STANCE);
        let t = template(true);
        assert_eq!(
            plan_tick(&t, Some(&calm), 0, 10, &rng(1), supportive),
            TickPlan::GoDormant
        );
        assert!(matches!(
            plan_tick(&t, Some(&engaged), 0, 10, &rng(1), supportive),
            TickPlan::Cast { .. }
        ));
    }

    #[test]
    fn chance_roll_is_inclusive() {
        let online = owner(StatusFlags::ONLINE);
        let t = template(false);
        assert!(matches!(
            plan_tick(&t, Some(&online), 0, 10, &rng(50), supportive),
            TickPlan::Cast { .. }
        ));
        assert_eq!(
            plan_tick(&t, Some(&online), 0, 10, &rng(51), supportive),
            TickPlan::Skip(SkipReason::ChanceFailed)
        );
    }

    #[test]
    fn picks_skill_from_list() {
        let online = owner(StatusFlags::ONLINE);
        let t = template(false);
        let rng = rng(1);
        let first = plan_tick(&t, Some(&online), 0, 10, &rng, supportive);
        let second = plan_tick(&t, Some(&online), 0, 10, &rng, |_| None);
        assert_eq!(
            first,
            TickPlan::Cast {
                skill: SkillRef::new(1, 1),
                mode: TargetMode::Supportive
            }
        );
        assert_eq!(second, TickPlan::Skip(SkipReason::UnknownSkill));
    }

    #[test]
    fn dormant_state_can_reactivate() {
        assert!(CompanionState::Spawned.can_activate());
        assert!(CompanionState::Dormant.can_activate());
        assert!(!CompanionState::Active.can_activate());
        assert!(!CompanionState::Terminated.can_activate());
    }
}
