//! Skill templates and the identifiers they are addressed by.
//!
//! A skill is addressed by `(id, level)`. Cooldowns are tracked per
//! [`SkillFamilyId`], which is shared by every level of "the same" skill so
//! that learning the next level inherits the running cooldown.

use std::fmt;

use crate::state::EffectKind;

mod holder;

pub use holder::{CastOptions, SkillUseHolder};

/// Skill identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillId(pub i32);

/// Skill level; levels of one skill share a family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillLevel(pub i32);

/// Cooldown-sharing identity across level variants of a skill.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillFamilyId(pub i32);

impl fmt::Display for SkillFamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "family:{}", self.0)
    }
}

/// A concrete `(id, level)` pair.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillRef {
    pub id: SkillId,
    pub level: SkillLevel,
}

impl SkillRef {
    pub const fn new(id: i32, level: i32) -> Self {
        Self {
            id: SkillId(id),
            level: SkillLevel(level),
        }
    }
}

impl fmt::Display for SkillRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.id.0, self.level.0)
    }
}

/// Crowd-control flavours routed through the disable branch of the dispatcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum DisableKind {
    Stun,
    Paralyze,
    Root,
    /// Pulls a monster's hate onto the caster.
    AggroGrab,
    /// Removes opposing effects from the target.
    Cleanse,
}

/// Coarse classification that drives dispatch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum SkillCategory {
    Disable(DisableKind),
    MagicDamage,
    /// Poison, debuff and damage-over-time.
    Continuous,
    Drain,
    Heal,
    Buff,
    /// Stays on until cast again.
    Toggle,
    /// Harvests a corpse the caster has marked.
    Sweep,
}

/// How a skill finds its targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TargetCategory {
    /// The caster only.
    SelfOnly,
    /// Everything eligible around the caster.
    Aura,
    /// Everything eligible around a chosen point.
    Ground,
    /// The caster's summon.
    Summon,
    /// A single explicitly chosen actor.
    Explicit,
    /// The caster's party members around the caster (the caster alone when solo).
    OwnerParty,
}

/// Effect placed on a target when a skill lands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectSpec {
    pub kind: EffectKind,
    pub duration_ms: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub persistent: bool,
}

/// Static definition of one skill level.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SkillTemplate {
    pub id: SkillId,
    pub level: SkillLevel,
    pub family: SkillFamilyId,
    pub name: String,
    pub category: SkillCategory,
    pub target: TargetCategory,
    /// Offensive skills go through the hostility policy.
    pub offensive: bool,
    /// Magic skills are blocked by silence.
    #[cfg_attr(feature = "serde", serde(default))]
    pub magic: bool,
    pub cast_range: u32,
    /// Radius for aura and ground skills.
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect_radius: u32,
    pub cast_time_ms: u64,
    pub reuse_ms: u64,
    #[cfg_attr(feature = "serde", serde(default))]
    pub mp_cost: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub hp_cost: u32,
    #[cfg_attr(feature = "serde", serde(default))]
    pub power: u32,
    /// Base success chance in percent for skills that roll.
    #[cfg_attr(feature = "serde", serde(default = "default_land_rate"))]
    pub land_rate: u32,
    /// Apply the cooldown even when the cast is interrupted.
    #[cfg_attr(feature = "serde", serde(default))]
    pub consumed_on_interrupt: bool,
    /// Cleanse: how many opposing effects one cast removes.
    #[cfg_attr(feature = "serde", serde(default))]
    pub max_negated: u32,
    /// Drain: percent of dealt damage returned to the caster.
    #[cfg_attr(feature = "serde", serde(default))]
    pub absorb_percent: u32,
    /// Only monsters are acceptable targets.
    #[cfg_attr(feature = "serde", serde(default))]
    pub requires_monster_target: bool,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effect: Option<EffectSpec>,
    /// Secondary effect a damaging skill may leave behind.
    #[cfg_attr(feature = "serde", serde(default))]
    pub on_hit: Option<EffectSpec>,
}

#[cfg(feature = "serde")]
fn default_land_rate() -> u32 {
    SkillTemplate::DEFAULT_LAND_RATE
}

impl SkillTemplate {
    pub const DEFAULT_LAND_RATE: u32 = 80;

    /// Minimal template; tests and content builders refine it field by field.
    pub fn new(skill: SkillRef, name: impl Into<String>, category: SkillCategory) -> Self {
        Self {
            id: skill.id,
            level: skill.level,
            family: SkillFamilyId(skill.id.0),
            name: name.into(),
            category,
            target: TargetCategory::Explicit,
            offensive: false,
            magic: true,
            cast_range: 600,
            effect_radius: 0,
            cast_time_ms: 0,
            reuse_ms: 0,
            mp_cost: 0,
            hp_cost: 0,
            power: 0,
            land_rate: Self::DEFAULT_LAND_RATE,
            consumed_on_interrupt: false,
            max_negated: 0,
            absorb_percent: 0,
            requires_monster_target: false,
            effect: None,
            on_hit: None,
        }
    }

    pub fn skill_ref(&self) -> SkillRef {
        SkillRef {
            id: self.id,
            level: self.level,
        }
    }

    pub fn is_toggle(&self) -> bool {
        matches!(self.category, SkillCategory::Toggle)
    }

    pub fn with_target(mut self, target: TargetCategory) -> Self {
        self.target = target;
        self
    }

    pub fn offensive(mut self) -> Self {
        self.offensive = true;
        self
    }

    pub fn with_family(mut self, family: SkillFamilyId) -> Self {
        self.family = family;
        self
    }

    pub fn with_timing(mut self, cast_time_ms: u64, reuse_ms: u64) -> Self {
        self.cast_time_ms = cast_time_ms;
        self.reuse_ms = reuse_ms;
        self
    }

    pub fn with_range(mut self, cast_range: u32) -> Self {
        self.cast_range = cast_range;
        self
    }

    pub fn with_power(mut self, power: u32) -> Self {
        self.power = power;
        self
    }

    pub fn with_mp_cost(mut self, mp_cost: u32) -> Self {
        self.mp_cost = mp_cost;
        self
    }

    pub fn with_effect(mut self, effect: EffectSpec) -> Self {
        self.effect = Some(effect);
        self
    }

    pub fn consumed_on_interrupt(mut self) -> Self {
        self.consumed_on_interrupt = true;
        self
    }
}
