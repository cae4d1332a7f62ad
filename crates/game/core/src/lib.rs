//! Rules for real-time skill casting, cooldowns and companion agents.
//!
//! `cast-core` is pure and synchronous: it owns the data model, the skill and
//! companion templates, the hostility and target acquisition policy, cast
//! validation and the effect dispatcher. Everything that needs a clock, a lock
//! or a timer lives in `cast-runtime`, which feeds snapshots into the
//! functions defined here.
pub mod capability;
pub mod cast;
pub mod companion;
pub mod config;
pub mod cooldown;
pub mod effect;
pub mod error;
pub mod hostility;
pub mod skill;
pub mod state;
pub mod targeting;

pub use capability::{
    CastEnv, CombatFormulas, CompanionOracle, DrainResolver, DrainResult, Notification,
    Notifier, NullNotifier, Pathfinding, RandomSource, Resource, ResourceGate, ShieldBlock,
    SkillOracle, VitalsGate,
};
pub use cast::{
    BlockReason, CastError, CastOutcome, CasterSkillState, InterruptReason, ResolvedCast,
    TargetFault, validate_cast,
};
pub use companion::{
    CompanionId, CompanionKindId, CompanionState, CompanionTemplate, SkipReason,
    TerminationCause, TickPlan, mode_for, plan_tick,
};
pub use config::CastConfig;
pub use cooldown::{CooldownEntry, CooldownMap, CooldownRecord, plan_restore};
pub use effect::{AppliedEffect, EffectOutcome, dispatch};
pub use error::{ErrorSeverity, GameError};
pub use hostility::{Hostility, Immunity};
pub use skill::{
    CastOptions, DisableKind, EffectSpec, SkillCategory, SkillFamilyId, SkillId, SkillLevel,
    SkillRef, SkillTemplate, SkillUseHolder, TargetCategory,
};
pub use state::{
    ActiveEffect, ActorId, ActorKind, ActorView, AllyId, CasterProfile, ChargedShot, ClanId,
    CombatProfile, Damageable, DuelState, EffectId, EffectKind, OlympiadState, PartyId, Position,
    SkillCaster, SocialContext, StatusFlags, Targetable, Vitals, ZoneFlags,
};
pub use targeting::{TargetMode, TargetingContext, select_target};
