//! Actor-facing data model.
//!
//! The runtime owns mutable actors; this module defines the plain data they
//! are built from, the read-only [`ActorView`] snapshot the rule functions
//! consume, and the capability traits ([`Targetable`], [`SkillCaster`],
//! [`Damageable`]) the effect dispatcher and targeting policy depend on.
pub mod types;
mod view;

pub use types::{
    ActiveEffect, ActorId, ActorKind, AllyId, ChargedShot, ClanId, CombatProfile, DuelState,
    EffectId, EffectKind, OlympiadState, PartyId, Position, SocialContext, StatusFlags, Vitals,
    ZoneFlags,
};
pub use view::{ActorView, CasterProfile, Damageable, SkillCaster, Targetable};
