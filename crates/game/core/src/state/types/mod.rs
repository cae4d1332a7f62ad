pub mod common;
pub mod social;
pub mod status;
pub mod vitals;

// Re-export identity and geometry
pub use common::{ActorId, ActorKind, Position};

// Re-export social standing
pub use social::{AllyId, ClanId, DuelState, OlympiadState, PartyId, SocialContext};

// Re-export flags and effects
pub use status::{ActiveEffect, EffectId, EffectKind, StatusFlags, ZoneFlags};

// Re-export resource pools and combat numbers
pub use vitals::{ChargedShot, CombatProfile, Vitals};
