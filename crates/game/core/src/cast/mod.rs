//! Cast requests: outcomes, failure reasons and the pure validation pipeline.
//!
//! The runtime owns the state machine (`IDLE → VALIDATING → CASTING →
//! {COMPLETE, INTERRUPTED} → IDLE` with a parallel queued slot). This module
//! supplies the side-effect free half: [`validate_cast`] either resolves the
//! targets of a request or explains why it cannot run.
mod error;
mod validation;

pub use error::{BlockReason, CastError, TargetFault};
pub use validation::{CasterSkillState, validate_cast};

use crate::skill::SkillRef;
use crate::state::{ActorId, Position};

/// Result of an accepted cast request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastOutcome {
    /// Casting; completion fires after `cast_time_ms`.
    Started { skill: SkillRef, cast_time_ms: u64 },
    /// Another skill is in flight; the request replaced the queued slot.
    Queued { skill: SkillRef },
    /// Instant skill, resolved inline.
    Completed { skill: SkillRef },
}

impl CastOutcome {
    pub fn skill(&self) -> SkillRef {
        match *self {
            Self::Started { skill, .. } | Self::Queued { skill } | Self::Completed { skill } => {
                skill
            }
        }
    }
}

/// Why an in-flight cast was broken off.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum InterruptReason {
    Damage,
    /// Forced movement (knock-back, teleport) or the caster walking away.
    Movement,
    /// Stun, paralysis or another disable landed.
    Disabled,
    Death,
    Logout,
    /// The player cancelled the cast.
    Command,
}

/// Targets resolved for a validated request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedCast {
    pub skill: SkillRef,
    /// Main target, when the skill has one.
    pub primary: Option<ActorId>,
    /// Every actor the effect dispatcher will visit, primary first.
    pub targets: Vec<ActorId>,
    pub ground: Option<Position>,
}
