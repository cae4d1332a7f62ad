use crate::capability::Resource;
use crate::error::{ErrorSeverity, GameError};
use crate::hostility::Immunity;
use crate::skill::SkillFamilyId;

/// Caster condition that prevents any cast.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum BlockReason {
    Dead,
    /// Paralyzed, stunned, feared or otherwise not controlled by its player.
    OutOfControl,
    Fishing,
    Observer,
    Sitting,
    /// Silenced casters cannot use magic skills.
    Silenced,
    FakeDeath,
    /// The requested skill is the one already being cast.
    SameSkillInFlight,
    SkillNotLearned,
    UnknownActor,
}

/// Why a target (or ground point) is not acceptable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum TargetFault {
    Missing,
    Dead,
    NotVisible,
    OutOfRange,
    LineOfSight,
    /// Wrong kind of actor for this skill (e.g. a drain that needs a monster).
    WrongCategory,
    /// Peace zone blocks offensive skills.
    ZoneBlocked,
    SiegeRule,
    NotHostile,
    /// Sweep target carries no loot mark for this caster.
    NotMarked,
}

impl TargetFault {
    /// Maps a hostility verdict onto the fault reported to the caster.
    pub fn from_immunity(immunity: Immunity) -> Self {
        match immunity {
            Immunity::PeaceZone => TargetFault::ZoneBlocked,
            Immunity::SiegeAlly => TargetFault::SiegeRule,
            _ => TargetFault::NotHostile,
        }
    }
}

/// Typed rejection of a cast request.
///
/// Every variant is produced before any actor state changes, so a rejected
/// request leaves the caster exactly as it was.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CastError {
    #[error("caster cannot act: {0}")]
    ActorStateBlocked(BlockReason),

    #[error("{family} is on cooldown for another {remaining_ms}ms")]
    SkillOnCooldown {
        family: SkillFamilyId,
        remaining_ms: u64,
    },

    #[error("invalid target: {0}")]
    InvalidTarget(TargetFault),

    #[error("not enough {0}")]
    InsufficientResource(Resource),

    /// The request switched an active toggle off instead of recasting it.
    #[error("toggle was active; request cancelled it")]
    TogglePreventsRecast,
}

impl GameError for CastError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::SkillOnCooldown { .. }
            | Self::InsufficientResource(_)
            | Self::TogglePreventsRecast => ErrorSeverity::Recoverable,
            Self::ActorStateBlocked(BlockReason::UnknownActor) => ErrorSeverity::Internal,
            Self::ActorStateBlocked(_) | Self::InvalidTarget(_) => ErrorSeverity::Validation,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::ActorStateBlocked(_) => "CAST_ACTOR_STATE_BLOCKED",
            Self::SkillOnCooldown { .. } => "CAST_SKILL_ON_COOLDOWN",
            Self::InvalidTarget(_) => "CAST_INVALID_TARGET",
            Self::InsufficientResource(_) => "CAST_INSUFFICIENT_RESOURCE",
            Self::TogglePreventsRecast => "CAST_TOGGLE_PREVENTS_RECAST",
        }
    }
}
