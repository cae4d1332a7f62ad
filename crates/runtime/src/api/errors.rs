//! Unified error types surfaced by the runtime API.
//!
//! Wraps failures from cast validation, repositories and worker coordination
//! so clients can bubble them up with consistent context.

use thiserror::Error;

use cast_core::{
    ActorId, CastError, CompanionId, CompanionKindId, ErrorSeverity, GameError, SkillRef,
};

pub use crate::repository::RepositoryError;

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("actor {0} is not in the world")]
    UnknownActor(ActorId),

    #[error("skill {0} has no template")]
    UnknownSkill(SkillRef),

    #[error("companion kind {0:?} is not defined")]
    UnknownCompanionKind(CompanionKindId),

    #[error("{0} does not exist")]
    UnknownCompanion(CompanionId),

    #[error("owner {0} is dead or offline")]
    OwnerUnavailable(ActorId),

    #[error("owner {owner} already has {limit} companions")]
    CompanionLimit { owner: ActorId, limit: usize },

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error("cooldowns of {} players could not be saved", .failed.len())]
    FlushIncomplete { failed: Vec<ActorId> },

    #[error("runtime requires oracles to be configured before building")]
    MissingOracles,

    #[error("background worker join failed")]
    WorkerJoin(#[source] tokio::task::JoinError),
}

impl GameError for RuntimeError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Cast(err) => err.severity(),
            Self::Repository(err) => err.severity(),
            Self::UnknownActor(_) | Self::UnknownCompanion(_) => ErrorSeverity::Validation,
            Self::OwnerUnavailable(_) | Self::CompanionLimit { .. } | Self::FlushIncomplete { .. } => {
                ErrorSeverity::Recoverable
            }
            Self::UnknownSkill(_) | Self::UnknownCompanionKind(_) => ErrorSeverity::Internal,
            Self::MissingOracles | Self::WorkerJoin(_) => ErrorSeverity::Fatal,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::Cast(err) => err.error_code(),
            Self::Repository(err) => err.error_code(),
            Self::UnknownActor(_) => "RUNTIME_UNKNOWN_ACTOR",
            Self::UnknownSkill(_) => "RUNTIME_UNKNOWN_SKILL",
            Self::UnknownCompanionKind(_) => "RUNTIME_UNKNOWN_COMPANION_KIND",
            Self::UnknownCompanion(_) => "RUNTIME_UNKNOWN_COMPANION",
            Self::OwnerUnavailable(_) => "RUNTIME_OWNER_UNAVAILABLE",
            Self::CompanionLimit { .. } => "RUNTIME_COMPANION_LIMIT",
            Self::FlushIncomplete { .. } => "RUNTIME_FLUSH_INCOMPLETE",
            Self::MissingOracles => "RUNTIME_MISSING_ORACLES",
            Self::WorkerJoin(_) => "RUNTIME_WORKER_JOIN",
        }
    }
}

#[cfg(test)]
mod tests {
    use cast_core::BlockReason;

    use super::*;

    #[test]
    fn cast_errors_keep_their_code() {
        let err = RuntimeError::from(CastError::ActorStateBlocked(BlockReason::Dead));
        assert_eq!(err.error_code(), "CAST_ACTOR_STATE_BLOCKED");
        assert_eq!(err.severity(), ErrorSeverity::Validation);
    }

    #[test]
    fn limit_message_names_owner() {
        let err = RuntimeError::CompanionLimit {
            owner: ActorId(4),
            limit: 3,
        };
        assert_eq!(err.to_string(), "owner #4 already has 3 companions");
        assert!(err.severity().is_recoverable());
    }
}
