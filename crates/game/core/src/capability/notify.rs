use crate::cast::InterruptReason;
use crate::companion::CompanionId;
use crate::skill::{SkillFamilyId, SkillRef};
use crate::state::{ActorId, EffectKind};

/// Typed events pushed to clients. Transport and encoding live elsewhere.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Notification {
    CastStarted {
        caster: ActorId,
        skill: SkillRef,
        target: Option<ActorId>,
        cast_time_ms: u64,
    },
    CastCompleted {
        caster: ActorId,
        skill: SkillRef,
    },
    CastInterrupted {
        caster: ActorId,
        skill: SkillRef,
        reason: InterruptReason,
    },
    /// A cast (usually a promoted queued one) was rejected.
    CastFailed {
        caster: ActorId,
        skill: SkillRef,
        code: &'static str,
    },
    CastQueued {
        caster: ActorId,
        skill: SkillRef,
    },
    ToggleCancelled {
        caster: ActorId,
        skill: SkillRef,
    },
    SkillAvailable {
        actor: ActorId,
        family: SkillFamilyId,
    },
    DamageDealt {
        attacker: ActorId,
        target: ActorId,
        skill: SkillRef,
        amount: u32,
        critical: bool,
    },
    Healed {
        target: ActorId,
        skill: SkillRef,
        amount: u32,
    },
    Missed {
        caster: ActorId,
        target: ActorId,
        skill: SkillRef,
    },
    EffectApplied {
        target: ActorId,
        skill: SkillRef,
        kind: EffectKind,
    },
    CompanionCast {
        companion: CompanionId,
        owner: ActorId,
        skill: SkillRef,
        target: ActorId,
    },
    /// The owner's companion list changed; clients refresh their UI.
    CompanionsChanged {
        owner: ActorId,
    },
}

impl Notification {
    /// Short label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::CastStarted { .. } => "cast_started",
            Self::CastCompleted { .. } => "cast_completed",
            Self::CastInterrupted { .. } => "cast_interrupted",
            Self::CastFailed { .. } => "cast_failed",
            Self::CastQueued { .. } => "cast_queued",
            Self::ToggleCancelled { .. } => "toggle_cancelled",
            Self::SkillAvailable { .. } => "skill_available",
            Self::DamageDealt { .. } => "damage_dealt",
            Self::Healed { .. } => "healed",
            Self::Missed { .. } => "missed",
            Self::EffectApplied { .. } => "effect_applied",
            Self::CompanionCast { .. } => "companion_cast",
            Self::CompanionsChanged { .. } => "companions_changed",
        }
    }
}

/// Opaque sink for typed client events.
pub trait Notifier: Send + Sync {
    fn notify(&self, recipient: ActorId, notification: Notification);
}

/// Drops every notification.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullNotifier;

impl Notifier for NullNotifier {
    fn notify(&self, _recipient: ActorId, _notification: Notification) {}
}
