//! Status flags, zone flags and active effects carried by actors.
//!
//! Flags describe conditions the cast pipeline must respect (dead, casting,
//! sitting, ...). Effects are applied by the effect dispatcher and may imply
//! additional flags (a stun effect implies [`StatusFlags::STUNNED`]).

use bitflags::bitflags;

use crate::skill::SkillRef;
use crate::state::ActorId;

bitflags! {
    /// Conditions that gate skill use and targeting.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct StatusFlags: u32 {
        const DEAD            = 1 << 0;
        const PARALYZED       = 1 << 1;
        const STUNNED         = 1 << 2;
        const ROOTED          = 1 << 3;
        /// Set while a cast is in flight.
        const CASTING         = 1 << 4;
        const SITTING         = 1 << 5;
        const FAKE_DEATH      = 1 << 6;
        const FISHING         = 1 << 7;
        const OBSERVER        = 1 << 8;
        /// Feared, charmed or otherwise driven by something other than its controller.
        const OUT_OF_CONTROL  = 1 << 9;
        const SILENCED        = 1 << 10;
        const INVISIBLE       = 1 << 11;
        /// Damage never breaks this actor's casts (raid bosses).
        const UNINTERRUPTIBLE = 1 << 12;
        /// Owner is engaged in combat; combat companions only act in this stance.
        const ATTACK_STANCE   = 1 << 13;
        /// Logged in and present in the world.
        const ONLINE          = 1 << 14;
    }
}

impl StatusFlags {
    /// Dead or feigning death.
    pub fn is_alike_dead(self) -> bool {
        self.intersects(Self::DEAD | Self::FAKE_DEATH)
    }

    /// Any condition that takes the actor out of its controller's hands.
    pub fn is_out_of_control(self) -> bool {
        self.intersects(Self::PARALYZED | Self::STUNNED | Self::OUT_OF_CONTROL)
    }
}

bitflags! {
    /// Zones an actor currently stands in.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ZoneFlags: u8 {
        /// Towns and other sanctuaries: offensive skills are blocked.
        const PEACE = 1 << 0;
        /// Arenas: both parties inside consent to combat.
        const PVP   = 1 << 1;
        const SIEGE = 1 << 2;
    }
}

/// Identifier of one applied effect instance, unique per actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EffectId(pub u64);

/// What an applied effect does to its bearer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum EffectKind {
    Stun,
    Paralyze,
    Root,
    Poison,
    Debuff,
    DamageOverTime,
    Buff,
}

impl EffectKind {
    /// Status flag implied while an effect of this kind is active.
    pub fn implied_flags(self) -> StatusFlags {
        match self {
            EffectKind::Stun => StatusFlags::STUNNED,
            EffectKind::Paralyze => StatusFlags::PARALYZED,
            EffectKind::Root => StatusFlags::ROOTED,
            EffectKind::Poison | EffectKind::Debuff | EffectKind::DamageOverTime => {
                StatusFlags::empty()
            }
            EffectKind::Buff => StatusFlags::empty(),
        }
    }
}

/// An effect currently applied to an actor.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActiveEffect {
    pub id: EffectId,
    pub skill: SkillRef,
    pub kind: EffectKind,
    pub source: ActorId,
    /// Opposing effect (debuff) as opposed to a beneficial one.
    pub hostile: bool,
    /// Persistent effects survive cleansing.
    pub persistent: bool,
    /// Zero means "until removed".
    pub duration_ms: u64,
}

impl ActiveEffect {
    /// Cleansing may remove hostile, non-persistent effects only.
    pub fn is_negatable(&self) -> bool {
        self.hostile && !self.persistent
    }
}
