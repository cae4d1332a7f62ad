use crate::skill::SkillId;
use crate::state::{
    ActiveEffect, ActorId, ActorKind, CombatProfile, EffectId, Position, SocialContext,
    StatusFlags, Vitals, ZoneFlags,
};

// ============================================================================
// Capability traits
// ============================================================================

/// Anything that can be located and picked as a target.
pub trait Targetable {
    fn actor_id(&self) -> ActorId;

    fn kind(&self) -> ActorKind;

    fn position(&self) -> Position;

    fn combat_profile(&self) -> CombatProfile;

    fn is_dead(&self) -> bool;

    fn is_visible(&self) -> bool {
        true
    }
}

/// Source of a skill: a player, a summon, or a companion acting for its owner.
pub trait SkillCaster: Targetable {
    /// Actor credited with the damage and notified as the attacker.
    fn credited_actor(&self) -> ActorId {
        self.actor_id()
    }
}

/// Mutable receiving end of the effect dispatcher.
///
/// Implementations must not block; they are invoked while the runtime holds
/// the target's lock.
pub trait Damageable: Targetable {
    fn vitals(&self) -> Vitals;

    /// A cast is in flight and has not reached its completion phase.
    fn is_casting(&self) -> bool;

    fn is_uninterruptible(&self) -> bool;

    fn is_fake_dead(&self) -> bool;

    fn stop_fake_death(&mut self);

    /// Removes HP and returns the amount actually removed.
    fn reduce_hp(&mut self, amount: u32, attacker: ActorId) -> u32;

    /// Restores HP and returns the amount actually restored.
    fn restore_hp(&mut self, amount: u32) -> u32;

    /// Stores the effect, assigning it a fresh id.
    fn apply_effect(&mut self, effect: ActiveEffect) -> EffectId;

    /// Drops every effect originating from `skill`; returns how many were removed.
    fn remove_skill_effects(&mut self, skill: SkillId) -> usize;

    /// Removes up to `max` negatable effects; returns how many were removed.
    fn negate_effects(&mut self, max: u32) -> u32;

    /// Adds hate toward `attacker`. No-op for actors without an aggro list.
    fn add_hate(&mut self, attacker: ActorId, amount: u32);

    /// Clears a sweep mark held by `by`; returns false if no such mark existed.
    fn clear_loot_mark(&mut self, by: ActorId) -> bool;
}

// ============================================================================
// Snapshots
// ============================================================================

/// Read-only snapshot of an actor taken under its lock.
///
/// Views are what validation and targeting consume, so that no rule
/// function ever holds two actor locks at once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActorView {
    pub id: ActorId,
    pub kind: ActorKind,
    pub position: Position,
    pub vitals: Vitals,
    pub status: StatusFlags,
    pub zones: ZoneFlags,
    pub social: SocialContext,
    pub combat: CombatProfile,
    /// The player's own summon, if any.
    pub summon: Option<ActorId>,
    /// Currently selected target.
    pub target: Option<ActorId>,
    /// Who earned the right to sweep this corpse.
    pub loot_mark: Option<ActorId>,
}

impl ActorView {
    /// Player whose social standing governs this actor.
    pub fn acting_player(&self) -> ActorId {
        self.kind.acting_player(self.id)
    }

    pub fn is_online(&self) -> bool {
        self.status.contains(StatusFlags::ONLINE)
    }

    pub fn in_zone(&self, zone: ZoneFlags) -> bool {
        self.zones.contains(zone)
    }
}

impl Targetable for ActorView {
    fn actor_id(&self) -> ActorId {
        self.id
    }

    fn kind(&self) -> ActorKind {
        self.kind
    }

    fn position(&self) -> Position {
        self.position
    }

    fn combat_profile(&self) -> CombatProfile {
        self.combat
    }

    fn is_dead(&self) -> bool {
        self.status.contains(StatusFlags::DEAD)
    }

    fn is_visible(&self) -> bool {
        !self.status.contains(StatusFlags::INVISIBLE)
    }
}

impl SkillCaster for ActorView {}

/// Caster identity for skills that do not originate from a world actor,
/// such as a companion agent orbiting its owner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CasterProfile {
    /// Actor credited with the cast.
    pub credited: ActorId,
    pub kind: ActorKind,
    pub position: Position,
    pub combat: CombatProfile,
}

impl Targetable for CasterProfile {
    fn actor_id(&self) -> ActorId {
        self.credited
    }

    fn kind(&self) -> ActorKind {
        self.kind
    }

    fn position(&self) -> Position {
        self.position
    }

    fn combat_profile(&self) -> CombatProfile {
        self.combat
    }

    fn is_dead(&self) -> bool {
        false
    }
}

impl SkillCaster for CasterProfile {
    fn credited_actor(&self) -> ActorId {
        self.credited
    }
}
