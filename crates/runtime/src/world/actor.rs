//! Mutable actor state owned by the runtime.

use std::collections::{HashMap, HashSet};

use cast_core::{
    ActiveEffect, ActorId, ActorKind, ActorView, CombatProfile, CompanionId, CooldownMap,
    Damageable, EffectId, PartyId, Position, ResolvedCast, SkillFamilyId, SkillId, SkillLevel,
    SkillRef, SkillUseHolder, SocialContext, StatusFlags, Targetable, Vitals, ZoneFlags,
};

use crate::scheduler::TaskHandle;

// ============================================================================
// Cast slots
// ============================================================================

/// Progress of the cast bound to the current holder.
#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CastPhase {
    /// Waiting for the completion timer; interrupts apply.
    Casting,
    /// Effects are being dispatched; interrupts are ignored.
    Completing,
}

/// The in-flight cast.
#[derive(Debug)]
pub struct CurrentCast {
    pub holder: SkillUseHolder,
    pub resolved: ResolvedCast,
    pub phase: CastPhase,
    /// Matches [`Actor::cast_seq`] at the time the cast was committed.
    pub seq: u64,
    pub completion: Option<TaskHandle>,
}

// ============================================================================
// Actor
// ============================================================================

/// A world actor: player, monster or summon.
///
/// Always accessed through its own mutex; see [`super::World`].
#[derive(Debug)]
pub struct Actor {
    pub id: ActorId,
    pub kind: ActorKind,
    pub position: Position,
    pub vitals: Vitals,
    pub status: StatusFlags,
    pub zones: ZoneFlags,
    pub social: SocialContext,
    pub combat: CombatProfile,
    /// Learned skills: id to level.
    pub skills: HashMap<SkillId, SkillLevel>,
    pub cooldowns: CooldownMap,
    /// Expiry task per active cooldown entry.
    pub(crate) cooldown_timers: HashMap<SkillFamilyId, TaskHandle>,
    /// Toggle skills currently switched on.
    pub toggles: HashSet<SkillId>,
    pub effects: Vec<ActiveEffect>,
    next_effect: u64,
    pub target: Option<ActorId>,
    pub summon: Option<ActorId>,
    pub loot_mark: Option<ActorId>,
    /// Hate per attacker; only monsters keep one.
    pub hate: HashMap<ActorId, u32>,
    /// Skill currently being cast.
    pub current: Option<CurrentCast>,
    /// Skill this player ordered its summon to use, while the order is in flight.
    pub current_companion: Option<SkillUseHolder>,
    /// At most one request waiting for the current cast to finish.
    pub queued: Option<SkillUseHolder>,
    /// Bumped whenever the current slot changes hands.
    pub cast_seq: u64,
    /// Companion agents owned by this actor, in spawn order.
    pub companions: Vec<CompanionId>,
}

impl Actor {
    pub fn new(id: ActorId, kind: ActorKind) -> Self {
        let status = match kind {
            ActorKind::Player => StatusFlags::ONLINE,
            ActorKind::Monster | ActorKind::Summon { .. } => StatusFlags::empty(),
        };
        Self {
            id,
            kind,
            position: Position::ORIGIN,
            vitals: Vitals::default(),
            status,
            zones: ZoneFlags::empty(),
            social: SocialContext::default(),
            combat: CombatProfile::default(),
            skills: HashMap::new(),
            cooldowns: CooldownMap::new(),
            cooldown_timers: HashMap::new(),
            toggles: HashSet::new(),
            effects: Vec::new(),
            next_effect: 1,
            target: None,
            summon: None,
            loot_mark: None,
            hate: HashMap::new(),
            current: None,
            current_companion: None,
            queued: None,
            cast_seq: 0,
            companions: Vec::new(),
        }
    }

    pub fn player(id: u32) -> Self {
        Self::new(ActorId(id), ActorKind::Player)
    }

    pub fn monster(id: u32) -> Self {
        Self::new(ActorId(id), ActorKind::Monster)
    }

    /// A summon inherits its owner's allegiances.
    pub fn summon(id: u32, owner: &Actor) -> Self {
        let mut summon = Self::new(ActorId(id), ActorKind::Summon { owner: owner.id });
        summon.social = owner.social.clone();
        summon.position = owner.position;
        summon
    }

    // ===== builders =====

    pub fn at(mut self, x: i32, y: i32, z: i32) -> Self {
        self.position = Position::new(x, y, z);
        self
    }

    pub fn with_vitals(mut self, vitals: Vitals) -> Self {
        self.vitals = vitals;
        self
    }

    pub fn with_hp(mut self, hp: u32, max_hp: u32) -> Self {
        self.vitals.hp = hp;
        self.vitals.max_hp = max_hp;
        self
    }

    pub fn with_combat(mut self, combat: CombatProfile) -> Self {
        self.combat = combat;
        self
    }

    pub fn with_skill(mut self, skill: SkillRef) -> Self {
        self.skills.insert(skill.id, skill.level);
        self
    }

    pub fn in_party(mut self, party: PartyId) -> Self {
        self.social.party = Some(party);
        self
    }

    pub fn in_zone(mut self, zones: ZoneFlags) -> Self {
        self.zones = zones;
        self
    }

    pub fn with_status(mut self, status: StatusFlags) -> Self {
        self.status |= status;
        self
    }

    pub fn targeting(mut self, target: ActorId) -> Self {
        self.target = Some(target);
        self
    }

    // ===== queries =====

    /// Learned level of `skill`, as a full reference.
    pub fn learned(&self, skill: SkillId) -> Option<SkillRef> {
        self.skills
            .get(&skill)
            .map(|&level| SkillRef { id: skill, level })
    }

    pub fn is_online(&self) -> bool {
        self.status.contains(StatusFlags::ONLINE)
    }

    /// Snapshot for the rule functions.
    pub fn view(&self) -> ActorView {
        ActorView {
            id: self.id,
            kind: self.kind,
            position: self.position,
            vitals: self.vitals,
            status: self.status,
            zones: self.zones,
            social: self.social.clone(),
            combat: self.combat,
            summon: self.summon,
            target: self.target,
            loot_mark: self.loot_mark,
        }
    }

    /// Removes one effect by id; returns false if it was already gone.
    pub fn remove_effect(&mut self, id: EffectId) -> bool {
        let before = self.effects.len();
        self.effects.retain(|effect| effect.id != id);
        let removed = self.effects.len() != before;
        if removed {
            self.refresh_effect_flags();
        }
        removed
    }

    /// Cancels every pending cooldown expiry task and forgets the entries.
    pub(crate) fn clear_cooldowns(&mut self) {
        for (_, timer) in self.cooldown_timers.drain() {
            timer.cancel();
        }
        self.cooldowns.clear();
    }

    fn refresh_effect_flags(&mut self) {
        let implied = StatusFlags::STUNNED | StatusFlags::PARALYZED | StatusFlags::ROOTED;
        self.status.remove(implied);
        for effect in &self.effects {
            self.status |= effect.kind.implied_flags();
        }
    }
}

// ============================================================================
// Capabilities
// ============================================================================

impl Targetable for Actor {
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

impl cast_core::SkillCaster for Actor {}

impl Damageable for Actor {
    fn vitals(&self) -> Vitals {
        self.vitals
    }

    fn is_casting(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|cast| cast.phase == CastPhase::Casting)
    }

    fn is_uninterruptible(&self) -> bool {
        self.status.contains(StatusFlags::UNINTERRUPTIBLE)
    }

    fn is_fake_dead(&self) -> bool {
        self.status.contains(StatusFlags::FAKE_DEATH)
    }

    fn stop_fake_death(&mut self) {
        self.status.remove(StatusFlags::FAKE_DEATH);
    }

    fn reduce_hp(&mut self, amount: u32, attacker: ActorId) -> u32 {
        if self.is_dead() {
            return 0;
        }
        let removed = self.vitals.drain_hp(amount);
        if self.vitals.hp == 0 {
            self.status.insert(StatusFlags::DEAD);
            self.status.remove(StatusFlags::CASTING);
            // The killing blow earns the right to sweep the corpse.
            if self.kind.is_monster() && self.loot_mark.is_none() {
                self.loot_mark = Some(attacker);
            }
        }
        removed
    }

    fn restore_hp(&mut self, amount: u32) -> u32 {
        if self.is_dead() {
            return 0;
        }
        self.vitals.restore_hp(amount)
    }

    fn apply_effect(&mut self, mut effect: ActiveEffect) -> EffectId {
        let id = EffectId(self.next_effect);
        self.next_effect += 1;
        effect.id = id;
        self.status |= effect.kind.implied_flags();
        self.effects.push(effect);
        id
    }

    fn remove_skill_effects(&mut self, skill: SkillId) -> usize {
        let before = self.effects.len();
        self.effects.retain(|effect| effect.skill.id != skill);
        let removed = before - self.effects.len();
        if removed > 0 {
            self.refresh_effect_flags();
        }
        removed
    }

    fn negate_effects(&mut self, max: u32) -> u32 {
        let mut negated = 0;
        self.effects.retain(|effect| {
            if negated < max && effect.is_negatable() {
                negated += 1;
                false
            } else {
                true
            }
        });
        if negated > 0 {
            self.refresh_effect_flags();
        }
        negated
    }

    fn add_hate(&mut self, attacker: ActorId, amount: u32) {
        if self.kind.is_monster() {
            let hate = self.hate.entry(attacker).or_default();
            *hate = hate.saturating_add(amount);
        }
    }

    fn clear_loot_mark(&mut self, by: ActorId) -> bool {
        if self.loot_mark == Some(by) {
            self.loot_mark = None;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use cast_core::EffectKind;

    use super::*;

    fn stun(skill: i32, hostile: bool, persistent: bool) -> ActiveEffect {
        ActiveEffect {
            id: EffectId(0),
            skill: SkillRef::new(skill, 1),
            kind: EffectKind::Stun,
            source: ActorId(9),
            hostile,
            persistent,
            duration_ms: 0,
        }
    }

    #[test]
    fn effects_drive_implied_flags() {
        let mut actor = Actor::player(1);
        let id = actor.apply_effect(stun(5, true, false));
        assert!(actor.status.contains(StatusFlags::STUNNED));
        assert!(actor.remove_effect(id));
        assert!(!actor.status.contains(StatusFlags::STUNNED));
        assert!(!actor.remove_effect(id));
    }

    #[test]
    fn negation_skips_persistent_effects() {
        let mut actor = Actor::player(1);
        actor.apply_effect(stun(5, true, true));
        actor.apply_effect(stun(6, true, false));
        actor.apply_effect(stun(7, false, false));
        assert_eq!(actor.negate_effects(5), 1);
        assert_eq!(actor.effects.len(), 2);
        assert!(actor.status.contains(StatusFlags::STUNNED));
    }

    #[test]
    fn killing_blow_marks_monster_for_sweep() {
        let mut mob = Actor::monster(2).with_hp(10, 10);
        assert_eq!(mob.reduce_hp(25, ActorId(1)), 10);
        assert!(mob.is_dead());
        assert_eq!(mob.loot_mark, Some(ActorId(1)));
        assert_eq!(mob.reduce_hp(5, ActorId(3)), 0);
        assert!(mob.clear_loot_mark(ActorId(1)));
        assert!(!mob.clear_loot_mark(ActorId(1)));
    }

    #[test]
    fn summon_copies_owner_allegiances() {
        let owner = Actor::player(1).in_party(PartyId(4)).at(10, 0, 0);
        let summon = Actor::summon(2, &owner);
        assert_eq!(summon.social.party, Some(PartyId(4)));
        assert_eq!(summon.view().acting_player(), ActorId(1));
        assert_eq!(summon.position, owner.position);
    }
}
