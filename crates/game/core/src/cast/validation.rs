use crate::capability::CastEnv;
use crate::hostility::{self, Hostility};
use crate::skill::{CastOptions, SkillCategory, SkillTemplate, TargetCategory};
use crate::state::{ActorId, ActorView, Position, StatusFlags, Targetable};
use crate::targeting::TargetingContext;

use super::{BlockReason, CastError, ResolvedCast, TargetFault};

/// Facts about the requested skill that live on the caster rather than in
/// its [`ActorView`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CasterSkillState {
    /// The skill is a toggle that is currently switched on.
    pub toggle_active: bool,
    /// Time left on the skill family's cooldown.
    pub cooldown_remaining_ms: Option<u64>,
}

/// Runs the validation pipeline for one request.
///
/// Order: actor state, toggle, cooldown, resources, target resolution and
/// validity, then skill-specific semantics. Nothing is mutated; the caller
/// commits the returned [`ResolvedCast`] under the caster's lock.
pub fn validate_cast(
    caster: &ActorView,
    skill: &SkillTemplate,
    state: CasterSkillState,
    options: CastOptions,
    env: &CastEnv<'_>,
    world: &dyn TargetingContext,
) -> Result<ResolvedCast, CastError> {
    check_actor_state(caster, skill).map_err(CastError::ActorStateBlocked)?;

    if skill.is_toggle() && state.toggle_active {
        return Err(CastError::TogglePreventsRecast);
    }

    if let Some(remaining_ms) = state.cooldown_remaining_ms {
        return Err(CastError::SkillOnCooldown {
            family: skill.family,
            remaining_ms,
        });
    }

    env.resources
        .check(caster, skill)
        .map_err(CastError::InsufficientResource)?;

    resolve_targets(caster, skill, options, env, world).map_err(CastError::InvalidTarget)
}

fn check_actor_state(caster: &ActorView, skill: &SkillTemplate) -> Result<(), BlockReason> {
    let status = caster.status;
    if status.contains(StatusFlags::DEAD) {
        return Err(BlockReason::Dead);
    }
    if status.is_out_of_control() {
        return Err(BlockReason::OutOfControl);
    }
    if status.contains(StatusFlags::FISHING) {
        return Err(BlockReason::Fishing);
    }
    if status.contains(StatusFlags::OBSERVER) {
        return Err(BlockReason::Observer);
    }
    if status.contains(StatusFlags::SITTING) {
        return Err(BlockReason::Sitting);
    }
    if skill.magic && status.contains(StatusFlags::SILENCED) {
        return Err(BlockReason::Silenced);
    }
    if status.contains(StatusFlags::FAKE_DEATH) {
        return Err(BlockReason::FakeDeath);
    }
    Ok(())
}

fn resolve_targets(
    caster: &ActorView,
    skill: &SkillTemplate,
    options: CastOptions,
    env: &CastEnv<'_>,
    world: &dyn TargetingContext,
) -> Result<ResolvedCast, TargetFault> {
    let single = |target: ActorId| ResolvedCast {
        skill: skill.skill_ref(),
        primary: Some(target),
        targets: vec![target],
        ground: None,
    };

    match skill.target {
        TargetCategory::SelfOnly => Ok(single(caster.id)),

        TargetCategory::Summon => {
            let summon = caster
                .summon
                .and_then(|id| world.view(id))
                .ok_or(TargetFault::Missing)?;
            if summon.is_dead() {
                return Err(TargetFault::Dead);
            }
            if !caster.position.within_range(summon.position, skill.cast_range) {
                return Err(TargetFault::OutOfRange);
            }
            Ok(single(summon.id))
        }

        TargetCategory::Explicit => {
            let requested = options.target.or(caster.target);
            let target_id = match requested {
                Some(id) => id,
                None if !skill.offensive => caster.id,
                None => return Err(TargetFault::Missing),
            };
            let target = world.view(target_id).ok_or(TargetFault::Missing)?;
            check_explicit_target(caster, &target, skill, options, env)?;
            Ok(single(target.id))
        }

        TargetCategory::Aura => {
            let targets =
                area_targets(caster, caster.position, skill, options, env, world);
            Ok(ResolvedCast {
                skill: skill.skill_ref(),
                primary: targets.first().copied(),
                targets,
                ground: None,
            })
        }

        TargetCategory::Ground => {
            let point = options.ground.ok_or(TargetFault::Missing)?;
            if !caster.position.within_range(point, skill.cast_range) {
                return Err(TargetFault::OutOfRange);
            }
            if !env.pathfinding.can_see(caster.position, point) {
                return Err(TargetFault::LineOfSight);
            }
            let targets = area_targets(caster, point, skill, options, env, world);
            Ok(ResolvedCast {
                skill: skill.skill_ref(),
                primary: targets.first().copied(),
                targets,
                ground: Some(point),
            })
        }

        TargetCategory::OwnerParty => {
            let members = match caster.social.party {
                Some(party) => world.party_members(party),
                None => vec![caster.id],
            };
            let targets: Vec<ActorId> = members
                .into_iter()
                .filter_map(|id| world.view(id))
                .filter(|view| !view.is_dead())
                .filter(|view| caster.position.within_range(view.position, skill.effect_radius))
                .map(|view| view.id)
                .collect();
            Ok(ResolvedCast {
                skill: skill.skill_ref(),
                primary: Some(caster.id),
                targets,
                ground: None,
            })
        }
    }
}

fn check_explicit_target(
    caster: &ActorView,
    target: &ActorView,
    skill: &SkillTemplate,
    options: CastOptions,
    env: &CastEnv<'_>,
) -> Result<(), TargetFault> {
    let sweep = matches!(skill.category, SkillCategory::Sweep);
    match (sweep, target.is_dead()) {
        (true, false) => return Err(TargetFault::NotMarked),
        (false, true) => return Err(TargetFault::Dead),
        _ => {}
    }
    if target.id != caster.id {
        if !target.is_visible() {
            return Err(TargetFault::NotVisible);
        }
        if !caster.position.within_range(target.position, skill.cast_range) {
            return Err(TargetFault::OutOfRange);
        }
        if !env.pathfinding.can_see(caster.position, target.position) {
            return Err(TargetFault::LineOfSight);
        }
    }
    if skill.requires_monster_target && !target.kind.is_monster() {
        return Err(TargetFault::WrongCategory);
    }
    if skill.offensive {
        if let Hostility::Friendly(immunity) = hostility::evaluate(caster, target, options.force)
        {
            return Err(TargetFault::from_immunity(immunity));
        }
    }
    if sweep && target.loot_mark != Some(caster.acting_player()) {
        return Err(TargetFault::NotMarked);
    }
    Ok(())
}

/// Area members around `center`, filtered by the same rules a single target
/// would face. Offensive skills keep enemies, the rest keep friends.
fn area_targets(
    caster: &ActorView,
    center: Position,
    skill: &SkillTemplate,
    options: CastOptions,
    env: &CastEnv<'_>,
    world: &dyn TargetingContext,
) -> Vec<ActorId> {
    world
        .nearby(center, skill.effect_radius)
        .into_iter()
        .filter(|view| view.id != caster.id)
        .filter(|view| !view.is_dead() && view.is_visible())
        .filter(|view| !skill.requires_monster_target || view.kind.is_monster())
        .filter(|view| env.pathfinding.can_see(center, view.position))
        .filter(|view| {
            let hostile = hostility::evaluate(caster, view, options.force).is_hostile();
            hostile == skill.offensive
        })
        .map(|view| view.id)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::capability::{
        CastEnv, CombatFormulas, DrainResolver, DrainResult, NullNotifier, Pathfinding,
        Resource, ShieldBlock, SkillOracle, VitalsGate,
    };
    use crate::config::CastConfig;
    use crate::skill::{SkillFamilyId, SkillRef};
    use crate::state::{
        ActorKind, CombatProfile, PartyId, SocialContext, Vitals, ZoneFlags,
    };

    struct NoSkills;

    impl SkillOracle for NoSkills {
        fn skill(&self, _skill: SkillRef) -> Option<&SkillTemplate> {
            None
        }
    }

    struct Flat;

    impl CombatFormulas for Flat {
        fn roll_critical(&self, _: &CombatProfile, _: &SkillTemplate) -> bool {
            false
        }
        fn resolve_shield_block(&self, _: &CombatProfile, _: &SkillTemplate) -> ShieldBlock {
            ShieldBlock::None
        }
        fn compute_magic_damage(
            &self,
            _: &CombatProfile,
            _: &CombatProfile,
            skill: &SkillTemplate,
            _: ShieldBlock,
            _: bool,
        ) -> u32 {
            skill.power
        }
        fn roll_skill_success(
            &self,
            _: &CombatProfile,
            _: &CombatProfile,
            _: &SkillTemplate,
            _: ShieldBlock,
        ) -> bool {
            true
        }
        fn resolve_skill_reflect(&self, _: &CombatProfile, _: &SkillTemplate) -> bool {
            false
        }
    }

    impl DrainResolver for Flat {
        fn resolve_drain(
            &self,
            _: &CombatProfile,
            _: &CombatProfile,
            _: Vitals,
            _: &SkillTemplate,
            _: &dyn CombatFormulas,
        ) -> DrainResult {
            DrainResult::default()
        }
    }

    /// Walls block sight across x = 1000.
    struct Wall;

    impl Pathfinding for Wall {
        fn can_see(&self, from: Position, to: Position) -> bool {
            (from.x < 1_000) == (to.x < 1_000)
        }
    }

    #[derive(Default)]
    struct World(HashMap<ActorId, ActorView>);

    impl TargetingContext for World {
        fn view(&self, id: ActorId) -> Option<ActorView> {
            self.0.get(&id).cloned()
        }

        fn party_members(&self, party: PartyId) -> Vec<ActorId> {
            let mut ids: Vec<_> = self
                .0
                .values()
                .filter(|view| view.social.party == Some(party))
                .map(|view| view.id)
                .collect();
            ids.sort();
            ids
        }

        fn nearby(&self, center: Position, radius: u32) -> Vec<ActorView> {
            let mut views: Vec<_> = self
                .0
                .values()
                .filter(|view| center.within_range(view.position, radius))
                .cloned()
                .collect();
            views.sort_by_key(|view| view.id);
            views
        }
    }

    fn actor(id: u32, kind: ActorKind, x: i32) -> ActorView {
        ActorView {
            id: ActorId(id),
            kind,
            position: Position::new(x, 0, 0),
            vitals: Vitals::full(1_000, 500),
            status: StatusFlags::ONLINE,
            zones: ZoneFlags::empty(),
            social: SocialContext::default(),
            combat: CombatProfile::default(),
            summon: None,
            target: None,
            loot_mark: None,
        }
    }

    fn bolt() -> SkillTemplate {
        SkillTemplate::new(SkillRef::new(1, 1), "bolt", SkillCategory::MagicDamage)
            .offensive()
            .with_range(600)
            .with_power(50)
            .with_mp_cost(10)
    }

    fn validate(
        caster: &ActorView,
        skill: &SkillTemplate,
        state: CasterSkillState,
        options: CastOptions,
        world: &World,
    ) -> Result<ResolvedCast, CastError> {
        let config = CastConfig::default();
        let env = CastEnv {
            skills: &NoSkills,
            formulas: &Flat,
            drain: &Flat,
            pathfinding: &Wall,
            resources: &VitalsGate,
            notifier: &NullNotifier,
            config: &config,
        };
        validate_cast(caster, skill, state, options, &env, world)
    }

    fn world_with(views: &[ActorView]) -> World {
        World(views.iter().map(|view| (view.id, view.clone())).collect())
    }

    #[test]
    fn bolt_at_monster_in_range_resolves() {
        let caster = actor(1, ActorKind::Player, 0);
        let mob = actor(2, ActorKind::Monster, 500);
        let world = world_with(&[caster.clone(), mob]);

        let resolved = validate(
            &caster,
            &bolt(),
            CasterSkillState::default(),
            CastOptions::at(ActorId(2)),
            &world,
        )
        .unwrap();
        assert_eq!(resolved.primary, Some(ActorId(2)));
        assert_eq!(resolved.targets, vec![ActorId(2)]);
    }

    #[test]
    fn actor_state_is_checked_before_cooldown() {
        let mut caster = actor(1, ActorKind::Player, 0);
        caster.status |= StatusFlags::SITTING;
        let world = world_with(&[caster.clone()]);
        let state = CasterSkillState {
            toggle_active: false,
            cooldown_remaining_ms: Some(100),
        };

        let err = validate(&caster, &bolt(), state, CastOptions::default(), &world).unwrap_err();
        assert_eq!(err, CastError::ActorStateBlocked(BlockReason::Sitting));
    }

    #[test]
    fn silence_blocks_magic_only() {
        let mut caster = actor(1, ActorKind::Player, 0);
        caster.status |= StatusFlags::SILENCED;
        let mob = actor(2, ActorKind::Monster, 100);
        let world = world_with(&[caster.clone(), mob]);
        let mut physical = bolt();
        physical.magic = false;

        assert_eq!(
            validate(&caster, &bolt(), Default::default(), CastOptions::at(ActorId(2)), &world),
            Err(CastError::ActorStateBlocked(BlockReason::Silenced))
        );
        assert!(
            validate(&caster, &physical, Default::default(), CastOptions::at(ActorId(2)), &world)
                .is_ok()
        );
    }

    #[test]
    fn cooldown_reports_family_and_remaining() {
        let caster = actor(1, ActorKind::Player, 0);
        let world = world_with(&[caster.clone()]);
        let skill = bolt().with_family(SkillFamilyId(77));
        let state = CasterSkillState {
            toggle_active: false,
            cooldown_remaining_ms: Some(1),
        };

        assert_eq!(
            validate(&caster, &skill, state, CastOptions::default(), &world),
            Err(CastError::SkillOnCooldown {
                family: SkillFamilyId(77),
                remaining_ms: 1
            })
        );
    }

    #[test]
    fn active_toggle_short_circuits_before_cooldown() {
        let caster = actor(1, ActorKind::Player, 0);
        let world = world_with(&[caster.clone()]);
        let toggle = SkillTemplate::new(SkillRef::new(9, 1), "stance", SkillCategory::Toggle)
            .with_target(TargetCategory::SelfOnly);
        let state = CasterSkillState {
            toggle_active: true,
            cooldown_remaining_ms: Some(5_000),
        };

        assert_eq!(
            validate(&caster, &toggle, state, CastOptions::default(), &world),
            Err(CastError::TogglePreventsRecast)
        );
    }

    #[test]
    fn insufficient_mana_is_reported() {
        let mut caster = actor(1, ActorKind::Player, 0);
        caster.vitals.mp = 5;
        let world = world_with(&[caster.clone()]);

        assert_eq!(
            validate(&caster, &bolt(), Default::default(), CastOptions::default(), &world),
            Err(CastError::InsufficientResource(Resource::Mana))
        );
    }

    #[test]
    fn target_faults_cover_range_sight_and_death() {
        let caster = actor(1, ActorKind::Player, 900);
        let far = actor(2, ActorKind::Monster, 1_600);
        let behind_wall = actor(3, ActorKind::Monster, 1_100);
        let mut dead = actor(4, ActorKind::Monster, 950);
        dead.status |= StatusFlags::DEAD;
        let world = world_with(&[caster.clone(), far, behind_wall, dead]);
        let check = |id| {
            validate(&caster, &bolt(), Default::default(), CastOptions::at(ActorId(id)), &world)
        };

        assert_eq!(check(2), Err(CastError::InvalidTarget(TargetFault::OutOfRange)));
        assert_eq!(check(3), Err(CastError::InvalidTarget(TargetFault::LineOfSight)));
        assert_eq!(check(4), Err(CastError::InvalidTarget(TargetFault::Dead)));
        assert_eq!(check(99), Err(CastError::InvalidTarget(TargetFault::Missing)));
    }

    #[test]
    fn peace_zone_blocks_player_targets() {
        let caster = actor(1, ActorKind::Player, 0);
        let mut victim = actor(2, ActorKind::Player, 100);
        victim.zones = ZoneFlags::PEACE;
        victim.social.pvp_flag = true;
        let world = world_with(&[caster.clone(), victim]);

        assert_eq!(
            validate(
                &caster,
                &bolt(),
                Default::default(),
                CastOptions::at(ActorId(2)).forced(),
                &world
            ),
            Err(CastError::InvalidTarget(TargetFault::ZoneBlocked))
        );
    }

    #[test]
    fn drain_requires_monster_when_flagged() {
        let caster = actor(1, ActorKind::Player, 0);
        let mut victim = actor(2, ActorKind::Player, 100);
        victim.social.karma = 5;
        let world = world_with(&[caster.clone(), victim]);
        let mut drain = SkillTemplate::new(SkillRef::new(4, 1), "drain", SkillCategory::Drain)
            .offensive();
        drain.requires_monster_target = true;

        assert_eq!(
            validate(&caster, &drain, Default::default(), CastOptions::at(ActorId(2)), &world),
            Err(CastError::InvalidTarget(TargetFault::WrongCategory))
        );
    }

    #[test]
    fn sweep_needs_dead_target_marked_by_caster() {
        let caster = actor(1, ActorKind::Player, 0);
        let mut corpse = actor(2, ActorKind::Monster, 100);
        corpse.status |= StatusFlags::DEAD;
        corpse.loot_mark = Some(ActorId(7));
        let live = actor(3, ActorKind::Monster, 100);
        let mut world = world_with(&[caster.clone(), corpse.clone(), live]);
        let sweep = SkillTemplate::new(SkillRef::new(42, 1), "sweep", SkillCategory::Sweep);
        let check = |world: &World, id| {
            validate(&caster, &sweep, Default::default(), CastOptions::at(ActorId(id)), world)
        };

        assert_eq!(check(&world, 2), Err(CastError::InvalidTarget(TargetFault::NotMarked)));
        assert_eq!(check(&world, 3), Err(CastError::InvalidTarget(TargetFault::NotMarked)));

        corpse.loot_mark = Some(ActorId(1));
        world.0.insert(corpse.id, corpse);
        assert!(check(&world, 2).is_ok());
    }

    #[test]
    fn aura_keeps_only_hostile_targets_in_radius() {
        let caster = actor(1, ActorKind::Player, 0);
        let mob = actor(2, ActorKind::Monster, 100);
        let bystander = actor(3, ActorKind::Player, 100);
        let far_mob = actor(4, ActorKind::Monster, 800);
        let world = world_with(&[caster.clone(), mob, bystander, far_mob]);
        let mut aura = bolt().with_target(TargetCategory::Aura);
        aura.effect_radius = 300;

        let resolved =
            validate(&caster, &aura, Default::default(), CastOptions::default(), &world).unwrap();
        assert_eq!(resolved.targets, vec![ActorId(2)]);
    }

    #[test]
    fn ground_point_must_be_in_range() {
        let caster = actor(1, ActorKind::Player, 0);
        let world = world_with(&[caster.clone()]);
        let mut ground = bolt().with_target(TargetCategory::Ground);
        ground.effect_radius = 200;

        assert_eq!(
            validate(&caster, &ground, Default::default(), CastOptions::default(), &world),
            Err(CastError::InvalidTarget(TargetFault::Missing))
        );
        assert_eq!(
            validate(
                &caster,
                &ground,
                Default::default(),
                CastOptions::on_ground(Position::new(700, 0, 0)),
                &world
            ),
            Err(CastError::InvalidTarget(TargetFault::OutOfRange))
        );
        let resolved = validate(
            &caster,
            &ground,
            Default::default(),
            CastOptions::on_ground(Position::new(400, 0, 0)),
            &world,
        )
        .unwrap();
        assert_eq!(resolved.ground, Some(Position::new(400, 0, 0)));
        assert!(resolved.targets.is_empty());
    }

    #[test]
    fn supportive_explicit_skill_defaults_to_self() {
        let caster = actor(1, ActorKind::Player, 0);
        let world = world_with(&[caster.clone()]);
        let heal = SkillTemplate::new(SkillRef::new(1011, 1), "heal", SkillCategory::Heal);

        let resolved =
            validate(&caster, &heal, Default::default(), CastOptions::default(), &world).unwrap();
        assert_eq!(resolved.primary, Some(ActorId(1)));
    }
}
