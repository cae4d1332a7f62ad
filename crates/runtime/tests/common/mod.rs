//! Deterministic doubles and content shared by the integration tests.
#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use cast_core::{
    ActorId, CombatFormulas, CooldownRecord, CombatProfile, CompanionKindId, CompanionTemplate, EffectKind, EffectSpec,
    RandomSource, ShieldBlock, SkillCategory, SkillFamilyId, SkillRef, SkillTemplate,
    TargetCategory,
};
use cast_runtime::{
    CompanionOracleImpl, CooldownRepository, InMemoryCooldownRepo, OracleManager,
    RepositoryError, Runtime, RuntimeConfig, SessionClock, SkillOracleImpl,
};

pub const EPOCH_MS: i64 = 1_700_000_000_000;

// ===== skills =====

/// 1s cast, 5s cooldown.
pub const BOLT: SkillRef = SkillRef::new(1177, 1);
/// 3s cast, no cooldown.
pub const SLOW_BOLT: SkillRef = SkillRef::new(1178, 1);
/// Instant, no cooldown.
pub const JAB: SkillRef = SkillRef::new(1179, 1);
/// 2s cast; the cooldown is paid even when interrupted.
pub const FOCUS: SkillRef = SkillRef::new(1180, 1);
pub const HEAL: SkillRef = SkillRef::new(1011, 1);
pub const SHIELD_AURA: SkillRef = SkillRef::new(1200, 1);
pub const CUBIC_SHOCK: SkillRef = SkillRef::new(4049, 1);
pub const CUBIC_MEND: SkillRef = SkillRef::new(4051, 1);

pub const STORM_CUBIC: CompanionKindId = CompanionKindId(1);
pub const LIFE_CUBIC: CompanionKindId = CompanionKindId(3);

pub fn skills() -> Vec<SkillTemplate> {
    vec![
        SkillTemplate::new(BOLT, "Wind Strike", SkillCategory::MagicDamage)
            .offensive()
            .with_power(10)
            .with_timing(1_000, 5_000),
        SkillTemplate::new(SLOW_BOLT, "Ice Bolt", SkillCategory::MagicDamage)
            .offensive()
            .with_power(10)
            .with_timing(3_000, 0),
        SkillTemplate::new(JAB, "Shock Jab", SkillCategory::MagicDamage)
            .offensive()
            .with_power(10),
        SkillTemplate::new(FOCUS, "Arcane Focus", SkillCategory::MagicDamage)
            .offensive()
            .with_power(10)
            .with_timing(2_000, 8_000)
            .consumed_on_interrupt(),
        SkillTemplate::new(HEAL, "Heal", SkillCategory::Heal).with_power(50),
        SkillTemplate::new(SHIELD_AURA, "Arcane Shield", SkillCategory::Toggle)
            .with_target(TargetCategory::SelfOnly)
            .with_effect(EffectSpec {
                kind: EffectKind::Buff,
                duration_ms: 0,
                persistent: false,
            }),
        SkillTemplate::new(CUBIC_SHOCK, "Cubic Shock", SkillCategory::MagicDamage)
            .offensive()
            .with_power(10)
            .with_family(SkillFamilyId(4049)),
        SkillTemplate::new(CUBIC_MEND, "Cubic Mend", SkillCategory::Heal).with_power(10),
    ]
}

pub fn companions() -> Vec<CompanionTemplate> {
    vec![
        CompanionTemplate {
            kind: STORM_CUBIC,
            name: "Storm Cubic".into(),
            period_ms: 2_000,
            chance_percent: 100,
            lifetime_ms: 10_000,
            skills: vec![CUBIC_SHOCK],
            requires_stance: true,
            auto_activate: false,
        },
        CompanionTemplate {
            kind: LIFE_CUBIC,
            name: "Life Cubic".into(),
            period_ms: 2_000,
            chance_percent: 100,
            lifetime_ms: 60_000,
            skills: vec![CUBIC_MEND],
            requires_stance: false,
            auto_activate: true,
        },
    ]
}

pub fn oracles() -> OracleManager {
    OracleManager::new(
        Arc::new(SkillOracleImpl::new(skills())),
        Arc::new(CompanionOracleImpl::new(companions())),
    )
}

// ===== capabilities =====

/// Every skill lands, never crits, never blocks; damage is the skill's power.
#[derive(Clone, Copy, Debug, Default)]
pub struct ScriptedFormulas;

impl CombatFormulas for ScriptedFormulas {
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

/// Fixed roll, picks cycle through the skill list.
#[derive(Debug, Default)]
pub struct FixedRng {
    roll: u32,
    picks: AtomicUsize,
}

impl FixedRng {
    pub fn always(roll: u32) -> Self {
        Self {
            roll,
            picks: AtomicUsize::new(0),
        }
    }
}

impl RandomSource for FixedRng {
    fn roll_percent(&self) -> u32 {
        self.roll
    }

    fn pick(&self, len: usize) -> usize {
        self.picks.fetch_add(1, Ordering::Relaxed) % len
    }
}

// ===== persistence =====

/// In-memory repository whose saves fail for the actors marked broken.
#[derive(Default)]
pub struct FlakyRepo {
    inner: InMemoryCooldownRepo,
    broken: Mutex<HashSet<ActorId>>,
}

impl FlakyRepo {
    pub fn failing_for(actors: &[ActorId]) -> Self {
        Self {
            inner: InMemoryCooldownRepo::new(),
            broken: Mutex::new(actors.iter().copied().collect()),
        }
    }

    pub fn repair(&self, actor: ActorId) {
        self.broken.lock().unwrap().remove(&actor);
    }
}

impl CooldownRepository for FlakyRepo {
    fn load_cooldowns(&self, actor: ActorId) -> Result<Vec<CooldownRecord>, RepositoryError> {
        self.inner.load_cooldowns(actor)
    }

    fn save_cooldowns(
        &self,
        actor: ActorId,
        records: &[CooldownRecord],
    ) -> Result<(), RepositoryError> {
        if self.broken.lock().unwrap().contains(&actor) {
            return Err(RepositoryError::Io(std::io::Error::other("disk full")));
        }
        self.inner.save_cooldowns(actor, records)
    }

    fn list_actors(&self) -> Result<Vec<ActorId>, RepositoryError> {
        self.inner.list_actors()
    }
}

// ===== runtime =====

pub async fn runtime() -> Runtime {
    runtime_with(None).await
}

pub async fn runtime_with(repository: Option<Arc<dyn CooldownRepository>>) -> Runtime {
    let mut builder = Runtime::builder()
        .config(RuntimeConfig::default())
        .oracles(oracles())
        .formulas(ScriptedFormulas)
        .rng(FixedRng::always(1))
        .clock(SessionClock::anchored_at(EPOCH_MS));
    if let Some(repository) = repository {
        builder = builder.repository(repository);
    }
    builder.build().await.expect("runtime should build")
}

/// Sleeps on the paused test clock; every timer due before the deadline fires first.
pub async fn advance_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}
