use cast_core::{
    ChargedShot, CombatFormulas, CombatProfile, DrainResolver, DrainResult, ShieldBlock,
    SkillTemplate, Vitals,
};
use rand::Rng;

/// Base constant of the magic damage formula.
const MAGIC_DAMAGE_BASE: f64 = 91.0;
const CRITICAL_MULTIPLIER: f64 = 2.0;
/// Share of successful blocks that turn out perfect.
const PERFECT_BLOCK_PERCENT: u32 = 1;
/// Land chance gained or lost per level of difference.
const LEVEL_DIFF_STEP: i64 = 2;
const MIN_LAND_RATE: i64 = 1;
const MAX_LAND_RATE: i64 = 99;

/// Magic formulas driven by `rand`.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardFormulas;

impl StandardFormulas {
    /// Land chance in percent before the roll.
    pub fn land_rate(
        caster: &CombatProfile,
        target: &CombatProfile,
        skill: &SkillTemplate,
        shield: ShieldBlock,
    ) -> u32 {
        let level_diff = i64::from(caster.level) - i64::from(target.level);
        let charge_bonus = match caster.charged {
            ChargedShot::None => 0,
            ChargedShot::Spiritshot => 5,
            ChargedShot::BlessedSpiritshot => 10,
        };
        let mut rate = i64::from(skill.land_rate) + level_diff * LEVEL_DIFF_STEP + charge_bonus;
        if shield == ShieldBlock::Block {
            rate /= 2;
        }
        rate.clamp(MIN_LAND_RATE, MAX_LAND_RATE) as u32
    }
}

impl CombatFormulas for StandardFormulas {
    fn roll_critical(&self, caster: &CombatProfile, _skill: &SkillTemplate) -> bool {
        rand::thread_rng().gen_range(0..1_000) < caster.m_crit_rate
    }

    fn resolve_shield_block(&self, target: &CombatProfile, _skill: &SkillTemplate) -> ShieldBlock {
        if target.shield_rate == 0 {
            return ShieldBlock::None;
        }
        let mut rng = rand::thread_rng();
        if rng.gen_range(1..=100) > target.shield_rate {
            ShieldBlock::None
        } else if rng.gen_range(1..=100) <= PERFECT_BLOCK_PERCENT {
            ShieldBlock::Perfect
        } else {
            ShieldBlock::Block
        }
    }

    fn compute_magic_damage(
        &self,
        caster: &CombatProfile,
        target: &CombatProfile,
        skill: &SkillTemplate,
        shield: ShieldBlock,
        critical: bool,
    ) -> u32 {
        if skill.power == 0 {
            return 0;
        }
        let m_atk = f64::from(caster.m_atk.max(1)) * caster.charged.matk_multiplier();
        let m_def = match shield {
            ShieldBlock::None => f64::from(target.m_def.max(1)),
            ShieldBlock::Block => f64::from(target.m_def.max(1)) * 2.0,
            ShieldBlock::Perfect => return 1,
        };
        let mut damage = MAGIC_DAMAGE_BASE * m_atk.sqrt() / m_def * f64::from(skill.power);
        if critical {
            damage *= CRITICAL_MULTIPLIER;
        }
        (damage.round() as u32).max(1)
    }

    fn roll_skill_success(
        &self,
        caster: &CombatProfile,
        target: &CombatProfile,
        skill: &SkillTemplate,
        shield: ShieldBlock,
    ) -> bool {
        let rate = Self::land_rate(caster, target, skill, shield);
        rand::thread_rng().gen_range(1..=100) <= rate
    }

    fn resolve_skill_reflect(&self, target: &CombatProfile, skill: &SkillTemplate) -> bool {
        skill.magic
            && target.reflect_rate > 0
            && rand::thread_rng().gen_range(1..=100) <= target.reflect_rate
    }
}

/// Drain resolution on top of the magic damage formula.
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardDrain;

impl DrainResolver for StandardDrain {
    fn resolve_drain(
        &self,
        caster: &CombatProfile,
        target: &CombatProfile,
        target_vitals: Vitals,
        skill: &SkillTemplate,
        formulas: &dyn CombatFormulas,
    ) -> DrainResult {
        let critical = formulas.roll_critical(caster, skill);
        let damage = formulas
            .compute_magic_damage(caster, target, skill, ShieldBlock::None, critical)
            .min(target_vitals.hp);
        let absorbed = u64::from(damage) * u64::from(skill.absorb_percent) / 100;
        DrainResult {
            damage,
            absorbed: absorbed as u32,
        }
    }
}
