use crate::skill::SkillTemplate;
use crate::state::{CombatProfile, Vitals};

/// Outcome of a shield block check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum ShieldBlock {
    #[default]
    None,
    /// Partial block: damage and land chance reduced.
    Block,
    /// Perfect block: the skill does nothing.
    Perfect,
}

/// Numeric combat formulas.
///
/// The tables behind these numbers belong to the wider server; the rules only
/// decide *which* formula runs and what happens with the result.
pub trait CombatFormulas: Send + Sync {
    fn roll_critical(&self, caster: &CombatProfile, skill: &SkillTemplate) -> bool;

    fn resolve_shield_block(&self, target: &CombatProfile, skill: &SkillTemplate) -> ShieldBlock;

    fn compute_magic_damage(
        &self,
        caster: &CombatProfile,
        target: &CombatProfile,
        skill: &SkillTemplate,
        shield: ShieldBlock,
        critical: bool,
    ) -> u32;

    /// Land roll for disables, debuffs and secondary effects. Charged shots
    /// on the caster raise the chance.
    fn roll_skill_success(
        &self,
        caster: &CombatProfile,
        target: &CombatProfile,
        skill: &SkillTemplate,
        shield: ShieldBlock,
    ) -> bool;

    /// The target bounces the skill back; the skill deals no damage.
    fn resolve_skill_reflect(&self, target: &CombatProfile, skill: &SkillTemplate) -> bool;
}

/// Result of a drain resolution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DrainResult {
    pub damage: u32,
    /// HP returned to the caster.
    pub absorbed: u32,
}

/// Resolves drain skills.
pub trait DrainResolver: Send + Sync {
    fn resolve_drain(
        &self,
        caster: &CombatProfile,
        target: &CombatProfile,
        target_vitals: Vitals,
        skill: &SkillTemplate,
        formulas: &dyn CombatFormulas,
    ) -> DrainResult;
}
