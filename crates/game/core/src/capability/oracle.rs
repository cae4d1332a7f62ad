use crate::companion::{CompanionKindId, CompanionTemplate};
use crate::skill::{SkillFamilyId, SkillRef, SkillTemplate};

/// Read-only skill tables.
pub trait SkillOracle: Send + Sync {
    fn skill(&self, skill: SkillRef) -> Option<&SkillTemplate>;

    /// Cooldown family of a skill. Unknown skills form their own family so a
    /// stale persisted record still maps somewhere stable.
    fn family(&self, skill: SkillRef) -> SkillFamilyId {
        self.skill(skill)
            .map(|template| template.family)
            .unwrap_or(SkillFamilyId(skill.id.0))
    }
}

/// Read-only companion kind definitions.
pub trait CompanionOracle: Send + Sync {
    fn companion(&self, kind: CompanionKindId) -> Option<&CompanionTemplate>;
}
