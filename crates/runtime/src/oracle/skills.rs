//! Skill table oracle implementation.

use std::collections::HashMap;

use cast_core::{SkillFamilyId, SkillId, SkillOracle, SkillRef, SkillTemplate};

/// Runtime implementation of SkillOracle backed by an immutable table.
#[derive(Debug, Clone, Default)]
pub struct SkillOracleImpl {
    skills: HashMap<SkillRef, SkillTemplate>,
    /// Family of every known skill id, whatever the level.
    families: HashMap<SkillId, SkillFamilyId>,
}

impl SkillOracleImpl {
    pub fn new(templates: impl IntoIterator<Item = SkillTemplate>) -> Self {
        let mut skills = HashMap::new();
        let mut families = HashMap::new();
        for template in templates {
            families.insert(template.id, template.family);
            skills.insert(template.skill_ref(), template);
        }
        Self { skills, families }
    }

    pub fn len(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }
}

impl SkillOracle for SkillOracleImpl {
    fn skill(&self, skill: SkillRef) -> Option<&SkillTemplate> {
        self.skills.get(&skill)
    }

    fn family(&self, skill: SkillRef) -> SkillFamilyId {
        self.families
            .get(&skill.id)
            .copied()
            .unwrap_or(SkillFamilyId(skill.id.0))
    }
}

#[cfg(test)]
mod tests {
    use cast_core::SkillCategory;

    use super::*;

    #[test]
    fn family_is_known_for_unlisted_levels() {
        let oracle = SkillOracleImpl::new([SkillTemplate::new(
            SkillRef::new(1177, 1),
            "Wind Strike",
            SkillCategory::MagicDamage,
        )
        .with_family(SkillFamilyId(11))]);

        assert_eq!(oracle.family(SkillRef::new(1177, 5)), SkillFamilyId(11));
        assert_eq!(oracle.family(SkillRef::new(4, 1)), SkillFamilyId(4));
        assert!(oracle.skill(SkillRef::new(1177, 5)).is_none());
    }
}
