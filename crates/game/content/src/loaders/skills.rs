//! Skill table loader.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use cast_core::{SkillFamilyId, SkillId, SkillRef, SkillTemplate};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Skill table structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkillCatalog {
    pub skills: Vec<SkillTemplate>,
}

/// Loader for skill templates from RON files.
pub struct SkillLoader;

impl SkillLoader {
    /// Load the skill table from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<SkillTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid skill table {}: {}", path.display(), e))
    }

    /// Parse and check a skill table.
    ///
    /// Rejects duplicate `(id, level)` pairs and levels of one skill that
    /// disagree on their cooldown family.
    pub fn parse(content: &str) -> LoadResult<Vec<SkillTemplate>> {
        let catalog: SkillCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse skill table RON: {}", e))?;

        let mut seen: HashSet<SkillRef> = HashSet::new();
        let mut families: HashMap<SkillId, SkillFamilyId> = HashMap::new();
        for skill in &catalog.skills {
            let skill_ref = skill.skill_ref();
            if !seen.insert(skill_ref) {
                anyhow::bail!("duplicate skill {}", skill_ref);
            }
            let family = *families.entry(skill.id).or_insert(skill.family);
            if family != skill.family {
                anyhow::bail!(
                    "skill {} is in {} but an earlier level is in {}",
                    skill_ref,
                    skill.family,
                    family
                );
            }
        }

        Ok(catalog.skills)
    }
}

#[cfg(test)]
mod tests {
    use cast_core::{DisableKind, EffectKind, SkillCategory, TargetCategory};

    use super::*;

    const TABLE: &str = r#"#![enable(implicit_some, unwrap_newtypes)]
        (
            skills: [
                (
                    id: 1177, level: 1, family: 1177, name: "Wind Strike",
                    category: MagicDamage, target: Explicit, offensive: true, magic: true,
                    cast_range: 600, cast_time_ms: 1000, reuse_ms: 5000, power: 12,
                ),
                (
                    id: 100, level: 1, family: 100, name: "Stun Strike",
                    category: Disable(Stun), target: Explicit, offensive: true,
                    cast_range: 40, cast_time_ms: 0, reuse_ms: 10000,
                    effect: (kind: Stun, duration_ms: 3000),
                ),
            ],
        )
    "#;

    #[test]
    fn parses_templates_with_defaults() {
        let skills = SkillLoader::parse(TABLE).unwrap();
        assert_eq!(skills.len(), 2);

        let bolt = &skills[0];
        assert_eq!(bolt.skill_ref(), SkillRef::new(1177, 1));
        assert_eq!(bolt.category, SkillCategory::MagicDamage);
        assert_eq!(bolt.land_rate, SkillTemplate::DEFAULT_LAND_RATE);
        assert!(bolt.effect.is_none());

        let stun = &skills[1];
        assert_eq!(stun.category, SkillCategory::Disable(DisableKind::Stun));
        assert_eq!(stun.target, TargetCategory::Explicit);
        assert!(!stun.magic);
        let effect = stun.effect.unwrap();
        assert_eq!(effect.kind, EffectKind::Stun);
        assert_eq!(effect.duration_ms, 3_000);
        assert!(!effect.persistent);
    }

    #[test]
    fn rejects_duplicate_levels() {
        let table = r#"#![enable(unwrap_newtypes)]
            (skills: [
                (id: 1, level: 1, family: 1, name: "a", category: Heal, target: Explicit,
                 offensive: false, cast_range: 600, cast_time_ms: 0, reuse_ms: 0),
                (id: 1, level: 1, family: 1, name: "a", category: Heal, target: Explicit,
                 offensive: false, cast_range: 600, cast_time_ms: 0, reuse_ms: 0),
            ])
        "#;
        let err = SkillLoader::parse(table).unwrap_err();
        assert!(err.to_string().contains("duplicate skill 1:1"));
    }

    #[test]
    fn rejects_split_families() {
        let table = r#"#![enable(unwrap_newtypes)]
            (skills: [
                (id: 1, level: 1, family: 1, name: "a", category: Heal, target: Explicit,
                 offensive: false, cast_range: 600, cast_time_ms: 0, reuse_ms: 0),
                (id: 1, level: 2, family: 9, name: "a", category: Heal, target: Explicit,
                 offensive: false, cast_range: 600, cast_time_ms: 0, reuse_ms: 0),
            ])
        "#;
        assert!(SkillLoader::parse(table).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(SkillLoader::load(&dir.path().join("skills.ron")).is_err());
    }
}
