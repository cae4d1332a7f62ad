//! Tables compiled into the binary from `data/`.

use cast_core::CastConfig;

use crate::loaders::{CompanionLoader, ConfigLoader, Content, LoadResult, SkillLoader};

pub const SKILLS_RON: &str = include_str!("../data/skills.ron");
pub const COMPANIONS_RON: &str = include_str!("../data/companions.ron");
pub const CONFIG_TOML: &str = include_str!("../data/config.toml");

/// The shipped skill and companion tables.
pub fn content() -> LoadResult<Content> {
    Content::new(
        SkillLoader::parse(SKILLS_RON)?,
        CompanionLoader::parse(COMPANIONS_RON)?,
    )
}

/// The shipped configuration.
pub fn config() -> LoadResult<CastConfig> {
    ConfigLoader::parse(CONFIG_TOML)
}

#[cfg(test)]
mod tests {
    use cast_core::{CompanionKindId, SkillCategory, SkillRef};

    use super::*;

    #[test]
    fn shipped_tables_are_consistent() {
        let content = content().unwrap();
        assert_eq!(content.companions.len(), 5);

        let levels: Vec<_> = content
            .skills
            .iter()
            .filter(|skill| skill.id.0 == 1177)
            .map(|skill| skill.level.0)
            .collect();
        assert_eq!(levels, vec![1, 2]);
    }

    #[test]
    fn life_cubic_heals_and_starts_on_its_own() {
        let content = content().unwrap();
        let life = content
            .companions
            .iter()
            .find(|c| c.kind == CompanionKindId(3))
            .unwrap();
        assert!(life.auto_activate);
        assert!(!life.requires_stance);

        let mend = content
            .skills
            .iter()
            .find(|s| s.skill_ref() == SkillRef::new(4051, 1))
            .unwrap();
        assert_eq!(mend.category, SkillCategory::Heal);
        assert!(!mend.offensive);
    }

    #[test]
    fn shipped_config_is_the_default() {
        assert_eq!(config().unwrap(), CastConfig::default());
    }
}
