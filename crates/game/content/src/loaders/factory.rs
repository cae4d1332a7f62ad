//! Content factory for loading every table from a data directory.

use std::path::{Path, PathBuf};

use cast_core::{CastConfig, CompanionTemplate, SkillTemplate};

use crate::loaders::{CompanionLoader, ConfigLoader, LoadResult, SkillLoader};

/// Skill and companion tables, checked against each other.
#[derive(Debug, Clone)]
pub struct Content {
    pub skills: Vec<SkillTemplate>,
    pub companions: Vec<CompanionTemplate>,
}

impl Content {
    /// Pairs the two tables, failing if a companion casts an unknown skill.
    pub fn new(skills: Vec<SkillTemplate>, companions: Vec<CompanionTemplate>) -> LoadResult<Self> {
        CompanionLoader::check_skills(&companions, &skills)?;
        Ok(Self { skills, companions })
    }
}

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// ├── skills.ron
/// └── companions.ron
/// ```
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load casting configuration from `config.toml`.
    pub fn load_config(&self) -> LoadResult<CastConfig> {
        ConfigLoader::load(&self.data_dir.join("config.toml"))
    }

    /// Load the skill table from `skills.ron`.
    pub fn load_skills(&self) -> LoadResult<Vec<SkillTemplate>> {
        SkillLoader::load(&self.data_dir.join("skills.ron"))
    }

    /// Load companion kinds from `companions.ron`.
    pub fn load_companions(&self) -> LoadResult<Vec<CompanionTemplate>> {
        CompanionLoader::load(&self.data_dir.join("companions.ron"))
    }

    /// Load both tables and check them against each other.
    pub fn load_content(&self) -> LoadResult<Content> {
        Content::new(self.load_skills()?, self.load_companions()?)
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}
