//! Companion kind loader.

use std::collections::HashSet;
use std::path::Path;

use cast_core::{CompanionTemplate, SkillTemplate};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Companion kind table structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanionCatalog {
    pub companions: Vec<CompanionTemplate>,
}

/// Loader for companion kinds from RON files.
pub struct CompanionLoader;

impl CompanionLoader {
    /// Load companion kinds from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<CompanionTemplate>> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid companion table {}: {}", path.display(), e))
    }

    /// Parse and check companion kinds on their own.
    pub fn parse(content: &str) -> LoadResult<Vec<CompanionTemplate>> {
        let catalog: CompanionCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse companion table RON: {}", e))?;

        let mut kinds = HashSet::new();
        for companion in &catalog.companions {
            let kind = companion.kind.0;
            if !kinds.insert(kind) {
                anyhow::bail!("duplicate companion kind {}", kind);
            }
            if companion.period_ms == 0 {
                anyhow::bail!("companion kind {} has a zero period", kind);
            }
            if companion.chance_percent > 100 {
                anyhow::bail!(
                    "companion kind {} acts with {}% chance",
                    kind,
                    companion.chance_percent
                );
            }
            if companion.skills.is_empty() {
                anyhow::bail!("companion kind {} has no skills", kind);
            }
        }

        Ok(catalog.companions)
    }

    /// Every skill a companion may cast must exist in the skill table.
    pub fn check_skills(
        companions: &[CompanionTemplate],
        skills: &[SkillTemplate],
    ) -> LoadResult<()> {
        let known: HashSet<_> = skills.iter().map(SkillTemplate::skill_ref).collect();
        for companion in companions {
            if let Some(missing) = companion.skills.iter().find(|s| !known.contains(*s)) {
                anyhow::bail!(
                    "companion kind {} ({}) uses unknown skill {}",
                    companion.kind.0,
                    companion.name,
                    missing
                );
            }
        }
        Ok(())
    }
}
