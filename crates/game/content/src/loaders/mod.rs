//! Content loaders for reading game data from files.
//!
//! Every loader has a `load` that reads a path and a `parse` that takes the
//! file contents, so embedded tables and files on disk share one code path.

pub mod companions;
pub mod config;
pub mod factory;
pub mod skills;

pub use companions::CompanionLoader;
pub use config::ConfigLoader;
pub use factory::{Content, ContentFactory};
pub use skills::SkillLoader;

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
