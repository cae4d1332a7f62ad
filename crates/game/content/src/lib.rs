//! Data-driven content definitions and loaders.
//!
//! This crate houses the static tables the casting runtime reads through its
//! oracles:
//! - Skill templates (data-driven via RON)
//! - Companion kinds (data-driven via RON)
//! - Casting configuration (data-driven via TOML)
//!
//! The tables shipped in `data/` are embedded at build time and available
//! through [`builtin`]; [`ContentFactory`] reads the same files from disk.

#[cfg(feature = "loaders")]
pub mod builtin;
#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{CompanionLoader, ConfigLoader, Content, ContentFactory, SkillLoader};
