//! Common error infrastructure for cast-core.
//!
//! This module provides the shared severity classification.
//! Domain errors (e.g. [`crate::cast::CastError`]) are defined next to the
//! operations that produce them.
//!
//! # Design Principles
//!
//! - **Type Safety**: each failure surface has its own enum with specific variants
//! - **Severity Classification**: errors are categorized for recovery strategies
//! - **No panics across the request boundary**: every rejection is a value

/// Severity level of an error, used for categorization and recovery strategies.
///
/// - **Recoverable**: temporary conditions; the same request may succeed later
/// - **Validation**: invalid input that should be rejected without retry
/// - **Internal**: unexpected state inconsistencies that require investigation
/// - **Fatal**: unrecoverable errors indicating corrupted state
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: skill on cooldown, not enough MP.
    Recoverable,

    /// Examples: target out of range, not a hostile target.
    Validation,

    /// Examples: template missing for a learned skill.
    Internal,

    /// Examples: missing required capability.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error is potentially recoverable.
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }
}

/// Common trait for all cast-core errors.
///
/// # Implementation Guidelines
///
/// - All error enums should implement this trait
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    /// Returns the severity level of this error.
    fn severity(&self) -> ErrorSeverity;

    /// Returns a static string identifier for this error variant.
    ///
    /// Stable across releases; used for metrics and client-side message lookup.
    fn error_code(&self) -> &'static str {
        core::any::type_name::<Self>()
    }
}
