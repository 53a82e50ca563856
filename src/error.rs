//! Custom error types for todoseq.
//!
//! Validation problems in keyword or transition configuration are *not*
//! errors: they are reported through [`KeywordValidationResult`] and
//! [`TransitionError`] so the engine always stays usable. This enum covers
//! the remaining failures: reading and decoding settings files, unknown
//! language names that were requested explicitly, and regex compilation of
//! fragment patterns.
//!
//! [`KeywordValidationResult`]: crate::keywords::KeywordValidationResult
//! [`TransitionError`]: crate::transitions::TransitionError

use thiserror::Error;

/// Main error type for todoseq operations
#[derive(Error, Debug)]
pub enum TodoseqError {
    // =========================================================================
    // Language / Pattern Errors
    // =========================================================================
    /// A language was requested by name but is not registered
    #[error("Unknown language: '{name}'")]
    UnknownLanguage { name: String },

    /// A composed or fragment pattern failed to compile
    #[error("Pattern error in {context}: {source}")]
    Pattern {
        context: String,
        #[source]
        source: regex::Error,
    },

    // =========================================================================
    // Wrapped Errors
    // =========================================================================
    /// IO error wrapper
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Malformed JSON settings
    #[error("Invalid settings: {0}")]
    Json(#[from] serde_json::Error),

    /// Malformed TOML settings
    #[error("Invalid settings: {0}")]
    Toml(#[from] toml::de::Error),
}

impl TodoseqError {
    /// Create an unknown language error
    pub fn unknown_language(name: impl Into<String>) -> Self {
        Self::UnknownLanguage { name: name.into() }
    }

    /// Create a pattern compilation error
    pub fn pattern(context: impl Into<String>, source: regex::Error) -> Self {
        Self::Pattern {
            context: context.into(),
            source,
        }
    }
}

/// Result type alias for todoseq operations
pub type Result<T> = std::result::Result<T, TodoseqError>;
