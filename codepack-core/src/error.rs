//! Core error types (deterministic only)

use thiserror::Error;

/// Core packing and masking errors (no I/O, no external failures)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A configuration value is out of range
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Masking needs at least one vocabulary token to substitute with
    #[error("vocabulary is empty; random token substitution needs at least one token")]
    EmptyVocabulary,

    /// The selected description leaves no room for a body token
    #[error(
        "document '{id}': description of {description_tokens} tokens leaves no body budget \
         (max body tokens {max_body_tokens})"
    )]
    BodyBudgetExhausted {
        /// Identifier of the offending document
        id: String,
        /// Length of the selected description
        description_tokens: usize,
        /// Token budget shared by description and body
        max_body_tokens: usize,
    },
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
