//! Layered error types
//!
//! Core failures are wrapped, collaborator failures (I/O, malformed
//! records, tokenizer setup) get their own variants.

use codepack_core::CoreError;
use thiserror::Error;

/// Engine-level errors
#[derive(Error, Debug)]
pub enum EngineError {
    /// Core packing or masking error
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Configuration error
    #[error("invalid configuration: {0}")]
    ConfigError(String),

    /// I/O error
    #[error("I/O error: {0}")]
    IoError(String),

    /// Malformed corpus record
    #[error("parse error at line {line}: {reason}")]
    ParseError {
        /// 1-based line number of the offending record
        line: usize,
        /// What was wrong with it
        reason: String,
    },

    /// Tokenizer setup failed
    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    /// Parallel execution error
    #[cfg(feature = "parallel")]
    #[error("parallel execution failed: {0}")]
    ParallelError(String),
}

impl From<std::io::Error> for EngineError {
    fn from(err: std::io::Error) -> Self {
        EngineError::IoError(err.to_string())
    }
}

impl From<serde_json::Error> for EngineError {
    fn from(err: serde_json::Error) -> Self {
        EngineError::ParseError {
            line: err.line(),
            reason: err.to_string(),
        }
    }
}

/// Result type for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;
