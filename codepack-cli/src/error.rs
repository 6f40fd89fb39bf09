//! Error handling for the CLI application

use std::fmt;

/// Custom error type for CLI-specific errors
#[derive(Debug)]
pub enum CliError {
    /// Invalid file pattern
    InvalidPattern(String),
    /// Configuration error
    ConfigError(String),
    /// Bin size incompatible with the target sequence length
    InvalidBinSize {
        /// Requested bin size
        bin_size: usize,
        /// Configured target sequence length
        target_seq_length: usize,
    },
    /// Binned output needs a directory to write bin files into
    MissingOutputDir,
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::InvalidPattern(pattern) => write!(f, "Invalid file pattern: {pattern}"),
            CliError::ConfigError(msg) => write!(f, "Configuration error: {msg}"),
            CliError::InvalidBinSize {
                bin_size,
                target_seq_length,
            } => write!(
                f,
                "Invalid bin size {bin_size}: must be at most and divide the target sequence length {target_seq_length}"
            ),
            CliError::MissingOutputDir => {
                write!(f, "Binned output requires --output pointing to a directory")
            }
        }
    }
}

impl std::error::Error for CliError {}

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, anyhow::Error>;
