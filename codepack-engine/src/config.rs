//! Engine configuration and its builder

use crate::error::{EngineError, Result};
use crate::executor::ExecutionMode;
use codepack_core::{MaskingConfig, PackerConfig, TrimPolicy};

/// Default values for engine configuration
pub mod defaults {
    /// Base seed; partition `i` uses `SEED + i`
    pub const SEED: u64 = 12345;
    /// Number of passes over every document
    pub const DUPLICATE_FACTOR: usize = 1;
    /// Documents per partition
    pub const PARTITION_SIZE: usize = 256;
    /// Token cap for a single tokenized segment
    pub const MAX_SEGMENT_TOKENS: usize = 512;
    /// Separator between sentences in raw text
    pub const SEGMENT_SEPARATOR: char = '\n';
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Packing parameters
    pub packer: PackerConfig,
    /// Masking parameters, `None` disables masking
    pub masking: Option<MaskingConfig>,
    /// Number of passes over every document
    pub duplicate_factor: usize,
    /// Base seed for per-partition generators
    pub seed: u64,
    /// Execution mode selector
    pub execution_mode: ExecutionMode,
    /// Number of threads for parallel execution (None = auto)
    pub threads: Option<usize>,
    /// Documents per partition
    pub partition_size: usize,
    /// Token cap for a single tokenized segment
    pub max_segment_tokens: usize,
    /// Separator between sentences in raw text
    pub segment_separator: char,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            packer: PackerConfig::default(),
            masking: None,
            duplicate_factor: defaults::DUPLICATE_FACTOR,
            seed: defaults::SEED,
            execution_mode: ExecutionMode::Adaptive,
            threads: None,
            partition_size: defaults::PARTITION_SIZE,
            max_segment_tokens: defaults::MAX_SEGMENT_TOKENS,
            segment_separator: defaults::SEGMENT_SEPARATOR,
        }
    }
}

impl EngineConfig {
    /// Start building a configuration from defaults
    pub fn builder() -> EngineConfigBuilder {
        EngineConfigBuilder::new()
    }

    /// Check every parameter before any document is processed
    pub fn validate(&self) -> Result<()> {
        self.packer.validate()?;
        if let Some(masking) = &self.masking {
            masking.validate()?;
        }

        if self.duplicate_factor == 0 {
            return Err(EngineError::ConfigError(
                "duplicate_factor must be at least 1".to_string(),
            ));
        }
        if self.threads == Some(0) {
            return Err(EngineError::ConfigError(
                "threads must be at least 1".to_string(),
            ));
        }
        if self.partition_size == 0 {
            return Err(EngineError::ConfigError(
                "partition_size must be at least 1".to_string(),
            ));
        }
        if self.max_segment_tokens == 0 {
            return Err(EngineError::ConfigError(
                "max_segment_tokens must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Whether masked instances are produced
    pub fn masking_enabled(&self) -> bool {
        self.masking.is_some()
    }
}

/// Fluent builder for [`EngineConfig`]
#[derive(Debug, Clone, Default)]
pub struct EngineConfigBuilder {
    config: EngineConfig,
}

impl EngineConfigBuilder {
    /// Create a builder holding the default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the target sequence length
    pub fn target_seq_length(mut self, length: usize) -> Self {
        self.config.packer.target_seq_length = length;
        self
    }

    /// Set the short-sequence probability
    pub fn short_seq_prob(mut self, prob: f64) -> Self {
        self.config.packer.short_seq_prob = prob;
        self
    }

    /// Set the single-sequence trim policy
    pub fn trim_policy(mut self, policy: TrimPolicy) -> Self {
        self.config.packer.trim_policy = policy;
        self
    }

    /// Enable masking with the given ratio
    pub fn mask_ratio(mut self, ratio: f64) -> Self {
        self.config.masking = Some(MaskingConfig::new(ratio));
        self
    }

    /// Enable or disable masking, keeping any ratio already set
    pub fn masking(mut self, enabled: bool) -> Self {
        self.config.masking = if enabled {
            Some(self.config.masking.unwrap_or_default())
        } else {
            None
        };
        self
    }

    /// Set the duplicate factor
    pub fn duplicate_factor(mut self, factor: usize) -> Self {
        self.config.duplicate_factor = factor;
        self
    }

    /// Set the base seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the execution mode
    pub fn execution_mode(mut self, mode: ExecutionMode) -> Self {
        self.config.execution_mode = mode;
        self
    }

    /// Set the thread count
    pub fn threads(mut self, count: Option<usize>) -> Self {
        self.config.threads = count;
        self
    }

    /// Set the number of documents per partition
    pub fn partition_size(mut self, size: usize) -> Self {
        self.config.partition_size = size;
        self
    }

    /// Set the token cap for a single segment
    pub fn max_segment_tokens(mut self, max: usize) -> Self {
        self.config.max_segment_tokens = max;
        self
    }

    /// Set the sentence separator
    pub fn segment_separator(mut self, separator: char) -> Self {
        self.config.segment_separator = separator;
        self
    }

    /// Validate and return the configuration
    pub fn build(self) -> Result<EngineConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
