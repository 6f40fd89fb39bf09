//! Packer and masking configuration

use crate::error::{CoreError, Result};

/// Default configuration constants
pub mod defaults {
    /// Target length of a framed instance, markers included
    pub const TARGET_SEQ_LENGTH: usize = 128;

    /// Probability of using only the first description sentence
    pub const SHORT_SEQ_PROB: f64 = 0.1;

    /// Fraction of framed tokens selected for prediction
    pub const MASKED_LM_RATIO: f64 = 0.15;

    /// Smallest target that still fits three markers and one body token
    pub const MIN_TARGET_SEQ_LENGTH: usize = 4;
}

/// Strategy used for every single-sequence trim in the packer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrimPolicy {
    /// Remove tokens from a randomly chosen end
    #[default]
    Random,
    /// Always remove tokens from the back
    Deterministic,
}

/// Document packer configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PackerConfig {
    /// Length of a framed instance, markers included
    pub target_seq_length: usize,
    /// Probability of pairing windows with only the first description sentence
    pub short_seq_prob: f64,
    /// Single-sequence trimming strategy
    pub trim_policy: TrimPolicy,
}

impl Default for PackerConfig {
    fn default() -> Self {
        Self {
            target_seq_length: defaults::TARGET_SEQ_LENGTH,
            short_seq_prob: defaults::SHORT_SEQ_PROB,
            trim_policy: TrimPolicy::default(),
        }
    }
}

impl PackerConfig {
    /// Create a configuration with the random trim policy
    pub fn new(target_seq_length: usize, short_seq_prob: f64) -> Self {
        Self {
            target_seq_length,
            short_seq_prob,
            trim_policy: TrimPolicy::Random,
        }
    }

    /// Replace the trim policy
    pub fn with_trim_policy(mut self, trim_policy: TrimPolicy) -> Self {
        self.trim_policy = trim_policy;
        self
    }

    /// Description budget: 64 tokens for long targets, 32 otherwise
    pub fn max_description_tokens(&self) -> usize {
        if self.target_seq_length >= 512 {
            64
        } else {
            32
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.target_seq_length < defaults::MIN_TARGET_SEQ_LENGTH {
            return Err(CoreError::InvalidConfig(format!(
                "target_seq_length must be at least {}, got {}",
                defaults::MIN_TARGET_SEQ_LENGTH,
                self.target_seq_length
            )));
        }

        if !(0.0..=1.0).contains(&self.short_seq_prob) {
            return Err(CoreError::InvalidConfig(format!(
                "short_seq_prob must be within [0, 1], got {}",
                self.short_seq_prob
            )));
        }

        Ok(())
    }
}

/// Masked-LM configuration
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaskingConfig {
    /// Fraction of framed tokens selected for prediction
    pub mask_ratio: f64,
}

impl Default for MaskingConfig {
    fn default() -> Self {
        Self {
            mask_ratio: defaults::MASKED_LM_RATIO,
        }
    }
}

impl MaskingConfig {
    /// Create a masking configuration
    pub fn new(mask_ratio: f64) -> Self {
        Self { mask_ratio }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.mask_ratio) {
            return Err(CoreError::InvalidConfig(format!(
                "mask_ratio must be within [0, 1], got {}",
                self.mask_ratio
            )));
        }
        Ok(())
    }
}
