//! Configuration module
//!
//! The TOML file mirrors the engine configuration in four sections. Every
//! field has a default, so a partial file (or none at all) is valid.

use crate::error::CliError;
use anyhow::{Context, Result};
use codepack_engine::config::defaults;
use codepack_engine::{EngineConfig, ExecutionMode, TrimPolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// CLI configuration structure
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Default)]
pub struct CliConfig {
    /// Packing configuration
    #[serde(default)]
    pub packing: PackingConfig,

    /// Masking configuration
    #[serde(default)]
    pub masking: MaskingSection,

    /// Output configuration
    #[serde(default)]
    pub output: OutputConfig,

    /// Performance configuration
    #[serde(default)]
    pub performance: PerformanceConfig,
}

/// Packing-related configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PackingConfig {
    /// Maximum framed length of an instance
    pub target_seq_length: usize,
    /// Probability of keeping only the first description sentence
    pub short_seq_prob: f64,
    /// Number of passes over every document
    pub duplicate_factor: usize,
    /// Base random seed
    pub seed: u64,
    /// Trim from the back only instead of a random end
    pub deterministic_trim: bool,
    /// Token cap for a single tokenized segment
    pub max_segment_tokens: usize,
    /// Sentence separator in raw text
    pub segment_separator: char,
    /// Lowercase text before tokenizing; a `tokenizer.json` uses its own normalizer
    pub lowercase: bool,
}

impl Default for PackingConfig {
    fn default() -> Self {
        let engine = EngineConfig::default();
        Self {
            target_seq_length: engine.packer.target_seq_length,
            short_seq_prob: engine.packer.short_seq_prob,
            duplicate_factor: defaults::DUPLICATE_FACTOR,
            seed: defaults::SEED,
            deterministic_trim: false,
            max_segment_tokens: defaults::MAX_SEGMENT_TOKENS,
            segment_separator: defaults::SEGMENT_SEPARATOR,
            lowercase: true,
        }
    }
}

/// Masking-related configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct MaskingSection {
    /// Produce masked-LM instances
    pub enabled: bool,
    /// Fraction of framed positions to predict
    pub mask_ratio: f64,
}

impl Default for MaskingSection {
    fn default() -> Self {
        Self {
            enabled: false,
            mask_ratio: codepack_engine::MaskingConfig::default().mask_ratio,
        }
    }
}

/// Output-related configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output format: `jsonl` or `text`
    pub format: String,
    /// Length bin width; omitted disables binning
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_size: Option<usize>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: "jsonl".to_string(),
            bin_size: None,
        }
    }
}

/// Performance-related configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PerformanceConfig {
    /// Execution mode: `adaptive`, `sequential` or `parallel`
    pub execution_mode: String,
    /// Number of worker threads (0 = auto)
    pub worker_threads: usize,
    /// Documents per partition
    pub partition_size: usize,
}

impl Default for PerformanceConfig {
    fn default() -> Self {
        Self {
            execution_mode: "adaptive".to_string(),
            worker_threads: 0,
            partition_size: defaults::PARTITION_SIZE,
        }
    }
}

impl CliConfig {
    /// Load a configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Load `path` if given, otherwise the defaults
    pub fn load(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::from_file)
    }

    /// Parse the execution mode name
    pub fn execution_mode(&self) -> Result<ExecutionMode, CliError> {
        match self.performance.execution_mode.to_ascii_lowercase().as_str() {
            "adaptive" => Ok(ExecutionMode::Adaptive),
            "sequential" => Ok(ExecutionMode::Sequential),
            "parallel" => Ok(ExecutionMode::Parallel),
            other => Err(CliError::ConfigError(format!(
                "unknown execution mode '{other}'"
            ))),
        }
    }

    /// Build and validate the engine configuration
    pub fn to_engine_config(&self) -> Result<EngineConfig> {
        let trim_policy = if self.packing.deterministic_trim {
            TrimPolicy::Deterministic
        } else {
            TrimPolicy::Random
        };
        let threads = match self.performance.worker_threads {
            0 => None,
            n => Some(n),
        };

        let mut builder = EngineConfig::builder()
            .target_seq_length(self.packing.target_seq_length)
            .short_seq_prob(self.packing.short_seq_prob)
            .trim_policy(trim_policy)
            .duplicate_factor(self.packing.duplicate_factor)
            .seed(self.packing.seed)
            .max_segment_tokens(self.packing.max_segment_tokens)
            .segment_separator(self.packing.segment_separator)
            .execution_mode(self.execution_mode()?)
            .threads(threads)
            .partition_size(self.performance.partition_size);
        if self.masking.enabled {
            builder = builder.mask_ratio(self.masking.mask_ratio);
        }

        Ok(builder.build()?)
    }
}
