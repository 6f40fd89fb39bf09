//! Corpus orchestration for code pretraining data
//!
//! This crate sits between raw corpus records and the packing core: it
//! tokenizes records into [`CodePair`]s, splits the corpus into partitions
//! with independently seeded generators, and packs them sequentially or in
//! parallel.
//!
//! # Example
//!
//! ```rust
//! use codepack_engine::{CodePairBuilder, EngineConfig, Pipeline, RawRecord, WordPieceTokenizer};
//!
//! let tokenizer = WordPieceTokenizer::new(["[UNK]", "return", "a", "+", "b"], true).unwrap();
//! let config = EngineConfig::builder().target_seq_length(16).build().unwrap();
//!
//! let record = RawRecord::new("python_0", "", "return a + b");
//! let pairs = CodePairBuilder::from_config(&tokenizer, &config).build_all(&[record]).unwrap();
//!
//! let output = Pipeline::new(config).unwrap().run(&pairs).unwrap();
//! assert_eq!(output.instances.len(), 1);
//! assert_eq!(output.instances[0].num_tokens(), 6);
//! ```

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod executor;
pub mod partition;
pub mod pipeline;
pub mod reader;
pub mod tokenizer;

// Re-export key types
pub use config::{EngineConfig, EngineConfigBuilder};
pub use error::{EngineError, Result};
pub use executor::{ExecutionMode, Executor};
pub use partition::Instance;
pub use pipeline::{PackOutput, PackingStats, Pipeline};
pub use reader::{read_records, split_segments, CodePairBuilder, RawRecord};
pub use tokenizer::{load_tokenizer, PretrainedTokenizer, Tokenizer, WordPieceTokenizer};

// Re-export from core for convenience
pub use codepack_core::{
    CodePair, Document, MaskedInstance, MaskingConfig, PackerConfig, TrainingInstance, TrimPolicy,
};
