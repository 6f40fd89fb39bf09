//! Document packing and masking for masked-language-model pretraining
//!
//! This crate turns a tokenized [`CodePair`] (a function body plus an
//! optional natural-language description) into fixed-length training
//! instances, and optionally into masked-LM examples.
//!
//! # Architecture
//!
//! - [`token`]: the continuation-fragment predicate and framing markers
//! - [`types`]: immutable sentence/document containers and packer outputs
//! - [`truncate`]: random and subword-boundary-safe trimming strategies
//! - [`packer`]: the sliding-window document packer
//! - [`masking`]: masked-LM position selection and substitution
//!
//! All randomness is drawn from a caller-supplied [`rand::Rng`], so a worker
//! that seeds its own generator gets reproducible chunk boundaries.
//!
//! # Example
//!
//! ```rust
//! use codepack_core::{CodePair, Document, DocumentPacker, PackerConfig};
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let body = Document::from_token_lists(vec![
//!     vec!["def", "add", "(", "a", ",", "b", ")", ":"],
//!     vec!["return", "a", "+", "b"],
//! ]);
//! let pair = CodePair::new("python_0", body, Document::empty());
//!
//! let packer = DocumentPacker::new(PackerConfig::default()).unwrap();
//! let mut rng = StdRng::seed_from_u64(12345);
//! let instances = packer.pack(&pair, &mut rng).unwrap();
//!
//! assert_eq!(instances.len(), 1);
//! assert_eq!(instances[0].num_tokens, 12 + 2);
//! ```

pub mod config;
pub mod error;
pub mod masking;
pub mod packer;
pub mod token;
pub mod truncate;
pub mod types;

pub use config::{MaskingConfig, PackerConfig, TrimPolicy};
pub use error::{CoreError, Result};
pub use masking::{Masker, Vocabulary};
pub use packer::DocumentPacker;
pub use token::{is_continuation, Token};
pub use types::{CodePair, Document, MaskedInstance, Sentence, TrainingInstance};
