//! Partition driver
//!
//! Splits the corpus into partitions, packs them with the configured
//! executor and concatenates the outputs in partition order.

use crate::{
    config::EngineConfig,
    error::{EngineError, Result},
    executor::{auto_select, ExecutionMode, Executor, SequentialExecutor},
    partition::{partition, Instance, PartitionPacker},
    tokenizer::Tokenizer,
};
use codepack_core::masking::{Masker, Vocabulary};
use codepack_core::{CodePair, DocumentPacker};
use log::info;
use std::time::{Duration, Instant};

#[cfg(feature = "parallel")]
use crate::executor::ParallelExecutor;

/// Statistics of one packing run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackingStats {
    /// Documents given to the run
    pub documents: usize,
    /// Packing attempts skipped for lack of body budget
    pub skipped_documents: usize,
    /// Instances emitted
    pub instances: usize,
    /// Sum of `num_tokens` over all instances
    pub total_tokens: usize,
    /// Number of partitions
    pub partitions: usize,
    /// Wall-clock packing time
    pub elapsed: Duration,
}

impl PackingStats {
    /// Mean framed length, or zero without instances
    pub fn mean_tokens(&self) -> f64 {
        if self.instances == 0 {
            0.0
        } else {
            self.total_tokens as f64 / self.instances as f64
        }
    }
}

/// Instances of a run plus its statistics
#[derive(Debug, Clone)]
pub struct PackOutput {
    /// Instances in partition order, shuffled within each partition
    pub instances: Vec<Instance>,
    /// Run statistics
    pub stats: PackingStats,
    /// Execution mode actually used
    pub mode: ExecutionMode,
}

/// Packing pipeline over an in-memory corpus
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: EngineConfig,
    vocabulary: Option<Vocabulary>,
}

impl Pipeline {
    /// Create a pipeline without masking vocabulary
    ///
    /// Fails when the configuration enables masking, since masking needs a
    /// vocabulary to sample substitutes from.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        if config.masking_enabled() {
            return Err(EngineError::ConfigError(
                "masking is enabled but no vocabulary was provided".to_string(),
            ));
        }
        Ok(Self {
            config,
            vocabulary: None,
        })
    }

    /// Create a pipeline with a substitution vocabulary
    pub fn with_vocabulary(config: EngineConfig, tokens: Vec<String>) -> Result<Self> {
        config.validate()?;
        let vocabulary = Vocabulary::new(tokens)?;
        Ok(Self {
            config,
            vocabulary: Some(vocabulary),
        })
    }

    /// Create a pipeline whose vocabulary comes from `tokenizer`
    pub fn from_tokenizer(config: EngineConfig, tokenizer: &dyn Tokenizer) -> Result<Self> {
        if config.masking_enabled() {
            Self::with_vocabulary(config, tokenizer.vocabulary())
        } else {
            Self::new(config)
        }
    }

    /// The pipeline configuration
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Pack every document
    pub fn run(&self, pairs: &[CodePair]) -> Result<PackOutput> {
        let start = Instant::now();
        let packer = DocumentPacker::new(self.config.packer.clone())?;
        let masker = match (&self.config.masking, &self.vocabulary) {
            (Some(masking), Some(vocabulary)) => Some(Masker::new(*masking, vocabulary)?),
            (Some(_), None) => {
                return Err(EngineError::ConfigError(
                    "masking is enabled but no vocabulary was provided".to_string(),
                ))
            }
            (None, _) => None,
        };
        let partition_packer =
            PartitionPacker::new(packer, masker, self.config.duplicate_factor, self.config.seed);

        let jobs = partition(pairs, self.config.partition_size);
        let mode = match self.config.execution_mode {
            ExecutionMode::Adaptive => auto_select(jobs.len()),
            mode => mode,
        };
        info!(
            "Packing {} documents in {} partitions ({:?})",
            pairs.len(),
            jobs.len(),
            mode
        );

        let executor = self.executor(mode);
        let outputs = executor.run(&jobs, &partition_packer)?;

        let mut stats = PackingStats {
            documents: pairs.len(),
            partitions: jobs.len(),
            ..Default::default()
        };
        let mut instances = Vec::new();
        for output in outputs {
            stats.skipped_documents += output.skipped_documents;
            instances.extend(output.instances);
        }
        stats.instances = instances.len();
        stats.total_tokens = instances.iter().map(Instance::num_tokens).sum();
        stats.elapsed = start.elapsed();

        info!(
            "Packed {} instances ({} tokens, {} skipped) in {:.2?}",
            stats.instances, stats.total_tokens, stats.skipped_documents, stats.elapsed
        );

        Ok(PackOutput {
            instances,
            stats,
            mode: executor.mode(),
        })
    }

    fn executor(&self, mode: ExecutionMode) -> Box<dyn Executor> {
        match mode {
            #[cfg(feature = "parallel")]
            ExecutionMode::Parallel => Box::new(ParallelExecutor::new(self.config.threads)),
            _ => Box::new(SequentialExecutor),
        }
    }
}
