//! Parallel execution strategy

use crate::{
    error::{EngineError, Result},
    executor::{ExecutionMode, Executor},
    partition::{PartitionJob, PartitionOutput, PartitionPacker},
};
use rayon::prelude::*;

/// Parallel multi-threaded executor
///
/// Partitions are packed independently; each carries its own generator, so
/// the output matches a sequential run with the same seed.
#[derive(Debug, Clone, Default)]
pub struct ParallelExecutor {
    threads: Option<usize>,
}

impl ParallelExecutor {
    /// Create a parallel executor, using the global pool when `threads` is `None`
    pub fn new(threads: Option<usize>) -> Self {
        Self { threads }
    }

    /// Number of worker threads that will be used
    pub fn thread_count(&self) -> usize {
        self.threads.unwrap_or_else(num_cpus::get)
    }

    fn pack_all(
        jobs: &[PartitionJob<'_>],
        packer: &PartitionPacker<'_>,
    ) -> Vec<PartitionOutput> {
        // Indexed collect keeps job order.
        jobs.par_iter().map(|job| packer.pack(job)).collect()
    }
}

impl Executor for ParallelExecutor {
    fn run(
        &self,
        jobs: &[PartitionJob<'_>],
        packer: &PartitionPacker<'_>,
    ) -> Result<Vec<PartitionOutput>> {
        match self.threads {
            Some(threads) => {
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .build()
                    .map_err(|e| EngineError::ParallelError(e.to_string()))?;
                Ok(pool.install(|| Self::pack_all(jobs, packer)))
            }
            None => Ok(Self::pack_all(jobs, packer)),
        }
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Parallel
    }
}
