//! Sequential execution strategy

use crate::{
    error::Result,
    executor::{ExecutionMode, Executor},
    partition::{PartitionJob, PartitionOutput, PartitionPacker},
};

/// Sequential single-threaded executor
#[derive(Debug, Clone, Default)]
pub struct SequentialExecutor;

impl Executor for SequentialExecutor {
    fn run(
        &self,
        jobs: &[PartitionJob<'_>],
        packer: &PartitionPacker<'_>,
    ) -> Result<Vec<PartitionOutput>> {
        Ok(jobs.iter().map(|job| packer.pack(job)).collect())
    }

    fn mode(&self) -> ExecutionMode {
        ExecutionMode::Sequential
    }
}
