//! Execution strategies for partition packing

use crate::error::Result;
use crate::partition::{PartitionJob, PartitionOutput, PartitionPacker};

#[cfg(feature = "parallel")]
pub mod parallel;
pub mod sequential;

#[cfg(feature = "parallel")]
pub use parallel::ParallelExecutor;
pub use sequential::SequentialExecutor;

/// Execution mode selector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Single-threaded sequential processing
    Sequential,
    /// Multi-threaded parallel processing
    Parallel,
    /// Parallel when there is more than one partition
    #[default]
    Adaptive,
}

/// Trait for execution strategies
///
/// Implementations must return outputs in job order.
pub trait Executor: Send + Sync {
    /// Pack every job
    fn run(&self, jobs: &[PartitionJob<'_>], packer: &PartitionPacker<'_>)
        -> Result<Vec<PartitionOutput>>;

    /// Get the execution mode
    fn mode(&self) -> ExecutionMode;
}

/// Resolve the adaptive mode for a given number of partitions
pub fn auto_select(partitions: usize) -> ExecutionMode {
    if partitions <= 1 {
        return ExecutionMode::Sequential;
    }

    #[cfg(feature = "parallel")]
    return ExecutionMode::Parallel;

    #[cfg(not(feature = "parallel"))]
    ExecutionMode::Sequential
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_select() {
        assert_eq!(auto_select(0), ExecutionMode::Sequential);
        assert_eq!(auto_select(1), ExecutionMode::Sequential);

        #[cfg(feature = "parallel")]
        assert_eq!(auto_select(2), ExecutionMode::Parallel);
        #[cfg(not(feature = "parallel"))]
        assert_eq!(auto_select(2), ExecutionMode::Sequential);
    }
}
