use std::fmt;

use crate::error::{Error, Result};
use crate::series::MAX_ITERATIONS;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProcessMode {
    /// One process per worker-count range.
    Static,
    /// Long-lived processes pulling batch ranges from a shared queue.
    Dynamic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    Serial,
    SerialCheckpointed,
    FixedThreads,
    ProcessPool(ProcessMode),
    ProducerConsumer,
    ThreadPool,
}

impl Strategy {
    pub fn name(&self) -> &'static str {
        match self {
            Strategy::Serial => "Leibniz",
            Strategy::SerialCheckpointed => "Leibniz-Power(10)",
            Strategy::FixedThreads => "Fixed-Threads",
            Strategy::ProcessPool(ProcessMode::Static) => "Process-Pool",
            Strategy::ProcessPool(ProcessMode::Dynamic) => "Process-Pool (dynamic)",
            Strategy::ProducerConsumer => "Producer-Consumer",
            Strategy::ThreadPool => "Thread-Pool",
        }
    }

    /// Whether two runs with the same job produce bit-identical results.
    pub fn is_reproducible(&self) -> bool {
        !matches!(self, Strategy::ProducerConsumer)
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Job {
    pub total_iterations: u64,
    pub worker_count: usize,
    pub batch_size: u64,
    pub strategy: Strategy,
}

impl Job {
    pub fn new(
        total_iterations: u64,
        worker_count: usize,
        batch_size: u64,
        strategy: Strategy,
    ) -> Result<Self> {
        let job: Job = Job {
            total_iterations,
            worker_count,
            batch_size,
            strategy,
        };
        job.validate()?;
        Ok(job)
    }

    pub fn validate(&self) -> Result<()> {
        if self.total_iterations == 0 {
            return Err(Error::invalid_config("total_iterations", "must be at least 1"));
        }
        if self.total_iterations > MAX_ITERATIONS {
            return Err(Error::invalid_config("total_iterations", "must not exceed 2^63 - 1"));
        }
        if self.worker_count == 0 {
            return Err(Error::invalid_config("worker_count", "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(Error::invalid_config("batch_size", "must be at least 1"));
        }
        Ok(())
    }
}
