use std::time::{Duration, Instant};

use tracing::{error, info};

use crate::aggregate::AggregateResult;
use crate::error::Result;
use crate::job::{Job, Strategy};
use crate::process::{self, WorkerCommand};
use crate::{pool, queue, series, threads};

/// Result of one strategy in a batch of runs.
#[derive(Debug)]
pub struct Outcome {
    pub strategy: Strategy,
    pub result: Result<AggregateResult>,
}

/// Times jobs; owns the program used to launch worker processes.
#[derive(Debug, Clone)]
pub struct Runner {
    worker_command: WorkerCommand,
}

impl Runner {
    pub fn new(worker_command: WorkerCommand) -> Self {
        Self { worker_command }
    }

    pub fn current_exe() -> Result<Self> {
        Ok(Self::new(WorkerCommand::current_exe()?))
    }

    pub fn run(&self, job: &Job) -> Result<AggregateResult> {
        job.validate()?;

        let now: Instant = Instant::now();
        let pi_approx: f64 = self.compute(job)?;
        let elapsed: Duration = now.elapsed();

        info!(
            strategy = job.strategy.name(),
            total = job.total_iterations,
            pi = pi_approx,
            elapsed = ?elapsed,
            "run finished"
        );
        Ok(AggregateResult::new(job.strategy, pi_approx, elapsed))
    }

    /// Runs every job in order; a failed job does not stop the ones after it.
    pub fn run_all(&self, jobs: &[Job]) -> Vec<Outcome> {
        let mut outcomes: Vec<Outcome> = Vec::with_capacity(jobs.len());
        for job in jobs {
            let result: Result<AggregateResult> = self.run(job);
            if let Err(run_error) = &result {
                error!(strategy = job.strategy.name(), error = %run_error, "run failed");
            }
            outcomes.push(Outcome {
                strategy: job.strategy,
                result,
            });
        }
        outcomes
    }

    fn compute(&self, job: &Job) -> Result<f64> {
        let total: u64 = job.total_iterations;
        let workers: usize = job.worker_count;
        let batch: u64 = job.batch_size;

        match job.strategy {
            Strategy::Serial => Ok(series::leibniz(total)),
            Strategy::SerialCheckpointed => Ok(series::leibniz_with_checkpoints(total, |_| {})),
            Strategy::FixedThreads => threads::run(total, workers, batch),
            Strategy::ProcessPool(mode) => {
                process::run(total, workers, batch, mode, &self.worker_command)
            }
            Strategy::ProducerConsumer => queue::run(total, workers, batch),
            Strategy::ThreadPool => pool::run(total, workers, batch),
        }
    }
}
