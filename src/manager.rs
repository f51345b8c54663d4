use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tracing::debug;

use crate::channel::TaskQueue;
use crate::error::{Error, Result};
use crate::iterator::ResultIter;
use crate::status::ManagerStatus;
use crate::worker::{Job, JobOutcome, ThreadWorker};

/// Bounded pool of worker threads running `FnOnce() -> T` jobs.
///
/// Jobs are numbered in submission order. [`ThreadManager::join`] waits for
/// every job and returns the results in that order, independent of which
/// worker finished first.
pub struct ThreadManager<T>
where
    T: Send + 'static,
{
    jobs: Arc<TaskQueue<(usize, Job<T>)>>,
    results: Arc<TaskQueue<JobOutcome<T>>>,
    workers: Vec<ThreadWorker<T>>,
    status: Arc<ManagerStatus>,
    dispatched: AtomicUsize,
    terminated: bool,
}

impl<T> ThreadManager<T>
where
    T: Send + 'static,
{
    pub fn new(size: usize) -> Result<Self> {
        if size == 0 {
            return Err(Error::invalid_config("pool size", "must be at least 1"));
        }

        let jobs: Arc<TaskQueue<(usize, Job<T>)>> = Arc::new(TaskQueue::new());
        let results: Arc<TaskQueue<JobOutcome<T>>> = Arc::new(TaskQueue::new());
        let status: Arc<ManagerStatus> = Arc::new(ManagerStatus::new());
        let workers: Vec<ThreadWorker<T>> =
            Self::create_workers(size, jobs.clone(), results.clone(), status.clone());

        let manager: ThreadManager<T> = ThreadManager {
            jobs,
            results,
            workers,
            status,
            dispatched: AtomicUsize::new(0),
            terminated: false,
        };

        for worker in manager.workers.iter() {
            worker.start()?;
        }
        debug!(size, "thread manager started");
        Ok(manager)
    }

    /// Submits a job and returns its submission index.
    pub fn execute<F>(&self, function: F) -> Result<usize>
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let id: usize = self.dispatched.fetch_add(1, Ordering::AcqRel);
        let job: Job<T> = Box::new(function);
        self.jobs.push((id, job))?;
        Ok(id)
    }

    /// Outcomes in completion order, each tagged with its submission index.
    pub fn yield_results(&self) -> ResultIter<'_, T> {
        ResultIter::new(self.jobs.status(), &self.results)
    }

    /// Drains every outstanding job, stops the workers and returns the
    /// results in submission order. The first failed job fails the join.
    ///
    /// Outcomes already taken through [`ThreadManager::yield_results`] are
    /// not returned again.
    pub fn join(mut self) -> Result<Vec<T>> {
        let consumed: usize = self.results.status().received();
        let mut outcomes: Vec<JobOutcome<T>> = self.yield_results().collect();
        self.terminate_all();

        let expected: usize = self.jobs.status().sent().saturating_sub(consumed);
        if outcomes.len() != expected {
            return Err(Error::MissingResults {
                expected,
                received: outcomes.len(),
            });
        }

        outcomes.sort_by_key(|(id, _)| *id);
        outcomes.into_iter().map(|(_, outcome)| outcome).collect()
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn active_threads(&self) -> usize {
        self.status.active_threads()
    }

    pub fn busy_threads(&self) -> usize {
        self.status.busy_threads()
    }

    pub fn pending_jobs(&self) -> usize {
        self.jobs.len()
    }

    /// Number of jobs each worker has picked up so far.
    pub fn job_distribution(&self) -> Vec<usize> {
        self.workers
            .iter()
            .map(|worker| worker.received_jobs())
            .collect()
    }
}

impl<T> ThreadManager<T>
where
    T: Send + 'static,
{
    fn create_workers(
        size: usize,
        jobs: Arc<TaskQueue<(usize, Job<T>)>>,
        results: Arc<TaskQueue<JobOutcome<T>>>,
        status: Arc<ManagerStatus>,
    ) -> Vec<ThreadWorker<T>> {
        let mut workers: Vec<ThreadWorker<T>> = Vec::with_capacity(size);

        for id in 0..size {
            let worker: ThreadWorker<T> =
                ThreadWorker::new(id, jobs.clone(), results.clone(), status.clone());
            workers.push(worker);
        }
        workers
    }

    fn terminate_all(&mut self) {
        if self.terminated {
            return;
        }
        self.terminated = true;
        self.jobs.close();
        for worker in self.workers.iter() {
            worker.join();
        }
        debug!(
            distribution = ?self.job_distribution(),
            active = self.active_threads(),
            busy = self.busy_threads(),
            pending = self.pending_jobs(),
            "thread manager stopped"
        );
    }
}

impl<T> Drop for ThreadManager<T>
where
    T: Send + 'static,
{
    fn drop(&mut self) {
        self.terminate_all();
    }
}
