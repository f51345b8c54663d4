use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};
use std::thread;

use tracing::trace;

use crate::channel::TaskQueue;
use crate::error::{Error, Result};
use crate::status::{ManagerStatus, WorkerStatus};

pub type Job<T> = Box<dyn FnOnce() -> T + Send + 'static>;

/// Result of one job, tagged with its submission index.
pub type JobOutcome<T> = (usize, Result<T>);

pub struct ThreadWorker<T>
where
    T: Send + 'static,
{
    id: usize,
    thread: Mutex<Option<thread::JoinHandle<()>>>,
    jobs: Arc<TaskQueue<(usize, Job<T>)>>,
    results: Arc<TaskQueue<JobOutcome<T>>>,
    manager_status: Arc<ManagerStatus>,
    worker_status: Arc<WorkerStatus>,
}

impl<T> ThreadWorker<T>
where
    T: Send + 'static,
{
    pub fn new(
        id: usize,
        jobs: Arc<TaskQueue<(usize, Job<T>)>>,
        results: Arc<TaskQueue<JobOutcome<T>>>,
        manager_status: Arc<ManagerStatus>,
    ) -> Self {
        let thread: Mutex<Option<thread::JoinHandle<()>>> = Mutex::new(None);
        let worker_status: Arc<WorkerStatus> = Arc::new(WorkerStatus::new());

        ThreadWorker {
            id,
            thread,
            jobs,
            results,
            manager_status,
            worker_status,
        }
    }

    pub fn start(&self) -> Result<()> {
        if self.is_active() {
            return Ok(());
        }

        let mut thread_guard = self.thread.lock().map_err(|_| Error::LockPoisoned)?;
        Self::set_worker_active(&self.manager_status, &self.worker_status);

        let worker_loop = self.create_worker_loop();
        let spawned: std::io::Result<thread::JoinHandle<()>> = thread::Builder::new()
            .name(format!("leibniz-worker-{}", self.id))
            .spawn(worker_loop);

        match spawned {
            Ok(thread) => {
                *thread_guard = Some(thread);
                Ok(())
            }
            Err(error) => {
                Self::unset_worker_active(&self.manager_status, &self.worker_status);
                Err(Error::Io(error))
            }
        }
    }

    pub fn join(&self) {
        if let Ok(mut thread_option) = self.thread.lock() {
            if let Some(thread) = thread_option.take() {
                let _ = thread.join();
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.worker_status.is_active()
    }

    pub fn received_jobs(&self) -> usize {
        self.worker_status.received()
    }
}

impl<T> ThreadWorker<T>
where
    T: Send + 'static,
{
    fn set_worker_active(manager_status: &Arc<ManagerStatus>, status: &Arc<WorkerStatus>) {
        status.set_active(true);
        manager_status.adjust_active(true);
    }

    fn unset_worker_active(manager_status: &Arc<ManagerStatus>, status: &Arc<WorkerStatus>) {
        status.set_active(false);
        manager_status.adjust_active(false);
    }

    fn set_worker_busy(manager_status: &Arc<ManagerStatus>) {
        manager_status.adjust_busy(true);
    }

    fn unset_worker_busy(manager_status: &Arc<ManagerStatus>) {
        manager_status.adjust_busy(false);
    }

    fn create_worker_loop(&self) -> impl FnOnce() + Send + 'static {
        let id: usize = self.id;
        let jobs: Arc<TaskQueue<(usize, Job<T>)>> = self.jobs.clone();
        let results: Arc<TaskQueue<JobOutcome<T>>> = self.results.clone();
        let manager_status: Arc<ManagerStatus> = self.manager_status.clone();
        let worker_status: Arc<WorkerStatus> = self.worker_status.clone();

        move || {
            // Exits once the job queue is closed and drained.
            while let Some((job_id, job)) = jobs.pop() {
                worker_status.add_received();
                Self::set_worker_busy(&manager_status);
                trace!(worker = id, job = job_id, "running job");

                let outcome: Result<T> = catch_unwind(AssertUnwindSafe(job))
                    .map_err(|payload| Error::worker_panicked(id, payload));

                Self::unset_worker_busy(&manager_status);
                if results.push((job_id, outcome)).is_err() {
                    break;
                }
            }

            Self::unset_worker_active(&manager_status, &worker_status);
        }
    }
}
