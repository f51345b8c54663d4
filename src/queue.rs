//! Producer/consumer over a shared task queue.
//!
//! Consumers add their partials into one mutex-guarded accumulator as they
//! finish, so the summation order follows dequeue timing and the low-order
//! bits of the result may differ between runs.

use std::sync::Mutex;
use std::thread;

use tracing::{debug, info, trace};

use crate::channel::TaskQueue;
use crate::error::{Error, Result};
use crate::partition::{self, ChunkRange};
use crate::series;
use crate::threads::join_scoped;

struct Accumulator {
    total: f64,
    merged: usize,
}

/// Running total shared by the consumers of one run.
pub struct SharedSum {
    inner: Mutex<Accumulator>,
}

impl SharedSum {
    pub fn new() -> Self {
        let inner: Mutex<Accumulator> = Mutex::new(Accumulator {
            total: 0.0,
            merged: 0,
        });
        Self { inner }
    }

    pub fn add(&self, value: f64) -> Result<()> {
        let mut guard = self.inner.lock().map_err(|_| Error::LockPoisoned)?;
        guard.total += value;
        guard.merged += 1;
        Ok(())
    }

    pub fn merged(&self) -> Result<usize> {
        let guard = self.inner.lock().map_err(|_| Error::LockPoisoned)?;
        Ok(guard.merged)
    }

    pub fn into_total(self) -> Result<f64> {
        let accumulator: Accumulator = self.inner.into_inner().map_err(|_| Error::LockPoisoned)?;
        Ok(accumulator.total)
    }
}

impl Default for SharedSum {
    fn default() -> Self {
        Self::new()
    }
}

pub fn run(total: u64, worker_count: usize, batch_size: u64) -> Result<f64> {
    sum_with(total, worker_count, batch_size, series::partial_sum)
}

pub fn sum_with<K>(total: u64, worker_count: usize, batch_size: u64, kernel: K) -> Result<f64>
where
    K: Fn(ChunkRange) -> f64 + Sync,
{
    if worker_count == 0 {
        return Err(Error::invalid_config("worker_count", "must be at least 1"));
    }

    let ranges: Vec<ChunkRange> = partition::by_batch(total, batch_size)?;
    if ranges.is_empty() {
        return Ok(0.0);
    }

    let queue: TaskQueue<ChunkRange> = TaskQueue::new();
    for range in ranges.iter() {
        queue.push(*range)?;
    }
    queue.close();
    let produced: usize = queue.status().sent();

    debug!(total, tasks = produced, consumers = worker_count, "queue filled");
    let accumulator: SharedSum = SharedSum::new();
    let kernel: &K = &kernel;
    let queue: &TaskQueue<ChunkRange> = &queue;
    let shared: &SharedSum = &accumulator;

    let consumed: Vec<usize> = thread::scope(|scope| {
        let consumers = 0..worker_count;
        let handles: Vec<std::io::Result<thread::ScopedJoinHandle<'_, Result<usize>>>> = consumers
            .map(|consumer| {
                thread::Builder::new()
                    .name(format!("leibniz-consumer-{}", consumer))
                    .spawn_scoped(scope, move || consume(consumer, queue, shared, kernel))
            })
            .collect();
        join_scoped(handles)
    })?;

    let merged: usize = accumulator.merged()?;
    if merged != produced {
        return Err(Error::MissingResults {
            expected: produced,
            received: merged,
        });
    }

    let pi: f64 = accumulator.into_total()?;
    info!(total, tasks = produced, per_consumer = ?consumed, pi, "producer/consumer finished");
    Ok(pi)
}

fn consume<K>(
    consumer: usize,
    queue: &TaskQueue<ChunkRange>,
    accumulator: &SharedSum,
    kernel: &K,
) -> Result<usize>
where
    K: Fn(ChunkRange) -> f64 + Sync,
{
    let mut handled: usize = 0;
    // The queue is filled before consumers start; empty means done.
    while let Some(range) = queue.try_pop() {
        trace!(consumer, start = range.start, terms = range.len(), "task dequeued");
        let partial: f64 = kernel(range);
        accumulator.add(partial)?;
        handled += 1;
    }
    Ok(handled)
}
