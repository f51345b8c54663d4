//! Fixed-partition worker threads: one scoped thread per range, full join
//! before anything is summed.

use std::thread;

use tracing::{debug, info};

use crate::aggregate::{self, PartialResult};
use crate::error::{Error, Result};
use crate::partition::{self, ChunkRange};
use crate::series;

pub fn run(total: u64, worker_count: usize, _batch_size: u64) -> Result<f64> {
    sum_with(total, worker_count, series::partial_sum)
}

pub fn sum_with<K>(total: u64, worker_count: usize, kernel: K) -> Result<f64>
where
    K: Fn(ChunkRange) -> f64 + Sync,
{
    let ranges: Vec<ChunkRange> = partition::by_workers(total, worker_count)?;
    if ranges.is_empty() {
        return Ok(0.0);
    }

    debug!(total, workers = ranges.len(), "spawning fixed-partition threads");
    let kernel: &K = &kernel;
    let mut partials: Vec<PartialResult> = thread::scope(|scope| {
        let handles: Vec<std::io::Result<thread::ScopedJoinHandle<'_, Result<PartialResult>>>> =
            ranges
                .iter()
                .enumerate()
                .map(|(worker, range)| {
                    let range: ChunkRange = *range;
                    thread::Builder::new()
                        .name(format!("leibniz-fixed-{}", worker))
                        .spawn_scoped(scope, move || {
                            Ok(PartialResult {
                                start: range.start,
                                value: kernel(range),
                            })
                        })
                })
                .collect();
        join_scoped(handles)
    })?;

    let pi: f64 = aggregate::sum_partials(&mut partials);
    info!(total, workers = partials.len(), pi, "fixed-partition threads finished");
    Ok(pi)
}

/// Joins every handle before reporting, so no panicked thread is left for the
/// scope to re-raise. The first spawn failure, panic or worker error wins.
pub(crate) fn join_scoped<T>(
    handles: Vec<std::io::Result<thread::ScopedJoinHandle<'_, Result<T>>>>,
) -> Result<Vec<T>> {
    let joined: Vec<Result<T>> = handles
        .into_iter()
        .enumerate()
        .map(|(worker, handle)| match handle {
            Ok(handle) => handle
                .join()
                .map_err(|payload| Error::worker_panicked(worker, payload))?,
            Err(error) => Err(Error::Io(error)),
        })
        .collect();

    joined.into_iter().collect()
}
