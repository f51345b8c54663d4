use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{Error, Result};
use crate::series::MAX_ITERATIONS;

/// Half-open interval `[start, end)` of series indices, never empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChunkRange {
    pub start: u64,
    pub end: u64,
}

impl ChunkRange {
    pub fn new(start: u64, end: u64) -> Option<Self> {
        if start < end {
            return Some(Self { start, end });
        }
        None
    }

    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }
}

/// Splits `[0, total)` into `worker_count` contiguous ranges; the last range
/// absorbs the remainder. Empty leading ranges (when `total < worker_count`)
/// are skipped.
pub fn by_workers(total: u64, worker_count: usize) -> Result<Vec<ChunkRange>> {
    if worker_count == 0 {
        return Err(Error::invalid_config("worker_count", "must be at least 1"));
    }
    check_total(total)?;

    let workers: u64 = worker_count as u64;
    let chunk: u64 = total / workers;
    let mut ranges: Vec<ChunkRange> = Vec::with_capacity(worker_count);

    for idx in 0..workers {
        let start: u64 = idx * chunk;
        let end: u64 = if idx < workers - 1 {
            (idx + 1) * chunk
        } else {
            total
        };
        if let Some(range) = ChunkRange::new(start, end) {
            ranges.push(range);
        }
    }

    trace!(total, worker_count, chunk, ranges = ranges.len(), "partitioned by workers");
    Ok(ranges)
}

/// Splits `[0, total)` into ranges of `batch_size`; the last may be shorter.
pub fn by_batch(total: u64, batch_size: u64) -> Result<Vec<ChunkRange>> {
    if batch_size == 0 {
        return Err(Error::invalid_config("batch_size", "must be at least 1"));
    }
    check_total(total)?;

    let count: u64 = total.div_ceil(batch_size);
    let mut ranges: Vec<ChunkRange> = Vec::with_capacity(count as usize);

    let mut start: u64 = 0;
    while start < total {
        let end: u64 = start.saturating_add(batch_size).min(total);
        ranges.push(ChunkRange { start, end });
        start = end;
    }

    trace!(total, batch_size, ranges = ranges.len(), "partitioned by batch");
    Ok(ranges)
}

fn check_total(total: u64) -> Result<()> {
    if total > MAX_ITERATIONS {
        return Err(Error::invalid_config("total_iterations", "must not exceed 2^63 - 1"));
    }
    Ok(())
}
