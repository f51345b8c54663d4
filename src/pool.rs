//! Thread-pool executor: batch ranges submitted in order to a
//! [`ThreadManager`], results summed in submission order.

use std::sync::Arc;

use tracing::{debug, info};

use crate::aggregate;
use crate::error::{Error, Result};
use crate::manager::ThreadManager;
use crate::partition::{self, ChunkRange};
use crate::series;

pub fn run(total: u64, pool_size: usize, batch_size: u64) -> Result<f64> {
    sum_with(total, pool_size, batch_size, series::partial_sum)
}

pub fn sum_with<K>(total: u64, pool_size: usize, batch_size: u64, kernel: K) -> Result<f64>
where
    K: Fn(ChunkRange) -> f64 + Send + Sync + 'static,
{
    if pool_size == 0 {
        return Err(Error::invalid_config("pool_size", "must be at least 1"));
    }

    let ranges: Vec<ChunkRange> = partition::by_batch(total, batch_size)?;
    if ranges.is_empty() {
        return Ok(0.0);
    }

    let manager: ThreadManager<f64> = ThreadManager::new(pool_size)?;
    let kernel: Arc<K> = Arc::new(kernel);
    for range in ranges.iter() {
        let range: ChunkRange = *range;
        let kernel: Arc<K> = kernel.clone();
        manager.execute(move || (*kernel)(range))?;
    }
    debug!(total, tasks = ranges.len(), pool_size, "tasks submitted");

    let partials: Vec<f64> = manager.join()?;
    let pi: f64 = aggregate::sum_ordered(partials);
    info!(total, tasks = ranges.len(), pi, "thread pool finished");
    Ok(pi)
}
