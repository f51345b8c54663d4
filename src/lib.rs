mod channel;
mod iterator;
mod manager;
mod status;
mod worker;

pub mod aggregate;
pub mod error;
pub mod harness;
pub mod job;
pub mod partition;
pub mod pool;
pub mod process;
pub mod queue;
pub mod report;
pub mod series;
pub mod threads;

pub use aggregate::{AggregateResult, PartialResult};
pub use channel::TaskQueue;
pub use error::{Error, Result};
pub use harness::{Outcome, Runner};
pub use iterator::ResultIter;
pub use job::{Job, ProcessMode, Strategy};
pub use manager::ThreadManager;
pub use partition::ChunkRange;
pub use process::WorkerCommand;
