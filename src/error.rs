use std::process::ExitStatus;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {field} {reason}")]
    InvalidConfig {
        field: &'static str,
        reason: &'static str,
    },

    #[error("worker [{worker}] panicked: {message}")]
    WorkerPanicked { worker: usize, message: String },

    #[error("worker process [{worker}] exited with {status}")]
    WorkerProcess { worker: usize, status: ExitStatus },

    #[error("worker I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed worker frame: {0}")]
    Codec(#[from] bincode::Error),

    #[error("shared accumulator lock was poisoned")]
    LockPoisoned,

    #[error("channel closed before all jobs were dispatched")]
    ChannelClosed,

    #[error("expected {expected} partial results, received {received}")]
    MissingResults { expected: usize, received: usize },
}

impl Error {
    pub fn invalid_config(field: &'static str, reason: &'static str) -> Self {
        Self::InvalidConfig { field, reason }
    }

    pub fn worker_panicked(worker: usize, payload: Box<dyn std::any::Any + Send>) -> Self {
        Self::WorkerPanicked {
            worker,
            message: panic_message(payload.as_ref()),
        }
    }
}

pub(crate) fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        return (*message).to_string();
    }
    if let Some(message) = payload.downcast_ref::<String>() {
        return message.clone();
    }
    String::from("unknown panic payload")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panic_payload_messages() {
        let error: Error = Error::worker_panicked(3, Box::new("boom"));
        assert_eq!(error.to_string(), "worker [3] panicked: boom");

        let error: Error = Error::worker_panicked(1, Box::new(String::from("owned")));
        assert_eq!(error.to_string(), "worker [1] panicked: owned");

        let error: Error = Error::worker_panicked(0, Box::new(7_u8));
        assert_eq!(error.to_string(), "worker [0] panicked: unknown panic payload");
    }
}
