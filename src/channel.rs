use std::sync::Mutex;

use crossbeam_channel::{unbounded, Receiver, RecvError, Sender, TryRecvError};

use crate::error::{Error, Result};
use crate::status::ChannelStatus;

/// Unbounded FIFO shared between producers and consumers.
///
/// Closing drops the sending side: blocking receivers drain what is left and
/// then observe the disconnect.
pub struct TaskQueue<T> {
    sender: Mutex<Option<Sender<T>>>,
    receiver: Receiver<T>,
    status: ChannelStatus,
}

impl<T> TaskQueue<T> {
    pub fn new() -> Self {
        let (sender, receiver): (Sender<T>, Receiver<T>) = unbounded();
        let sender: Mutex<Option<Sender<T>>> = Mutex::new(Some(sender));
        let status: ChannelStatus = ChannelStatus::new();

        TaskQueue {
            sender,
            receiver,
            status,
        }
    }

    pub fn push(&self, value: T) -> Result<()> {
        let sender_guard = self.sender.lock().map_err(|_| Error::LockPoisoned)?;
        let sender: &Sender<T> = sender_guard.as_ref().ok_or(Error::ChannelClosed)?;
        sender.send(value).map_err(|_| Error::ChannelClosed)?;
        self.status.add_sent();
        Ok(())
    }

    /// Blocks until an item arrives; `None` once closed and drained.
    pub fn pop(&self) -> Option<T> {
        let received: std::result::Result<T, RecvError> = self.receiver.recv();
        match received {
            Ok(value) => {
                self.status.add_received();
                Some(value)
            }
            Err(RecvError) => None,
        }
    }

    /// Non-blocking poll; `None` when nothing is queued right now.
    pub fn try_pop(&self) -> Option<T> {
        let received: std::result::Result<T, TryRecvError> = self.receiver.try_recv();
        match received {
            Ok(value) => {
                self.status.add_received();
                Some(value)
            }
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    pub fn close(&self) {
        if let Ok(mut sender_guard) = self.sender.lock() {
            sender_guard.take();
        }
    }

    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    pub fn status(&self) -> &ChannelStatus {
        &self.status
    }
}

impl<T> Default for TaskQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}
