use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

const LOAD_ORDER: Ordering = Ordering::Acquire;
const STORE_ORDER: Ordering = Ordering::Release;
const FETCH_ORDER: Ordering = Ordering::AcqRel;

pub struct ManagerStatus {
    active_threads: AtomicUsize,
    busy_threads: AtomicUsize,
}

impl ManagerStatus {
    pub fn new() -> Self {
        let active_threads: AtomicUsize = AtomicUsize::new(0);
        let busy_threads: AtomicUsize = AtomicUsize::new(0);
        Self {
            active_threads,
            busy_threads,
        }
    }

    pub fn active_threads(&self) -> usize {
        self.active_threads.load(LOAD_ORDER)
    }

    pub fn busy_threads(&self) -> usize {
        self.busy_threads.load(LOAD_ORDER)
    }

    pub fn adjust_active(&self, state: bool) {
        match state {
            true => self.active_threads.fetch_add(1, FETCH_ORDER),
            false => self.active_threads.fetch_sub(1, FETCH_ORDER),
        };
    }

    pub fn adjust_busy(&self, state: bool) {
        match state {
            true => self.busy_threads.fetch_add(1, FETCH_ORDER),
            false => self.busy_threads.fetch_sub(1, FETCH_ORDER),
        };
    }
}

pub struct WorkerStatus {
    active: AtomicBool,
    received: AtomicUsize,
}

impl WorkerStatus {
    pub fn new() -> Self {
        let active: AtomicBool = AtomicBool::new(false);
        let received: AtomicUsize = AtomicUsize::new(0);

        Self {
            active,
            received,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(LOAD_ORDER)
    }

    pub fn received(&self) -> usize {
        self.received.load(LOAD_ORDER)
    }

    pub fn set_active(&self, state: bool) {
        self.active.store(state, STORE_ORDER);
    }

    pub fn add_received(&self) {
        self.received.fetch_add(1, FETCH_ORDER);
    }
}

pub struct ChannelStatus {
    sent: AtomicUsize,
    received: AtomicUsize,
}

impl ChannelStatus {
    pub fn new() -> Self {
        let sent: AtomicUsize = AtomicUsize::new(0);
        let received: AtomicUsize = AtomicUsize::new(0);

        Self { sent, received }
    }

    pub fn sent(&self) -> usize {
        self.sent.load(LOAD_ORDER)
    }

    pub fn received(&self) -> usize {
        self.received.load(LOAD_ORDER)
    }

    pub fn add_sent(&self) {
        self.sent.fetch_add(1, FETCH_ORDER);
    }

    pub fn add_received(&self) {
        self.received.fetch_add(1, FETCH_ORDER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manager_counters() {
        let status: ManagerStatus = ManagerStatus::new();
        status.adjust_active(true);
        status.adjust_active(true);
        status.adjust_busy(true);
        status.adjust_active(false);
        assert_eq!(status.active_threads(), 1);
        assert_eq!(status.busy_threads(), 1);
    }

    #[test]
    fn channel_counters() {
        let status: ChannelStatus = ChannelStatus::new();
        status.add_sent();
        status.add_sent();
        status.add_received();
        assert_eq!(status.sent(), 2);
        assert_eq!(status.received(), 1);
    }
}
