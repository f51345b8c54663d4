use crate::channel::TaskQueue;
use crate::status::ChannelStatus;
use crate::worker::JobOutcome;

/// Yields job outcomes in completion order until every dispatched job has
/// reported back.
pub struct ResultIter<'a, T>
where
    T: Send + 'static,
{
    job_status: &'a ChannelStatus,
    results: &'a TaskQueue<JobOutcome<T>>,
}

impl<'a, T> ResultIter<'a, T>
where
    T: Send + 'static,
{
    pub fn new(job_status: &'a ChannelStatus, results: &'a TaskQueue<JobOutcome<T>>) -> Self {
        Self {
            job_status,
            results,
        }
    }

    pub fn has_results(&self) -> bool {
        self.results.status().received() < self.job_status.sent()
    }
}

impl<'a, T> Iterator for ResultIter<'a, T>
where
    T: Send + 'static,
{
    type Item = JobOutcome<T>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.has_results() {
            return self.results.pop();
        }
        None
    }
}
