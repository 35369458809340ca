use std::future::Future;
use std::time::Duration;

use tokio::task::JoinHandle;


/// Runs the most recently scheduled job once no newer job has been
/// scheduled for `delay`.
///
/// Only the wait is cancellable. A job that already started keeps running
/// to completion on its own task, so cancelling never interrupts a request
/// halfway through. The timer task outlives the wait until its job is done,
/// which is what [`Debouncer::is_pending`] reports on.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<JoinHandle<()>>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Debouncer { delay, pending: None }
    }

    pub fn schedule<F>(&mut self, job: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();

        let delay = self.delay;
        self.pending = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Aborting this task from here on only detaches the job.
            let _ = tokio::spawn(job).await;
        }));
    }

    /// True from scheduling until the latest job has finished. Cancelling
    /// clears it straight away, even if the job already started.
    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().map_or(false, |timer| !timer.is_finished())
    }

    pub fn cancel(&mut self) {
        if let Some(timer) = self.pending.take() {
            timer.abort();
        }
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}
