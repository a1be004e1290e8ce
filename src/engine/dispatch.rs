// Serial callback queue: every caller-visible callback runs here, in submission order.

use tokio::sync::mpsc;
use tracing::warn;

type Job = Box<dyn FnOnce() + Send + 'static>;

/// Sending half of the callback context. Cheap to clone.
#[derive(Clone)]
pub struct MainQueue {
    tx: mpsc::UnboundedSender<Job>,
}

/// Receiving half, pumped by whichever thread owns the UI loop.
pub struct MainQueueReceiver {
    rx: mpsc::UnboundedReceiver<Job>,
}

impl MainQueue {
    /// Queue whose jobs are run by the host through the returned receiver.
    pub fn channel() -> (Self, MainQueueReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, MainQueueReceiver { rx })
    }

    /// Queue drained by a dedicated task on the current tokio runtime.
    pub fn spawn() -> Self {
        let (queue, receiver) = Self::channel();
        tokio::spawn(receiver.run());
        queue
    }

    pub fn dispatch<F>(&self, job: F)
    where
        F: FnOnce() + Send + 'static,
    {
        if self.tx.send(Box::new(job)).is_err() {
            warn!("main queue receiver dropped, callback discarded");
        }
    }
}

impl MainQueueReceiver {
    /// Run every job queued so far without waiting. Returns how many ran.
    pub fn run_pending(&mut self) -> usize {
        let mut ran = 0;
        while let Ok(job) = self.rx.try_recv() {
            job();
            ran += 1;
        }
        ran
    }

    /// Run jobs until every `MainQueue` handle is dropped.
    pub async fn run(mut self) {
        while let Some(job) = self.rx.recv().await {
            job();
        }
    }
}
