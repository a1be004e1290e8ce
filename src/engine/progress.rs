// Export progress polling: periodic reads of a session's progress, forwarded to a sink.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::backend::ExportSession;
use super::dispatch::MainQueue;
use crate::config::PROGRESS_COMPLETE_THRESHOLD;

/// Receives export progress in `[0, 1]` on the main queue.
pub trait ProgressSink: Send + Sync {
    fn update_progress(&self, progress: f32);
}

impl<F> ProgressSink for F
where
    F: Fn(f32) + Send + Sync,
{
    fn update_progress(&self, progress: f32) {
        self(progress)
    }
}

/// Periodic task tied to one export session.
///
/// Forwards every positive reading. Once progress passes the completion
/// threshold the sink is reset to zero and the task ends by itself.
pub struct ProgressPoller {
    token: CancellationToken,
    handle: Option<JoinHandle<()>>,
}

impl ProgressPoller {
    pub fn start(
        session: Arc<dyn ExportSession>,
        sink: Arc<dyn ProgressSink>,
        queue: MainQueue,
        period: Duration,
    ) -> Self {
        let token = CancellationToken::new();
        let cancelled = token.clone();

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = cancelled.cancelled() => {
                        debug!("progress poller stopped by owner");
                        break;
                    }
                    _ = ticker.tick() => {
                        let progress = session.progress();
                        if progress > 0.0 {
                            let sink = sink.clone();
                            queue.dispatch(move || sink.update_progress(progress));
                        }
                        if progress > PROGRESS_COMPLETE_THRESHOLD {
                            let sink = sink.clone();
                            queue.dispatch(move || sink.update_progress(0.0));
                            debug!("progress {:.3} past threshold, poller finished", progress);
                            break;
                        }
                    }
                }
            }
        });

        Self {
            token,
            handle: Some(handle),
        }
    }

    /// Stop polling and wait for the task, so nothing is queued after this returns.
    pub async fn stop(mut self) {
        self.token.cancel();
        if let Some(handle) = self.handle.take() {
            let _ = handle.await;
        }
    }
}

impl Drop for ProgressPoller {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
