//! Graceful shutdown on `SIGTERM`/`SIGINT`.

use tokio::signal::unix::{signal, SignalKind};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

/// Spawns a background task that cancels a shared token on `SIGTERM` or
/// `SIGINT`, so `axum::serve`'s graceful-shutdown future has something to
/// wait on.
pub struct SigDown {
    _task_tracker: TaskTracker,
    cancellation_token: CancellationToken,
}

impl SigDown {
    pub fn try_new() -> Result<Self, std::io::Error> {
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        let inner = CancellationToken::new();
        let outer = inner.clone();
        let task_tracker = TaskTracker::new();
        task_tracker.spawn(async move {
            tokio::select! {
                _ = sigterm.recv() => inner.cancel(),
                _ = sigint.recv() => inner.cancel(),
            }
        });
        task_tracker.close();
        Ok(SigDown {
            _task_tracker: task_tracker,
            cancellation_token: outer,
        })
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }
}
