use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Cancellation scope for one client operation.
///
/// A context is cancelled either through its [`CancelHandle`] or when its
/// optional deadline passes. Clones observe the same cancellation.
#[derive(Debug, Clone)]
pub struct OperationContext {
    cancelled: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

/// Cancels the [`OperationContext`] it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl OperationContext {
    /// Creates a cancellable context and the handle that cancels it.
    pub fn new() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancelled: rx,
                deadline: None,
            },
            CancelHandle { tx },
        )
    }

    /// A context that is never cancelled.
    pub fn background() -> Self {
        let (_, rx) = watch::channel(false);
        Self {
            cancelled: rx,
            deadline: None,
        }
    }

    /// Returns a copy of this context that is also cancelled after `timeout`.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let deadline = Instant::now() + timeout;
        Self {
            cancelled: self.cancelled.clone(),
            deadline: Some(self.deadline.map_or(deadline, |d| d.min(deadline))),
        }
    }

    pub fn is_cancelled(&self) -> bool {
        *self.cancelled.borrow() || self.deadline.is_some_and(|d| Instant::now() >= d)
    }

    /// Resolves once the context is cancelled. Never resolves for a
    /// context without a live handle or deadline.
    pub async fn cancelled(&self) {
        let mut rx = self.cancelled.clone();
        let signalled = async move {
            if rx.wait_for(|cancelled| *cancelled).await.is_err() {
                // Handle dropped without cancelling.
                std::future::pending::<()>().await;
            }
        };

        match self.deadline {
            Some(deadline) => {
                tokio::select! {
                    _ = signalled => {}
                    _ = tokio::time::sleep_until(deadline) => {}
                }
            }
            None => signalled.await,
        }
    }

    /// Drives `fut` to completion unless the context is cancelled first, in
    /// which case `fut` is dropped and `None` is returned.
    pub async fn run<F: Future>(&self, fut: F) -> Option<F::Output> {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancelled() => None,
            out = fut => Some(out),
        }
    }
}

impl Default for OperationContext {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn background_runs_to_completion() {
        let ctx = OperationContext::background();
        assert!(!ctx.is_cancelled());
        assert_eq!(ctx.run(async { 7 }).await, Some(7));
    }

    #[tokio::test]
    async fn cancelled_before_run_skips_future() {
        let (ctx, handle) = OperationContext::new();
        handle.cancel();
        assert!(ctx.is_cancelled());

        let mut polled = false;
        let out = ctx
            .run(async {
                polled = true;
            })
            .await;
        assert!(out.is_none());
        assert!(!polled);
    }

    #[tokio::test]
    async fn cancel_interrupts_pending_future() {
        let (ctx, handle) = OperationContext::new();
        let task = tokio::spawn({
            let ctx = ctx.clone();
            async move { ctx.run(std::future::pending::<()>()).await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        handle.cancel();
        assert_eq!(task.await.unwrap(), None);
    }

    #[tokio::test]
    async fn timeout_cancels() {
        let ctx = OperationContext::background().with_timeout(Duration::from_millis(20));
        let out = ctx.run(std::future::pending::<()>()).await;
        assert!(out.is_none());
        assert!(ctx.is_cancelled());
    }

    #[tokio::test]
    async fn dropped_handle_does_not_cancel() {
        let (ctx, handle) = OperationContext::new();
        drop(handle);
        assert!(!ctx.is_cancelled());
        assert_eq!(ctx.run(async { "done" }).await, Some("done"));
    }
}
