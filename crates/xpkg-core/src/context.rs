//! Cancellation and deadline signal for backend initialization and parsing.
//!
//! A [`Context`] is cheap to clone and is passed by reference into backend
//! initialization and [`Parser::parse`](crate::Parser::parse). Only network-backed sources have
//! anything in flight that can be interrupted; everything else checks the
//! context once at its entry point.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

/// Why a context is done.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ContextError {
    /// [`CancelHandle::cancel`] was called.
    #[error("context cancelled")]
    Cancelled,

    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// A cancellation signal with an optional deadline.
#[derive(Clone, Debug)]
pub struct Context {
    cancelled: watch::Receiver<bool>,
    deadline: Option<Instant>,
}

/// The sending half of a cancellable [`Context`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel every context derived from this handle.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        let (_tx, rx) = watch::channel(false);
        Self {
            cancelled: rx,
            deadline: None,
        }
    }

    /// A context that is cancelled when the returned handle says so.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        let ctx = Self {
            cancelled: rx,
            deadline: None,
        };
        (ctx, CancelHandle { tx })
    }

    /// Derive a context that also expires after `timeout`.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that also expires at `deadline`. The earlier of the
    /// existing and new deadline wins.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) => existing.min(deadline),
            None => deadline,
        });
        self
    }

    /// The deadline, if one is set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// `Some` once the context is done, without waiting.
    pub fn err(&self) -> Option<ContextError> {
        if *self.cancelled.borrow() {
            return Some(ContextError::Cancelled);
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Returns `true` once the context is cancelled or expired.
    pub fn is_done(&self) -> bool {
        self.err().is_some()
    }

    /// Wait until the context is done.
    ///
    /// Never resolves for a background context.
    pub async fn done(&self) -> ContextError {
        let mut rx = self.cancelled.clone();
        let cancelled = async move {
            loop {
                if *rx.borrow_and_update() {
                    return;
                }
                if rx.changed().await.is_err() {
                    // Sender gone without cancelling: can never fire.
                    std::future::pending::<()>().await;
                }
            }
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                _ = cancelled => ContextError::Cancelled,
                _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
            },
            None => {
                cancelled.await;
                ContextError::Cancelled
            }
        }
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::background()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn background_is_never_done() {
        let ctx = Context::background();
        assert!(!ctx.is_done());
        assert!(ctx.err().is_none());
        assert!(ctx.deadline().is_none());
    }

    #[test]
    fn cancel_marks_all_clones() {
        let (ctx, handle) = Context::with_cancel();
        let clone = ctx.clone();
        handle.cancel();
        assert_eq!(ctx.err(), Some(ContextError::Cancelled));
        assert_eq!(clone.err(), Some(ContextError::Cancelled));
    }

    #[test]
    fn earlier_deadline_wins() {
        let now = Instant::now();
        let ctx = Context::background()
            .with_deadline(now + Duration::from_secs(60))
            .with_deadline(now + Duration::from_secs(5))
            .with_deadline(now + Duration::from_secs(30));
        assert_eq!(ctx.deadline(), Some(now + Duration::from_secs(5)));
    }

    #[test]
    fn zero_timeout_is_expired() {
        let ctx = Context::background().with_timeout(Duration::ZERO);
        assert_eq!(ctx.err(), Some(ContextError::DeadlineExceeded));
    }

    #[tokio::test]
    async fn done_resolves_on_cancel() {
        let (ctx, handle) = Context::with_cancel();
        let waiter = tokio::spawn(async move { ctx.done().await });
        handle.cancel();
        assert_eq!(waiter.await.unwrap(), ContextError::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn done_resolves_on_deadline() {
        let ctx = Context::background().with_timeout(Duration::from_secs(10));
        assert_eq!(ctx.done().await, ContextError::DeadlineExceeded);
    }
}
