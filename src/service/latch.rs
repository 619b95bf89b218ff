//! One-shot alert latch with deadline support.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::sync::Notify;

/// How a wait on the latch ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wake {
    /// The latch was signaled.
    Alerted,
    /// The deadline passed with the latch unsignaled.
    Expired,
}

/// A one-shot latch: the first `signal` wakes every current and future
/// waiter, further signals are no-ops. Waiting after the latch fired
/// completes immediately.
#[derive(Debug, Default)]
pub struct AlertLatch {
    signaled: AtomicBool,
    notify: Notify,
}

impl AlertLatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire the latch. Idempotent; only the first call wakes waiters.
    pub fn signal(&self) {
        if !self.signaled.swap(true, Ordering::AcqRel) {
            self.notify.notify_waiters();
        }
    }

    #[must_use]
    pub fn is_signaled(&self) -> bool {
        self.signaled.load(Ordering::Acquire)
    }

    /// Park until the latch fires. Returns immediately if it already has.
    pub async fn wait(&self) {
        while !self.is_signaled() {
            let notified = self.notify.notified();
            // Re-check after registering: a signal landing between the
            // flag check and `notified()` would otherwise be lost.
            if self.is_signaled() {
                return;
            }
            notified.await;
        }
    }

    /// Park until the latch fires or `deadline` passes, whichever comes
    /// first. A signal racing the deadline counts as [`Wake::Alerted`];
    /// a deadline already in the past with the latch cold yields
    /// [`Wake::Expired`] immediately.
    pub async fn wait_until(&self, deadline: DateTime<Utc>) -> Wake {
        let remaining = (deadline - Utc::now()).to_std().unwrap_or(Duration::ZERO);
        match tokio::time::timeout(remaining, self.wait()).await {
            Ok(()) => Wake::Alerted,
            Err(_) if self.is_signaled() => Wake::Alerted,
            Err(_) => Wake::Expired,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    // ---- one-shot semantics ----

    #[tokio::test]
    async fn wait_after_signal_returns_immediately() {
        let latch = AlertLatch::new();
        latch.signal();
        latch.wait().await;
        assert!(latch.is_signaled());
    }

    #[tokio::test]
    async fn repeated_signals_wake_exactly_once() {
        let latch = Arc::new(AlertLatch::new());
        latch.signal();
        latch.signal();
        latch.signal();

        // One waiter, one wake; a second wait completes immediately too.
        latch.wait().await;
        latch.wait().await;
    }

    #[tokio::test]
    async fn signal_wakes_a_parked_waiter() {
        let latch = Arc::new(AlertLatch::new());
        let waiter = {
            let latch = latch.clone();
            tokio::spawn(async move { latch.wait().await })
        };
        tokio::task::yield_now().await;
        latch.signal();
        waiter.await.unwrap();
    }

    #[test]
    fn wait_is_pending_until_signal() {
        let latch = Arc::new(AlertLatch::new());
        let mut wait = tokio_test::task::spawn({
            let latch = latch.clone();
            async move { latch.wait().await }
        });
        assert!(wait.poll().is_pending());

        latch.signal();
        assert!(wait.poll().is_ready());
    }

    // ---- deadlines ----

    #[tokio::test]
    async fn past_deadline_expires_immediately() {
        let latch = AlertLatch::new();
        let deadline = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(latch.wait_until(deadline).await, Wake::Expired);
    }

    #[tokio::test]
    async fn signaled_latch_beats_past_deadline() {
        let latch = AlertLatch::new();
        latch.signal();
        let deadline = Utc::now() - chrono::Duration::hours(1);
        assert_eq!(latch.wait_until(deadline).await, Wake::Alerted);
    }

    #[tokio::test]
    async fn signal_before_deadline_alerts() {
        let latch = Arc::new(AlertLatch::new());
        let deadline = Utc::now() + chrono::Duration::seconds(30);
        let waiter = {
            let latch = latch.clone();
            tokio::spawn(async move { latch.wait_until(deadline).await })
        };
        tokio::task::yield_now().await;
        latch.signal();
        assert_eq!(waiter.await.unwrap(), Wake::Alerted);
    }

    #[tokio::test]
    async fn deadline_expires_an_unsignaled_latch() {
        let latch = Arc::new(AlertLatch::new());
        let deadline = Utc::now() + chrono::Duration::milliseconds(50);
        assert_eq!(latch.wait_until(deadline).await, Wake::Expired);
        assert!(!latch.is_signaled());
    }
}
