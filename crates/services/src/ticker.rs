//! Periodic elapsed-time updates for an active test.
//!
//! The ticker is owned by the test state. Dropping it aborts the background
//! task, so every way out of a test (finish, early finish, reset) stops it.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use quiz_core::{Clock, SessionClock};

pub struct ElapsedTicker {
    handle: JoinHandle<()>,
    updates: watch::Receiver<u64>,
}

impl ElapsedTicker {
    /// Spawn the ticker on the current tokio runtime.
    ///
    /// The task owns its own copy of `clock`. A `Clock::Fixed` advanced after
    /// the spawn is not seen here, so ticks keep reporting the spawn-time
    /// instant; only `Clock::System` produces a live count.
    ///
    /// Returns `None` when called outside a runtime; elapsed time is then only
    /// available on demand.
    #[must_use]
    pub fn spawn(clock: Clock, started_at: DateTime<Utc>, period: Duration) -> Option<Self> {
        let runtime = Handle::try_current().ok()?;
        let (tx, updates) = watch::channel(0_u64);
        let session_clock = SessionClock::start(started_at);

        let handle = runtime.spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                let elapsed = session_clock.elapsed_secs(clock.now());
                if tx.send(elapsed).is_err() {
                    break;
                }
            }
        });

        Some(Self { handle, updates })
    }

    /// Receiver for elapsed seconds; closes when the ticker stops.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.updates.clone()
    }
}

impl Drop for ElapsedTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[tokio::test(start_paused = true)]
    async fn ticks_until_dropped() {
        let ticker = ElapsedTicker::spawn(
            Clock::fixed(fixed_now() + chrono::Duration::seconds(3)),
            fixed_now(),
            Duration::from_secs(1),
        )
        .unwrap();
        let mut rx = ticker.subscribe();

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), 3);

        drop(ticker);
        let closed = tokio::time::timeout(Duration::from_secs(5), async {
            while rx.changed().await.is_ok() {}
        })
        .await;
        assert!(closed.is_ok(), "ticker kept running after drop");
    }

    #[test]
    fn no_runtime_no_ticker() {
        assert!(ElapsedTicker::spawn(Clock::default(), fixed_now(), Duration::from_secs(1)).is_none());
    }
}
