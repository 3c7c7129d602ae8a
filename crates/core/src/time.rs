use chrono::{DateTime, Duration, Utc};

/// Time source for session stamps.
///
/// `System` reads the wall clock. `Fixed` returns a settable instant so runs
/// can be replayed with exact durations.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(DateTime<Utc>),
}

impl Clock {
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::System => Utc::now(),
            Clock::Fixed(at) => *at,
        }
    }

    /// Move a fixed clock forward by `delta`. The system clock ignores this.
    pub fn advance(&mut self, delta: Duration) {
        if let Clock::Fixed(at) = self {
            *at += delta;
        }
    }
}

//
// ─── SESSION CLOCK ─────────────────────────────────────────────────────────────
//

/// Start/end timestamps bounding one test run.
///
/// `end` is stamped at most once and never precedes `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionClock {
    started_at: DateTime<Utc>,
    ended_at: Option<DateTime<Utc>>,
}

impl SessionClock {
    #[must_use]
    pub fn start(now: DateTime<Utc>) -> Self {
        Self {
            started_at: now,
            ended_at: None,
        }
    }

    /// Stamp the end time. Later calls keep the first stamp.
    ///
    /// A `now` earlier than the start (clock skew) is clamped to the start.
    pub fn stop(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        *self.ended_at.get_or_insert(now.max(self.started_at))
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.ended_at
    }

    /// Whole seconds elapsed: live against `now` while running, frozen once stopped.
    #[must_use]
    pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u64 {
        let until = self.ended_at.unwrap_or(now);
        whole_seconds(until - self.started_at)
    }

    /// Final duration in whole seconds, if the run has ended.
    #[must_use]
    pub fn duration_secs(&self) -> Option<u64> {
        self.ended_at
            .map(|end| whole_seconds(end - self.started_at))
    }
}

fn whole_seconds(delta: Duration) -> u64 {
    u64::try_from(delta.num_seconds()).unwrap_or(0)
}

/// Render seconds as `m:ss` (minutes are not wrapped into hours).
#[must_use]
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

// 2023-11-14T22:13:20Z
const FIXED_EPOCH_SECS: i64 = 1_700_000_000;

/// Stable timestamp that tests and fixtures build their runs around.
///
/// # Panics
///
/// Never in practice; the constant is a valid Unix timestamp.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_EPOCH_SECS, 0)
        .expect("fixed timestamp should be valid")
}

/// A `Clock::Fixed` parked at [`fixed_now`].
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
