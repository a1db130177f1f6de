//! Scheduling policies
//!
//! A policy looks at the most recent snapshot and decides whether another
//! fetch should happen and after how long. Policies are pure: they take the
//! current time as an argument and never touch the network.
//!
//! Two policies are provided:
//! - [`AdaptiveCadence`] - per-entity polling that speeds up as the
//!   estimated completion time approaches
//! - [`AnyRunning`] - collection polling at a fixed cadence while any
//!   entity is running

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Read-only view of an entity the poller can reason about
pub trait PollableEntity {
    /// No further state change is expected
    fn is_terminal(&self) -> bool;

    /// Entity is actively being worked on by the backend
    fn is_running(&self) -> bool;

    /// Backend estimate of completion, if any
    fn estimated_completion(&self) -> Option<DateTime<Utc>>;
}

/// Outcome of a scheduling decision
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextPoll {
    /// Do not schedule another fetch
    Stop,
    /// Fetch again after the given delay
    After(Duration),
}

impl NextPoll {
    pub fn delay(&self) -> Option<Duration> {
        match self {
            NextPoll::Stop => None,
            NextPoll::After(delay) => Some(*delay),
        }
    }

    pub fn is_stop(&self) -> bool {
        matches!(self, NextPoll::Stop)
    }
}

/// Decides the next fetch from the last known snapshot
pub trait PollPolicy<T>: Send + Sync {
    /// `snapshot` is `None` when nothing has been fetched successfully yet
    fn next_poll(&self, snapshot: Option<&T>, now: DateTime<Utc>) -> NextPoll;
}

/// Tiered cadence driven by time remaining until estimated completion
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdaptiveCadence {
    /// Interval when no estimate is available
    #[serde(with = "duration_millis")]
    pub default_interval: Duration,

    /// Remaining time above which the slow interval applies
    #[serde(with = "duration_millis")]
    pub far_threshold: Duration,

    /// Remaining time above which the medium interval applies
    #[serde(with = "duration_millis")]
    pub near_threshold: Duration,

    #[serde(with = "duration_millis")]
    pub far_interval: Duration,

    #[serde(with = "duration_millis")]
    pub medium_interval: Duration,

    /// Interval once completion is close or overdue
    #[serde(with = "duration_millis")]
    pub near_interval: Duration,
}

impl Default for AdaptiveCadence {
    fn default() -> Self {
        Self {
            default_interval: Duration::from_secs(30),
            far_threshold: Duration::from_secs(300),
            near_threshold: Duration::from_secs(120),
            far_interval: Duration::from_secs(30),
            medium_interval: Duration::from_secs(15),
            near_interval: Duration::from_secs(5),
        }
    }
}

impl AdaptiveCadence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interval used when the snapshot carries no estimate
    pub fn with_default_interval(mut self, interval: Duration) -> Self {
        self.default_interval = interval;
        self
    }

    /// Set both tier thresholds; `near` is clamped to at most `far`
    pub fn with_thresholds(mut self, far: Duration, near: Duration) -> Self {
        self.far_threshold = far;
        self.near_threshold = near.min(far);
        self
    }

    /// Set the far / medium / near intervals
    pub fn with_intervals(mut self, far: Duration, medium: Duration, near: Duration) -> Self {
        self.far_interval = far;
        self.medium_interval = medium;
        self.near_interval = near;
        self
    }

    /// Interval for a given remaining time in milliseconds (may be negative)
    pub fn interval_for_remaining(&self, remaining_ms: i64) -> Duration {
        if remaining_ms > self.far_threshold.as_millis() as i64 {
            self.far_interval
        } else if remaining_ms > self.near_threshold.as_millis() as i64 {
            self.medium_interval
        } else {
            self.near_interval
        }
    }
}

impl<T: PollableEntity> PollPolicy<T> for AdaptiveCadence {
    fn next_poll(&self, snapshot: Option<&T>, now: DateTime<Utc>) -> NextPoll {
        let Some(entity) = snapshot else {
            return NextPoll::Stop;
        };

        if entity.is_terminal() {
            return NextPoll::Stop;
        }

        match entity.estimated_completion() {
            Some(eta) => {
                let remaining_ms = eta.signed_duration_since(now).num_milliseconds();
                NextPoll::After(self.interval_for_remaining(remaining_ms))
            }
            None => NextPoll::After(self.default_interval),
        }
    }
}

/// Fixed cadence while at least one entity in the collection is running
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnyRunning {
    #[serde(with = "duration_millis")]
    pub interval: Duration,
}

impl Default for AnyRunning {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
        }
    }
}

impl AnyRunning {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }
}

impl<T: PollableEntity> PollPolicy<Vec<T>> for AnyRunning {
    fn next_poll(&self, snapshot: Option<&Vec<T>>, _now: DateTime<Utc>) -> NextPoll {
        let any_running = snapshot
            .map(|entities| entities.iter().any(PollableEntity::is_running))
            .unwrap_or(false);

        if any_running {
            NextPoll::After(self.interval)
        } else {
            NextPoll::Stop
        }
    }
}

/// Serde support for Duration as milliseconds
pub(crate) mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}
