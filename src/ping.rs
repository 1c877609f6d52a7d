//! Connection liveness tracking.
//!
//! The engine never sleeps; it tells the caller the next deadline and what
//! to do when it passes. While idle the decision is "send a ping"; while a
//! ping is outstanding the decision is "the connection is dead". The
//! deadline itself determines firing, not a countdown.

use chrono::{DateTime, TimeDelta, Utc};

/// Where the ping round trip currently stands.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PingStatus {
    /// No ping sent yet on this connection.
    #[default]
    Never,
    /// A ping went out at this time and no pong has answered it.
    Sent(DateTime<Utc>),
    /// Last measured round-trip latency.
    Latency(TimeDelta),
}

/// What the caller should do when the deadline passes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimedAction {
    /// Send a PING and call [`PingTracker::record_ping_sent`].
    SendPing,
    /// The server missed its pong window; tear the connection down.
    Disconnect,
}

/// Liveness state machine for one connection.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PingTracker {
    status: PingStatus,
    deadline: Option<DateTime<Utc>>,
    /// Quiet period between a pong and the next ping.
    interval: TimeDelta,
    /// How long an unanswered ping is tolerated.
    timeout: TimeDelta,
}

impl PingTracker {
    /// Default quiet period between pings.
    pub const DEFAULT_INTERVAL_SECS: i64 = 60;
    /// Default tolerance for an unanswered ping.
    pub const DEFAULT_TIMEOUT_SECS: i64 = 120;

    /// Tracker with default cadence; the first ping is due `interval` after
    /// `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self::with_cadence(
            now,
            TimeDelta::seconds(Self::DEFAULT_INTERVAL_SECS),
            TimeDelta::seconds(Self::DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_cadence(now: DateTime<Utc>, interval: TimeDelta, timeout: TimeDelta) -> Self {
        PingTracker {
            status: PingStatus::Never,
            deadline: Some(now + interval),
            interval,
            timeout,
        }
    }

    pub fn status(&self) -> PingStatus {
        self.status
    }

    /// The next deadline and the action due when it passes. `None` only if
    /// tracking is not scheduled.
    pub fn next_timed_action(&self) -> Option<(DateTime<Utc>, TimedAction)> {
        let deadline = self.deadline?;
        let action = match self.status {
            PingStatus::Sent(_) => TimedAction::Disconnect,
            PingStatus::Never | PingStatus::Latency(_) => TimedAction::SendPing,
        };
        Some((deadline, action))
    }

    /// A ping went out at `now`; the server has until `now + timeout`.
    pub fn record_ping_sent(&mut self, now: DateTime<Utc>) {
        self.status = PingStatus::Sent(now);
        self.deadline = Some(now + self.timeout);
    }

    /// A pong arrived at `now`. Latency is measured against the outstanding
    /// ping; a pong nobody asked for records zero latency rather than
    /// erroring.
    pub fn record_pong(&mut self, now: DateTime<Utc>) {
        let latency = match self.status {
            PingStatus::Sent(t0) => now - t0,
            PingStatus::Never | PingStatus::Latency(_) => TimeDelta::zero(),
        };
        self.status = PingStatus::Latency(latency);
        self.deadline = Some(now + self.interval);
    }

    /// Last measured round-trip time, if one has completed.
    pub fn latency(&self) -> Option<TimeDelta> {
        match self.status {
            PingStatus::Latency(d) => Some(d),
            _ => None,
        }
    }
}
