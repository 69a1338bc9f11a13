//! Auto-save deadline.
//!
//! A one-shot timer that re-arms itself each time it fires. The binary's
//! event loop polls it once per tick; when it reports due, the loop calls
//! [`Session::auto_save`](crate::session::Session::auto_save).

use std::time::{Duration, Instant};

use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSave {
    interval: Duration,
    deadline: Option<Instant>,
}

impl AutoSave {
    /// A stopped timer.
    #[must_use]
    pub const fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.deadline.is_some()
    }

    /// Time left before the next save, if running.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline.map(|d| d.saturating_duration_since(now))
    }

    /// Arm for `now + interval`. Restarting a running timer pushes the
    /// deadline back.
    pub fn start(&mut self, now: Instant) {
        self.deadline = Some(now + self.interval);
        debug!(secs = self.interval.as_secs(), "auto-save armed");
    }

    pub fn stop(&mut self) {
        self.deadline = None;
    }

    /// Change the interval. A running timer is re-armed from `now`.
    pub fn set_interval(&mut self, interval: Duration, now: Instant) {
        self.interval = interval;
        if self.is_running() {
            self.start(now);
        }
    }

    /// `true` once the deadline has passed; the timer then re-arms for
    /// `now + interval`. A stopped timer is never due.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = Some(now + self.interval);
                true
            }
            _ => false,
        }
    }
}
