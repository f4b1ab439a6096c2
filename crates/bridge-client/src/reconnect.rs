//! Reconnection policy
//!
//! Tracks consecutive connect failures against a configured ceiling and
//! tells the client whether and when to try again. Exhausted is terminal;
//! only an external restart leaves it.

use std::time::Duration;

/// Policy state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryState {
    /// Not connected, no retry pending
    Idle,
    /// A connection is up
    Connected,
    /// A retry is scheduled
    Scheduled,
    /// Attempt ceiling hit; retrying stopped until restart
    Exhausted,
}

/// What to do after a connect failure or lost connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Try again after `delay`; `attempt` is 1-based
    RetryAfter { attempt: u32, delay: Duration },
    /// Ceiling hit, stop retrying
    Exhausted,
    /// Auto-reconnect is off
    Disabled,
}

/// Retry state machine for one client instance
#[derive(Debug)]
pub struct ReconnectPolicy {
    auto: bool,
    max_attempts: i32,
    delay: Duration,
    attempts: u32,
    state: RetryState,
}

impl ReconnectPolicy {
    /// `max_attempts <= 0` means unlimited retries
    pub fn new(auto: bool, max_attempts: i32, delay: Duration) -> Self {
        Self {
            auto,
            max_attempts,
            delay,
            attempts: 0,
            state: RetryState::Idle,
        }
    }

    /// Record a successful connect: counter back to zero
    pub fn on_connected(&mut self) {
        self.attempts = 0;
        self.state = RetryState::Connected;
    }

    /// Record a failed attempt (or a lost connection) and decide what next
    pub fn on_failure(&mut self) -> ReconnectDecision {
        if self.state == RetryState::Exhausted {
            return ReconnectDecision::Exhausted;
        }

        if !self.auto {
            self.state = RetryState::Idle;
            return ReconnectDecision::Disabled;
        }

        self.attempts += 1;
        if self.max_attempts > 0 && self.attempts > self.max_attempts as u32 {
            self.state = RetryState::Exhausted;
            return ReconnectDecision::Exhausted;
        }

        self.state = RetryState::Scheduled;
        ReconnectDecision::RetryAfter {
            attempt: self.attempts,
            delay: self.delay,
        }
    }

    /// Back to the initial state (used on client stop)
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.state = RetryState::Idle;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn state(&self) -> RetryState {
        self.state
    }

    pub fn max_attempts(&self) -> i32 {
        self.max_attempts
    }
}
