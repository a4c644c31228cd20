//! Reconnect scheduling: capped exponential backoff with a bounded attempt
//! count.
//!
//! The policy is pure bookkeeping. The channel actor owns the actual sleep so
//! that a pending attempt stays cancellable, and tests drive the schedule
//! with tokio's paused clock.

use std::time::Duration;

/// Attempts allowed before the channel stays down for good.
pub const MAX_ATTEMPTS: u32 = 5;

const INITIAL_DELAY_MS: u64 = 1_000;
const MAX_DELAY_MS: u64 = 30_000;

/// Backoff delay for a given 0-indexed attempt: `min(1s * 2^attempt, 30s)`.
pub fn delay_for_attempt(attempt: u32) -> Duration {
    let exp = INITIAL_DELAY_MS.saturating_mul(1_u64.checked_shl(attempt).unwrap_or(u64::MAX));
    Duration::from_millis(exp.min(MAX_DELAY_MS))
}

/// Decides whether and when to re-establish the channel after an unexpected
/// close.
///
/// The counter resets on every successful connection and is driven to the cap
/// by an explicit disconnect, which is what distinguishes "caller tore down
/// the session" from "network blip".
#[derive(Debug, Default, Clone)]
pub struct ReconnectPolicy {
    attempts: u32,
}

impl ReconnectPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Delay before the next reconnect attempt, or `None` once the attempt
    /// budget is spent. Increments the counter when a delay is handed out.
    pub fn next_delay(&mut self) -> Option<Duration> {
        if self.attempts >= MAX_ATTEMPTS {
            return None;
        }
        let delay = delay_for_attempt(self.attempts);
        self.attempts += 1;
        Some(delay)
    }

    /// Called on every successful connection.
    pub fn reset(&mut self) {
        self.attempts = 0;
    }

    /// Spend the whole attempt budget immediately so no further automatic
    /// reconnect is scheduled. Used by explicit disconnect.
    pub fn exhaust(&mut self) {
        self.attempts = MAX_ATTEMPTS;
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }
}
