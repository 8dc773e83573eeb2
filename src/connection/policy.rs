use std::time::Duration;

/// Decision for the next reconnection step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    /// Wait this long, then attempt again.
    Retry(Duration),
    /// Attempts exhausted; stop trying.
    GiveUp,
}

/// Linear backoff with a hard attempt ceiling.
///
/// The wait after the n-th consecutive failure is `base_delay * n`,
/// growing without an upper cap. `max_attempts = 0` disables
/// reconnection entirely: the first failure is terminal.
#[derive(Debug, Clone)]
pub struct ReconnectPolicy {
    base_delay: Duration,
    max_attempts: u32,
}

impl ReconnectPolicy {
    pub fn new(base_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base_delay,
            max_attempts,
        }
    }

    /// Decide what to do after the `attempt`-th consecutive failure
    /// (1-indexed).
    pub fn decide(&self, attempt: u32) -> ReconnectDecision {
        if attempt > self.max_attempts {
            ReconnectDecision::GiveUp
        } else {
            ReconnectDecision::Retry(self.base_delay * attempt)
        }
    }
}
