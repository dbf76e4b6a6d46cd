//! Reconnection policy.
//!
//! Pure decisions, kept apart from the session so they are easy to test.

use std::time::Duration;

use crate::error::ClientError;

/// Errors after which joining cannot succeed no matter how often we retry
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::Media(_))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReconnectPolicy {
    pub max_attempts: u32,
    pub interval: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            interval: Duration::from_secs(5),
        }
    }
}

impl ReconnectPolicy {
    /// How long to wait before attempt `failed_attempts + 1`, or `None` to
    /// give up.
    ///
    /// # Arguments
    ///
    /// * `error` - Why the previous session ended
    /// * `failed_attempts` - Sessions that have failed so far (1 after the first failure)
    pub fn next_delay(&self, error: &ClientError, failed_attempts: u32) -> Option<Duration> {
        if should_exit_immediately(error) || failed_attempts >= self.max_attempts {
            return None;
        }
        Some(self.interval)
    }
}
