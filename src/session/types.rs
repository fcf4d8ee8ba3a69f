//! Session state and reconnect policy types

use std::time::Duration;

/// Connection state of a subscription session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    SubscriptionPending,
    Subscribed,
}

impl ConnectionState {
    /// Numeric encoding for the connection state gauge
    pub fn as_gauge(self) -> f64 {
        match self {
            ConnectionState::Disconnected => 0.0,
            ConnectionState::Connecting => 1.0,
            ConnectionState::Connected => 2.0,
            ConnectionState::SubscriptionPending => 3.0,
            ConnectionState::Subscribed => 4.0,
        }
    }
}

/// What to do when the broker cannot be reached or drops the connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconnectPolicy {
    /// Connect failure is an error; a disconnect ends the session
    FailFast,
    /// Reconnect with exponential backoff
    Retry {
        /// Attempts before giving up (0 = infinite)
        max_attempts: u32,
        initial_delay: Duration,
        max_delay: Duration,
    },
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        ReconnectPolicy::Retry {
            max_attempts: 10,
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(60),
        }
    }
}

/// Exponential backoff state for one run of reconnect attempts
#[derive(Debug, Clone)]
pub struct Backoff {
    attempts: u32,
    max_attempts: u32,
    initial_delay: Duration,
    delay: Duration,
    max_delay: Duration,
}

impl Backoff {
    pub fn new(max_attempts: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            attempts: 0,
            max_attempts,
            initial_delay,
            delay: initial_delay,
            max_delay,
        }
    }

    /// Register a failed attempt and return the delay before the next one,
    /// or `None` when the attempt budget is spent
    pub fn next_delay(&mut self) -> Option<Duration> {
        self.attempts += 1;
        if self.max_attempts > 0 && self.attempts >= self.max_attempts {
            return None;
        }
        let delay = self.delay;
        self.delay = (self.delay * 2).min(self.max_delay);
        Some(delay)
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    /// Start over after a successful connection
    pub fn reset(&mut self) {
        self.attempts = 0;
        self.delay = self.initial_delay;
    }
}

/// Errors that end a subscriber run
#[derive(Debug, thiserror::Error)]
pub enum SubscriberError {
    #[error("failed to connect to broker: {0}")]
    Connection(#[source] crate::broker::BrokerError),

    #[error("gave up reconnecting after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_and_caps() {
        let mut backoff = Backoff::new(0, Duration::from_millis(100), Duration::from_millis(350));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(100)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(200)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(350)));
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(350)));
        assert_eq!(backoff.attempts(), 4);
    }

    #[test]
    fn test_backoff_gives_up_after_max_attempts() {
        let mut backoff = Backoff::new(3, Duration::from_millis(10), Duration::from_secs(1));
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_some());
        assert!(backoff.next_delay().is_none());
        assert_eq!(backoff.attempts(), 3);
    }

    #[test]
    fn test_backoff_reset() {
        let mut backoff = Backoff::new(2, Duration::from_millis(10), Duration::from_secs(1));
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.attempts(), 0);
        assert_eq!(backoff.next_delay(), Some(Duration::from_millis(10)));
    }

    #[test]
    fn test_default_policy_retries() {
        assert!(matches!(
            ReconnectPolicy::default(),
            ReconnectPolicy::Retry { max_attempts: 10, .. }
        ));
    }

    #[test]
    fn test_connection_state_gauge_is_ordered() {
        assert!(
            ConnectionState::Disconnected.as_gauge() < ConnectionState::Subscribed.as_gauge()
        );
    }
}
