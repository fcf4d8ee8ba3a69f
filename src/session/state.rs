//! Subscription session state machine
//!
//! `Disconnected -> Connecting -> Connected -> SubscriptionPending -> Subscribed`,
//! with a disconnect returning to `Disconnected` from any state. The session
//! only does bookkeeping; it never gates frame dispatch.

use super::types::ConnectionState;
use std::collections::BTreeSet;

/// Subscriber intent and current connection state for a set of channels
#[derive(Debug, Clone)]
pub struct SubscriptionSession {
    channels: BTreeSet<String>,
    acknowledged: BTreeSet<String>,
    state: ConnectionState,
    last_error: Option<String>,
}

impl SubscriptionSession {
    pub fn new<I, S>(channels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            channels: channels.into_iter().map(Into::into).collect(),
            acknowledged: BTreeSet::new(),
            state: ConnectionState::Disconnected,
            last_error: None,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn channels(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(String::as_str)
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn is_acknowledged(&self, channel: &str) -> bool {
        self.acknowledged.contains(channel)
    }

    /// A connect attempt is starting
    pub fn begin_connect(&mut self) {
        self.transition(ConnectionState::Connecting);
    }

    /// Record the result of a connect attempt
    ///
    /// On success the session moves through `Connected` and returns the
    /// channels to subscribe, leaving the session in `SubscriptionPending`
    /// (or `Subscribed` when there is nothing to subscribe). On failure the
    /// error is kept and the session returns to `Disconnected`.
    pub fn on_connect(&mut self, result: Result<(), String>) -> Vec<String> {
        match result {
            Ok(()) => {
                self.last_error = None;
                self.acknowledged.clear();
                self.transition(ConnectionState::Connected);
                self.subscribe_requests()
            }
            Err(e) => {
                tracing::debug!(error = %e, "Connect attempt failed");
                self.last_error = Some(e);
                self.transition(ConnectionState::Disconnected);
                Vec::new()
            }
        }
    }

    /// Channels to subscribe; only issued from `Connected`
    fn subscribe_requests(&mut self) -> Vec<String> {
        if self.state != ConnectionState::Connected {
            return Vec::new();
        }
        if self.channels.is_empty() {
            self.transition(ConnectionState::Subscribed);
            return Vec::new();
        }
        self.transition(ConnectionState::SubscriptionPending);
        self.channels.iter().cloned().collect()
    }

    /// Record a subscribe acknowledgement, returning whether it was expected
    pub fn on_subscribe_ack(&mut self, channel: &str) -> bool {
        if !matches!(
            self.state,
            ConnectionState::SubscriptionPending | ConnectionState::Subscribed
        ) || !self.channels.contains(channel)
        {
            tracing::debug!(channel, state = ?self.state, "Unexpected subscribe ack");
            return false;
        }

        self.acknowledged.insert(channel.to_string());
        tracing::info!(channel, "Subscribed to channel");

        if self.state == ConnectionState::SubscriptionPending
            && self.acknowledged.len() == self.channels.len()
        {
            self.transition(ConnectionState::Subscribed);
        }
        true
    }

    /// The connection dropped; every channel must be subscribed again
    pub fn on_disconnect(&mut self, error: Option<String>) {
        self.acknowledged.clear();
        if error.is_some() {
            self.last_error = error;
        }
        self.transition(ConnectionState::Disconnected);
    }

    fn transition(&mut self, next: ConnectionState) {
        if self.state != next {
            tracing::debug!(from = ?self.state, to = ?next, "Session state change");
            self.state = next;
            crate::telemetry::set_connection_state(next);
        }
    }
}
