//! Subscription session
//!
//! [`SubscriptionSession`] tracks connection state and per-channel
//! acknowledgements; [`Subscriber`] drives it against a live broker with
//! reconnect and backoff.

mod state;
mod subscriber;
mod types;

pub use state::SubscriptionSession;
pub use subscriber::Subscriber;
pub use types::{Backoff, ConnectionState, ReconnectPolicy, SubscriberError};
