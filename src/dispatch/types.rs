//! Frame and outcome types

use crate::tick::DecodeError;

/// Pub/sub frame kind, named after the broker's push message types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameKind {
    /// `message`: published data on a subscribed channel
    Data,
    /// `subscribe`: acknowledgement of a subscribe request
    SubscribeAck,
    /// Anything else, carrying the kind as received
    Other(String),
}

impl FrameKind {
    pub fn parse(kind: &str) -> Self {
        match kind {
            "message" => FrameKind::Data,
            "subscribe" => FrameKind::SubscribeAck,
            other => FrameKind::Other(other.to_string()),
        }
    }
}

/// One inbound notification from the broker
///
/// `channel` and `payload` are `None` when the reply did not have the
/// `[kind, channel, payload]` shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    pub kind: FrameKind,
    pub channel: Option<String>,
    pub payload: Option<String>,
}

impl RawFrame {
    /// Data frame carrying a tick payload
    pub fn message(channel: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Data,
            channel: Some(channel.into()),
            payload: Some(payload.into()),
        }
    }

    /// Subscribe acknowledgement with the broker's subscription count
    pub fn subscribe_ack(channel: impl Into<String>, count: i64) -> Self {
        Self {
            kind: FrameKind::SubscribeAck,
            channel: Some(channel.into()),
            payload: Some(count.to_string()),
        }
    }

    /// Frame whose shape could not be interpreted
    pub fn malformed(description: impl Into<String>) -> Self {
        Self {
            kind: FrameKind::Other(description.into()),
            channel: None,
            payload: None,
        }
    }
}

/// Effect of dispatching one frame
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// Tick decoded and this line written to the sink
    Rendered(String),
    /// Frame understood, nothing to output
    Ignored,
    /// Data frame whose payload could not be decoded
    DecodeFailed { payload: String, error: DecodeError },
    /// Frame shape not understood
    Unrecognized,
}

impl DispatchOutcome {
    /// Metric label for this outcome
    pub fn label(&self) -> &'static str {
        match self {
            DispatchOutcome::Rendered(_) => "rendered",
            DispatchOutcome::Ignored => "ignored",
            DispatchOutcome::DecodeFailed { .. } => "decode_failed",
            DispatchOutcome::Unrecognized => "unrecognized",
        }
    }
}
