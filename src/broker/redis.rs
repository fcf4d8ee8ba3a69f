//! Redis pub/sub connection over TCP

use super::resp::{RespCodec, RespValue};
use super::types::{BrokerAddress, BrokerError};
use super::{Broker, BrokerConnection};
use crate::dispatch::{FrameKind, RawFrame};
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_util::codec::Framed;

/// Connects to a Redis server for pub/sub
#[derive(Debug, Clone)]
pub struct RedisBroker {
    connect_timeout: Duration,
}

impl RedisBroker {
    pub fn new(connect_timeout: Duration) -> Self {
        Self { connect_timeout }
    }
}

impl Default for RedisBroker {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

#[async_trait]
impl Broker for RedisBroker {
    type Connection = RedisConnection;

    async fn connect(&self, addr: &BrokerAddress) -> Result<RedisConnection, BrokerError> {
        tracing::info!(%addr, "Connecting to broker");

        let stream = timeout(
            self.connect_timeout,
            TcpStream::connect((addr.host.as_str(), addr.port)),
        )
        .await
        .map_err(|_| BrokerError::ConnectTimeout {
            addr: addr.to_string(),
        })?
        .map_err(|source| BrokerError::Connect {
            addr: addr.to_string(),
            source,
        })?;

        if let Err(e) = stream.set_nodelay(true) {
            tracing::debug!(error = %e, "Failed to set TCP_NODELAY");
        }

        tracing::info!(%addr, "Broker connected");
        Ok(RedisConnection::from_stream(stream))
    }
}

/// Established Redis connection in subscriber mode
pub struct RedisConnection<S = TcpStream> {
    framed: Framed<S, RespCodec>,
}

impl<S> RedisConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    /// Wrap an already-connected byte stream
    pub fn from_stream(stream: S) -> Self {
        Self {
            framed: Framed::new(stream, RespCodec),
        }
    }
}

#[async_trait]
impl<S> BrokerConnection for RedisConnection<S>
where
    S: AsyncRead + AsyncWrite + Unpin + Send,
{
    async fn subscribe(&mut self, channel: &str) -> Result<(), BrokerError> {
        tracing::debug!(channel, "Sending SUBSCRIBE");
        self.framed
            .send(RespValue::command(["SUBSCRIBE", channel]))
            .await?;
        Ok(())
    }

    async fn next_frame(&mut self) -> Option<Result<RawFrame, BrokerError>> {
        let reply = self.framed.next().await?;
        Some(reply.map(frame_from_reply).map_err(BrokerError::from))
    }

    async fn close(&mut self) {
        if let Err(e) = SinkExt::<RespValue>::close(&mut self.framed).await {
            tracing::debug!(error = %e, "Error closing broker connection");
        }
    }
}

/// Interpret a reply as a pub/sub frame
///
/// Pub/sub replies are arrays of at least three elements:
/// `[kind, channel, payload]`. Anything else becomes a frame with no
/// channel or payload.
pub fn frame_from_reply(reply: RespValue) -> RawFrame {
    match reply {
        RespValue::Array(Some(items)) if items.len() >= 3 => match items[0].as_text() {
            Some(kind) => RawFrame {
                kind: FrameKind::parse(&kind),
                channel: items[1].as_text(),
                payload: items[2].as_text(),
            },
            None => RawFrame::malformed(format!("array with {} kind", items[0].type_name())),
        },
        RespValue::Array(Some(items)) => {
            RawFrame::malformed(format!("array of {} elements", items.len()))
        }
        other => RawFrame::malformed(other.type_name()),
    }
}
