//! Broker pub/sub connection
//!
//! The subscriber talks to the broker through the [`Broker`] and
//! [`BrokerConnection`] traits; [`RedisBroker`] implements them over TCP
//! with the RESP protocol.

mod redis;
mod resp;
mod types;

pub use redis::{frame_from_reply, RedisBroker, RedisConnection};
pub use resp::{RespCodec, RespError, RespValue};
pub use types::{BrokerAddress, BrokerError};

use crate::dispatch::RawFrame;
use async_trait::async_trait;

/// Establishes broker connections
#[async_trait]
pub trait Broker: Send + Sync {
    type Connection: BrokerConnection;

    /// Connect to the broker at `addr`
    async fn connect(&self, addr: &BrokerAddress) -> Result<Self::Connection, BrokerError>;
}

/// An established pub/sub connection
#[async_trait]
pub trait BrokerConnection: Send {
    /// Send a subscribe request for `channel`
    async fn subscribe(&mut self, channel: &str) -> Result<(), BrokerError>;

    /// Wait for the next frame; `None` once the broker closed the connection
    async fn next_frame(&mut self) -> Option<Result<RawFrame, BrokerError>>;

    /// Release the connection
    async fn close(&mut self);
}
