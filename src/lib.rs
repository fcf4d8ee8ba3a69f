//! tick-subscriber: real-time market tick subscriber for Redis pub/sub
//!
//! This library provides the core components for:
//! - Decoding `;`-delimited tick payloads into structured records
//! - Rendering ticks as human-readable output lines
//! - Dispatching pub/sub frames to the tick pipeline
//! - Subscription session tracking with reconnect and backoff
//! - A RESP client for the Redis pub/sub protocol
//! - Logging and metrics

pub mod broker;
pub mod cli;
pub mod config;
pub mod dispatch;
pub mod session;
pub mod telemetry;
pub mod tick;
