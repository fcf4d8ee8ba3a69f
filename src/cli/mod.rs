//! CLI interface for tick-subscriber
//!
//! `tick-subscriber [CHANNEL]` subscribes to one channel (default `ES1`) on
//! the configured broker and prints each tick to stdout.

mod run;

pub use run::run;

use crate::config::{Config, ReconnectMode};
use crate::tick::DecodeMode;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "tick-subscriber")]
#[command(about = "Subscribe to market tick channels on a Redis pub/sub broker")]
#[command(version)]
pub struct Cli {
    /// Channel to subscribe to; overrides the configured channel list
    pub channel: Option<String>,

    /// Path to configuration file
    #[arg(short, long, default_value = "config.toml")]
    pub config: String,

    /// Broker host
    #[arg(long)]
    pub host: Option<String>,

    /// Broker port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Exit on the first connect failure instead of retrying
    #[arg(long)]
    pub fail_fast: bool,

    /// Reject malformed numeric fields instead of reading them as zero
    #[arg(long)]
    pub strict: bool,
}

impl Cli {
    /// Apply command-line overrides on top of the file configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(channel) = &self.channel {
            config.subscription.channels = vec![channel.clone()];
        }
        if let Some(host) = &self.host {
            config.broker.host = host.clone();
        }
        if let Some(port) = self.port {
            config.broker.port = port;
        }
        if self.fail_fast {
            config.reconnect.policy = ReconnectMode::FailFast;
        }
        if self.strict {
            config.decode.mode = DecodeMode::Strict;
        }
    }
}
