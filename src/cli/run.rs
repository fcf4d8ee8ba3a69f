//! Run command implementation

use crate::broker::RedisBroker;
use crate::config::Config;
use crate::dispatch::{Dispatcher, StdoutSink, SystemClock};
use crate::session::{SubscriptionSession, Subscriber};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Subscribe and print ticks until Ctrl-C or an unrecoverable connection failure
pub async fn run(config: Config) -> anyhow::Result<()> {
    let addr = config.broker.address();
    let channels = config.subscription.channels.clone();

    tracing::info!(%addr, ?channels, mode = ?config.decode.mode, "Starting subscriber");

    let dispatcher = Dispatcher::new(
        config.decode.mode,
        Box::new(StdoutSink),
        Arc::new(SystemClock),
    );
    let mut subscriber = Subscriber::new(
        RedisBroker::new(config.broker.connect_timeout()),
        addr,
        config.reconnect.policy(),
        SubscriptionSession::new(channels),
        dispatcher,
    );

    let shutdown = CancellationToken::new();
    let signal_token = shutdown.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("Shutdown requested");
            signal_token.cancel();
        }
    });

    subscriber.run(shutdown).await?;
    Ok(())
}
