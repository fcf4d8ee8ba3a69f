//! Subscriber supervisor
//!
//! Drives one subscription session against the broker: connect, subscribe,
//! dispatch frames in arrival order and reconnect according to the
//! [`ReconnectPolicy`].

use super::state::SubscriptionSession;
use super::types::{Backoff, ReconnectPolicy, SubscriberError};
use crate::broker::{Broker, BrokerAddress, BrokerConnection, BrokerError};
use crate::dispatch::Dispatcher;
use crate::telemetry;
use std::time::Duration;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;

/// Why a connected session ended
enum SessionEnd {
    Shutdown,
    Closed,
    Failed(BrokerError),
}

/// Owns the session, the dispatcher and the broker connector
pub struct Subscriber<B: Broker> {
    broker: B,
    addr: BrokerAddress,
    policy: ReconnectPolicy,
    session: SubscriptionSession,
    dispatcher: Dispatcher,
}

impl<B: Broker> Subscriber<B> {
    pub fn new(
        broker: B,
        addr: BrokerAddress,
        policy: ReconnectPolicy,
        session: SubscriptionSession,
        dispatcher: Dispatcher,
    ) -> Self {
        Self {
            broker,
            addr,
            policy,
            session,
            dispatcher,
        }
    }

    pub fn session(&self) -> &SubscriptionSession {
        &self.session
    }

    /// Run until shutdown, a fail-fast disconnect, or an unrecoverable
    /// connection failure
    ///
    /// Only connection failures are returned as errors; per-frame problems
    /// are reported by the dispatcher and never end the run.
    pub async fn run(&mut self, shutdown: CancellationToken) -> Result<(), SubscriberError> {
        let mut backoff = match self.policy {
            ReconnectPolicy::FailFast => None,
            ReconnectPolicy::Retry {
                max_attempts,
                initial_delay,
                max_delay,
            } => Some(Backoff::new(max_attempts, initial_delay, max_delay)),
        };

        loop {
            self.session.begin_connect();
            let connected = tokio::select! {
                _ = shutdown.cancelled() => {
                    self.session.on_disconnect(None);
                    return Ok(());
                }
                result = self.broker.connect(&self.addr) => result,
            };

            let mut conn = match connected {
                Ok(conn) => conn,
                Err(e) => {
                    tracing::error!(addr = %self.addr, error = %e, "Failed to connect to broker");
                    self.session.on_connect(Err(e.to_string()));
                    let Some(backoff) = backoff.as_mut() else {
                        return Err(SubscriberError::Connection(e));
                    };
                    let delay = next_attempt(backoff, &e.to_string())?;
                    if !wait(delay, &shutdown).await {
                        return Ok(());
                    }
                    continue;
                }
            };

            if let Some(backoff) = backoff.as_mut() {
                backoff.reset();
            }
            let channels = self.session.on_connect(Ok(()));
            let end = self.pump(&mut conn, channels, &shutdown).await;
            conn.close().await;

            let last_error = match end {
                SessionEnd::Shutdown => {
                    self.session.on_disconnect(None);
                    tracing::info!("Subscriber shut down");
                    return Ok(());
                }
                SessionEnd::Closed => {
                    tracing::warn!(addr = %self.addr, "Disconnected from broker");
                    self.session.on_disconnect(None);
                    BrokerError::Closed.to_string()
                }
                SessionEnd::Failed(e) => {
                    tracing::error!(addr = %self.addr, error = %e, "Disconnected from broker");
                    self.session.on_disconnect(Some(e.to_string()));
                    e.to_string()
                }
            };

            let Some(backoff) = backoff.as_mut() else {
                return Ok(());
            };
            let delay = next_attempt(backoff, &last_error)?;
            if !wait(delay, &shutdown).await {
                return Ok(());
            }
        }
    }

    /// Subscribe every channel, then dispatch frames until the connection ends
    async fn pump(
        &mut self,
        conn: &mut B::Connection,
        channels: Vec<String>,
        shutdown: &CancellationToken,
    ) -> SessionEnd {
        let subscribe_all = async {
            for channel in &channels {
                conn.subscribe(channel).await?;
            }
            Ok::<(), BrokerError>(())
        };
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => return SessionEnd::Shutdown,
            result = subscribe_all => {
                if let Err(e) = result {
                    return SessionEnd::Failed(e);
                }
            }
        }

        loop {
            tokio::select! {
                biased;
                _ = shutdown.cancelled() => return SessionEnd::Shutdown,
                frame = conn.next_frame() => match frame {
                    Some(Ok(frame)) => {
                        self.dispatcher.dispatch(frame, &mut self.session);
                    }
                    Some(Err(e)) => return SessionEnd::Failed(e),
                    None => return SessionEnd::Closed,
                },
            }
        }
    }
}

/// Delay before the next connect attempt, or the error ending the run
fn next_attempt(backoff: &mut Backoff, last_error: &str) -> Result<Duration, SubscriberError> {
    match backoff.next_delay() {
        Some(delay) => {
            telemetry::record_reconnect();
            tracing::warn!(
                attempt = backoff.attempts(),
                delay_ms = delay.as_millis() as u64,
                "Reconnecting to broker"
            );
            Ok(delay)
        }
        None => {
            tracing::error!(attempts = backoff.attempts(), "Max reconnection attempts reached");
            Err(SubscriberError::RetriesExhausted {
                attempts: backoff.attempts(),
                last_error: last_error.to_string(),
            })
        }
    }
}

/// Sleep for `delay`; false if shutdown was requested first
async fn wait(delay: Duration, shutdown: &CancellationToken) -> bool {
    tokio::select! {
        _ = shutdown.cancelled() => false,
        _ = sleep(delay) => true,
    }
}
