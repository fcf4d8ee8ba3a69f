//! Prometheus metrics

use crate::session::ConnectionState;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

const FRAMES_TOTAL: &str = "ticksub_frames_total";
const DECODE_FAILURES_TOTAL: &str = "ticksub_decode_failures_total";
const RECONNECTS_TOTAL: &str = "ticksub_reconnects_total";
const CONNECTION_STATE: &str = "ticksub_connection_state";

/// Start the Prometheus exporter on `0.0.0.0:port`
pub fn init_metrics(port: u16) -> anyhow::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| anyhow::anyhow!("Failed to start metrics exporter: {}", e))?;
    tracing::info!(%addr, "Metrics exporter listening");
    Ok(())
}

/// Count a dispatched frame by outcome label
pub fn record_frame(outcome: &'static str) {
    ::metrics::counter!(FRAMES_TOTAL, "outcome" => outcome).increment(1);
    if outcome == "decode_failed" {
        ::metrics::counter!(DECODE_FAILURES_TOTAL).increment(1);
    }
}

/// Count a scheduled reconnect attempt
pub fn record_reconnect() {
    ::metrics::counter!(RECONNECTS_TOTAL).increment(1);
}

/// Publish the current session state
pub fn set_connection_state(state: ConnectionState) {
    ::metrics::gauge!(CONNECTION_STATE).set(state.as_gauge());
}
