//! Message dispatcher

use super::sink::{Clock, OutputSink};
use super::types::{DispatchOutcome, FrameKind, RawFrame};
use crate::session::SubscriptionSession;
use crate::telemetry;
use crate::tick::{self, DecodeMode};
use std::sync::Arc;

/// Routes frames to decode+render or to session bookkeeping
///
/// Per-frame failures are reported to the sink and never propagate, so one
/// bad frame cannot affect the ones after it.
pub struct Dispatcher {
    mode: DecodeMode,
    sink: Box<dyn OutputSink>,
    clock: Arc<dyn Clock>,
}

impl Dispatcher {
    pub fn new(mode: DecodeMode, sink: Box<dyn OutputSink>, clock: Arc<dyn Clock>) -> Self {
        Self { mode, sink, clock }
    }

    /// Dispatch one frame, writing its rendered or diagnostic line
    pub fn dispatch(
        &mut self,
        frame: RawFrame,
        session: &mut SubscriptionSession,
    ) -> DispatchOutcome {
        let outcome = match (frame.kind, frame.channel, frame.payload) {
            (FrameKind::Data, Some(channel), Some(payload)) => {
                match tick::decode(&payload, self.mode) {
                    Ok(record) => {
                        let line = tick::render(&channel, &record, self.clock.local_time());
                        self.emit(&line);
                        DispatchOutcome::Rendered(line)
                    }
                    Err(error) => {
                        tracing::debug!(%channel, %error, "Tick decode failed");
                        self.emit(&format!("Error: Failed to parse stock data: {payload}"));
                        DispatchOutcome::DecodeFailed { payload, error }
                    }
                }
            }
            (FrameKind::SubscribeAck, Some(channel), Some(_)) => {
                session.on_subscribe_ack(&channel);
                DispatchOutcome::Ignored
            }
            (FrameKind::Other(kind), Some(channel), Some(_)) => {
                tracing::debug!(%kind, %channel, "Ignoring pub/sub frame");
                DispatchOutcome::Ignored
            }
            (kind, _, _) => {
                tracing::debug!(?kind, "Frame without channel or payload");
                self.emit("Unexpected reply format");
                DispatchOutcome::Unrecognized
            }
        };

        telemetry::record_frame(outcome.label());
        outcome
    }

    fn emit(&mut self, line: &str) {
        if let Err(e) = self.sink.write_line(line) {
            tracing::warn!(error = %e, "Failed to write output line");
        }
    }
}
