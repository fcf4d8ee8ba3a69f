//! Frame dispatch
//!
//! Classifies inbound broker frames and routes them to the tick pipeline or
//! to the subscription session.

mod dispatcher;
mod sink;
mod types;

pub use dispatcher::Dispatcher;
pub use sink::{Clock, FixedClock, MemorySink, OutputSink, StdoutSink, SystemClock};
pub use types::{DispatchOutcome, FrameKind, RawFrame};
