//! Tick decoding and rendering
//!
//! Turns a `;`-delimited tick payload into a [`TickRecord`] and formats it
//! as the human-facing output line.

mod decoder;
mod render;
mod types;

pub use decoder::decode;
pub use render::render;
pub use types::{DecodeError, DecodeMode, TickRecord, FIELD_COUNT, MAX_TIME_LEN};
