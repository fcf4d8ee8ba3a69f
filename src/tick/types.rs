//! Tick record types

use serde::{Deserialize, Serialize};

/// Number of fields in a tick payload
pub const FIELD_COUNT: usize = 8;

/// Maximum length in bytes of the display-time field
pub const MAX_TIME_LEN: usize = 31;

/// One decoded market observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TickRecord {
    /// Exchange-provided bar label (e.g. "09:30:00"), at most 31 bytes
    pub formatted_time: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    /// Signed percent change
    pub percent_change: f64,
    /// Signed absolute change
    pub change: f64,
}

/// How numeric and time fields are validated
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeMode {
    /// Leading-prefix numeric parsing, 0 on failure; long time labels are truncated
    #[default]
    Permissive,
    /// Malformed numbers and over-long time labels are errors
    Strict,
}

/// Tick decoding errors
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DecodeError {
    #[error("expected {expected} fields, found {found}")]
    FieldCountMismatch { expected: usize, found: usize },

    #[error("invalid number in field {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },

    #[error("time field is {len} bytes, limit is 31")]
    TimeFieldTooLong { len: usize },
}
