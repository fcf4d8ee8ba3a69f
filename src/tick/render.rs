//! Tick output line formatting

use super::types::TickRecord;
use chrono::NaiveTime;

/// Format a tick as `HH:MM:SS (<fmttime>) <channel> <close> <change> <percent>%`
pub fn render(channel: &str, record: &TickRecord, received_at: NaiveTime) -> String {
    format!(
        "{} ({}) {} {:.2} {:+.2} {:+.3}%",
        received_at.format("%H:%M:%S"),
        record.formatted_time,
        channel,
        record.close,
        record.change,
        record.percent_change,
    )
}
