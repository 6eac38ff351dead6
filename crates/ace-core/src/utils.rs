//! Formatting helpers for contact rows

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};

/// Zone contact timestamps are rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayZone {
    /// The viewer's local zone
    Local,
    /// A fixed offset from UTC
    Fixed(FixedOffset),
}

impl DisplayZone {
    /// Fixed zone from an offset in minutes east of UTC, if the offset is valid
    #[must_use]
    pub fn from_offset_minutes(minutes: i32) -> Option<Self> {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::Fixed)
    }

    /// UTC
    #[must_use]
    pub fn utc() -> Self {
        Self::Fixed(Utc.fix())
    }

    fn format(self, instant: DateTime<Utc>, pattern: &str) -> String {
        match self {
            Self::Local => instant.with_timezone(&Local).format(pattern).to_string(),
            Self::Fixed(offset) => instant.with_timezone(&offset).format(pattern).to_string(),
        }
    }
}

/// Format a millisecond count as zero-padded `HH:MM:SS`.
///
/// Negative counts render as zero. Hours are not wrapped at a day.
#[must_use]
pub fn format_duration_millis(millis: i64) -> String {
    let total_seconds = millis.max(0) / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Contact date as `M/D/YYYY`
#[must_use]
pub fn format_contact_date(instant: DateTime<Utc>, zone: DisplayZone) -> String {
    zone.format(instant, "%-m/%-d/%Y")
}

/// Contact time as a 12-hour `hh:MM AM` clock
#[must_use]
pub fn format_contact_time(instant: DateTime<Utc>, zone: DisplayZone) -> String {
    zone.format(instant, "%I:%M %p")
}
