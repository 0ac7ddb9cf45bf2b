//! Timestamps in the archived site's timezone

use chrono::{DateTime, FixedOffset, Offset, TimeZone, Utc};

/// Layout used for every human-readable timestamp (run log, snapshot footer)
pub const TIMESTAMP_FORMAT: &str = "%Y/%-m/%-d %H:%M:%S";

/// Formats instants in the site's configured UTC offset
#[derive(Debug, Clone, Copy)]
pub struct SiteClock {
    offset: FixedOffset,
}

impl SiteClock {
    /// Creates a clock for a whole-hour UTC offset
    ///
    /// Offsets outside chrono's range fall back to UTC; configuration
    /// validation keeps them within [-12, 14].
    pub fn new(utc_offset_hours: i32) -> Self {
        let offset = FixedOffset::east_opt(utc_offset_hours * 3600).unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    /// Current time in the site's timezone
    pub fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.offset)
    }

    /// Formats an instant in the site's timezone
    pub fn format(&self, instant: DateTime<Utc>) -> String {
        self.offset
            .from_utc_datetime(&instant.naive_utc())
            .format(TIMESTAMP_FORMAT)
            .to_string()
    }

    /// Current time, formatted
    pub fn timestamp(&self) -> String {
        self.format(Utc::now())
    }
}

impl Default for SiteClock {
    fn default() -> Self {
        Self::new(8)
    }
}
