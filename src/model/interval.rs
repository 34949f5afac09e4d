//! Date-histogram interval parsing and key generation.
//!
//! Interval strings follow the engine's shorthand: `"1d"`, `"2h"`, `"30m"`,
//! `"10s"` (a missing count means 1), with the long unit names accepted too.
//! Monthly intervals (`"1M"`, `"3M"`) are handled separately since months
//! have no fixed length.

use chrono::{DateTime, Datelike, Duration, Months, TimeZone, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;

/// Pattern for fixed-length intervals (e.g. `1d`, `30m`, `hour`).
static FIXED_INTERVAL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d*)(s|second|m|minute|h|H|hour|d|day)$").unwrap()
});

/// Pattern for monthly intervals (e.g. `1M`, `3M`).
static MONTHLY_INTERVAL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)M$").unwrap());

/// A parsed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interval {
    /// A fixed number of seconds.
    Fixed(i64),
    /// A number of calendar months.
    Monthly(u32),
}

/// Parse an interval shorthand. Returns `None` for units this crate does not
/// generate keys for (weeks, years).
pub fn parse_interval(interval: &str) -> Option<Interval> {
    if let Some(caps) = FIXED_INTERVAL_PATTERN.captures(interval) {
        let count: i64 = caps[1].parse().unwrap_or(1);
        let unit_seconds = match &caps[2] {
            "s" | "second" => 1,
            "m" | "minute" => 60,
            "h" | "H" | "hour" => 3600,
            "d" | "day" => 86_400,
            _ => return None,
        };
        return Some(Interval::Fixed(count * unit_seconds));
    }

    if let Some(caps) = MONTHLY_INTERVAL_PATTERN.captures(interval) {
        let count: u32 = caps[1].parse().unwrap_or(1);
        return Some(Interval::Monthly(count));
    }

    None
}

/// Parse a signed offset string (`"+1d"`, `"-2h"`) into a duration.
pub fn parse_offset(offset: &str) -> Option<Duration> {
    let (negative, rest) = match offset.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, offset.strip_prefix('+').unwrap_or(offset)),
    };

    match parse_interval(rest)? {
        Interval::Fixed(seconds) => {
            let duration = Duration::seconds(seconds);
            Some(if negative { -duration } else { duration })
        }
        Interval::Monthly(_) => None,
    }
}

/// Parameters of a date-histogram dimension.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateHistogramSpec {
    pub interval: String,
    /// Lower extended bound; also anchors key generation.
    pub min: Option<DateTime<Utc>>,
    /// Upper extended bound.
    pub max: Option<DateTime<Utc>>,
    /// Bucket offset, e.g. `"+6h"`.
    pub offset: Option<String>,
}

impl DateHistogramSpec {
    pub fn new(interval: impl Into<String>) -> Self {
        Self {
            interval: interval.into(),
            min: None,
            max: None,
            offset: None,
        }
    }

    pub fn bounded(
        interval: impl Into<String>,
        min: DateTime<Utc>,
        max: DateTime<Utc>,
    ) -> Self {
        Self {
            interval: interval.into(),
            min: Some(min),
            max: Some(max),
            offset: None,
        }
    }

    pub fn with_offset(mut self, offset: impl Into<String>) -> Self {
        self.offset = Some(offset.into());
        self
    }

    /// Every bucket key (epoch milliseconds) the engine will report between
    /// the declared bounds, or `None` when the bounds are missing or the
    /// interval is not one this crate can step through.
    pub fn choice_keys(&self) -> Option<Vec<i64>> {
        let (min, max) = (self.min?, self.max?);

        match parse_interval(&self.interval)? {
            Interval::Fixed(step_seconds) => {
                // Buckets are aligned on the epoch, like the engine's.
                let rounded = min.timestamp().div_euclid(step_seconds) * step_seconds;
                let mut current = DateTime::from_timestamp(rounded, 0)?;
                if let Some(offset) = &self.offset {
                    current += parse_offset(offset)?;
                }

                let step = Duration::seconds(step_seconds);
                let mut keys = Vec::new();
                while current <= max {
                    keys.push(current.timestamp_millis());
                    current += step;
                }
                Some(keys)
            }
            Interval::Monthly(months) => {
                let mut current = Utc
                    .with_ymd_and_hms(min.year(), min.month(), 1, 0, 0, 0)
                    .single()?;

                let mut keys = Vec::new();
                while current <= max {
                    keys.push(current.timestamp_millis());
                    current = current.checked_add_months(Months::new(months))?;
                }
                Some(keys)
            }
        }
    }
}
