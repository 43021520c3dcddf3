//! Date normalization for published timestamps.
//!
//! Sources report dates in whatever format they like: Atom and JSON APIs use
//! ISO-8601, RSS uses RFC 2822, some feeds omit the offset entirely. Every
//! item leaves the pipeline with the same shape:
//!
//! ```text
//! 2025-05-06T14:30:00+00:00
//! ```
//!
//! Parsing is an ordered list of strategies tried until one succeeds; if none
//! does the current instant in UTC is used instead.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use tracing::warn;

/// A single parse attempt. Returns `None` when the input is not in its format.
type Strategy = fn(&str) -> Option<DateTime<FixedOffset>>;

/// Strategies in priority order.
const STRATEGIES: &[(&str, Strategy)] = &[("iso8601", parse_iso8601), ("rfc2822", parse_rfc2822)];

/// ISO-8601 layouts with an explicit offset that RFC 3339 does not accept.
const OFFSET_ISO_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M%z",
];

/// Offset-less ISO-8601 layouts. A missing offset means UTC.
const NAIVE_ISO_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

/// Normalize a free-form date string to ISO-8601 with seconds precision and an
/// explicit offset.
///
/// # Arguments
///
/// * `raw` - The date as the source reported it, or `None` if it had none
///
/// # Returns
///
/// A `YYYY-MM-DDTHH:MM:SS+HH:MM` string. `None` yields the current instant.
/// A string no strategy understands is logged and also yields the current
/// instant, so an item is never dropped because of its date.
pub fn normalize_date(raw: Option<&str>) -> String {
    let Some(raw) = raw else {
        return now_iso();
    };
    let trimmed = raw.trim();

    for (name, strategy) in STRATEGIES {
        if let Some(dt) = strategy(trimmed) {
            tracing::trace!(strategy = *name, raw = %trimmed, "Parsed date");
            return format_iso(&dt);
        }
    }

    warn!(raw = %trimmed, "Unrecognized date format; using current time");
    now_iso()
}

/// Current instant in UTC, formatted like every other normalized date.
pub fn now_iso() -> String {
    format_iso(&Utc::now().fixed_offset())
}

fn format_iso(dt: &DateTime<FixedOffset>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, false)
}

fn parse_iso8601(s: &str) -> Option<DateTime<FixedOffset>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    for fmt in OFFSET_ISO_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in NAIVE_ISO_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc().fixed_offset())
}

fn parse_rfc2822(s: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc2822(s).ok()
}
