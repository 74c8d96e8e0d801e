//! Wall-clock helpers for closing times such as `"9:00 PM"`.
//!
//! All instants are naive local date-times: the caller supplies "now" from
//! its own clock, which keeps these functions deterministic under test.

use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;
use thiserror::Error;

static CLOCK_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d{1,2}):(\d{2})\s*(AM|PM)").expect("valid regex")
});

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("unparseable clock time: {0:?}")]
    Unparseable(String),
}

/// Parses a 12-hour clock time and anchors it to the calendar date of `now`.
///
/// The first `H:MM AM|PM` occurrence in `s` is used, so surrounding text
/// (`"Closes at 9:00 PM today"`) is tolerated. Seconds are zero. A time that
/// has already passed today is *not* rolled forward to tomorrow.
///
/// # Errors
///
/// Returns [`TimeError::Unparseable`] when no match is found or the hour is
/// outside 1..=12 or the minute outside 0..=59.
pub fn parse_clock_time(s: &str, now: NaiveDateTime) -> Result<NaiveDateTime, TimeError> {
    let unparseable = || TimeError::Unparseable(s.to_string());

    let caps = CLOCK_TIME_RE.captures(s).ok_or_else(unparseable)?;
    let hour: u32 = caps[1].parse().map_err(|_| unparseable())?;
    let minute: u32 = caps[2].parse().map_err(|_| unparseable())?;
    let pm = caps[3].eq_ignore_ascii_case("pm");

    if !(1..=12).contains(&hour) || minute > 59 {
        return Err(unparseable());
    }

    let hour24 = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, true) => h + 12,
        (h, false) => h,
    };

    now.date()
        .and_hms_opt(hour24, minute, 0)
        .ok_or_else(unparseable)
}

/// Signed minutes from `now` until `instant`. Negative means already past.
#[must_use]
pub fn minutes_until(instant: NaiveDateTime, now: NaiveDateTime) -> f64 {
    // Millisecond spans within a day are far below f64's exact-integer limit.
    #[allow(clippy::cast_precision_loss)]
    let millis = (instant - now).num_milliseconds() as f64;
    millis / 60_000.0
}
