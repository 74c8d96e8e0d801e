//! Recovers outlet records from the free-form text of a discovery answer.
//!
//! The upstream cannot be forced into a response schema while map grounding
//! is on, so the answer is plain prose shaped by the prompt. Parsing is
//! recovery-oriented: a record with a usable name is always emitted, and any
//! field that cannot be found falls back to a sentinel instead of failing
//! the batch.
//!
//! Steps, per answer:
//! 1. strip emphasis punctuation (`*`, `#`, `_`);
//! 2. split into blocks on list markers (`1. `, `2. `, ...);
//! 3. per block: first line is the name, the remaining lines are searched
//!    for labelled fields (address, closing time, status, distance);
//! 4. classify urgency and build the map deep link.

use std::sync::LazyLock;

use chrono::{NaiveDateTime, Timelike};
use lastcall_core::{classify_urgency, Outlet, OutletStatus};
use percent_encoding::{utf8_percent_encode, NON_ALPHANUMERIC};
use regex::Regex;

/// Shown when no address line can be recovered.
pub const ADDRESS_FALLBACK: &str = "Address unknown";

/// Shown when no closing time line can be recovered.
pub const CLOSING_TIME_FALLBACK: &str = "Check hours";

const ADDRESS_KEYWORDS: &[&str] = &["address"];
const CLOSING_TIME_KEYWORDS: &[&str] = &["closing", "time"];
const STATUS_KEYWORDS: &[&str] = &["status"];
const DISTANCE_KEYWORDS: &[&str] = &["distance"];

static LIST_MARKER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+\.\s+").expect("valid regex"));

static NAME_LABEL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(store\s+)?name:\s*").expect("valid regex"));

/// Label without a colon, e.g. `"Closing Time 9:00 PM"` or `"Address - 1 Main St"`.
static FIELD_LABEL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(store\s+)?(address|closing\s+time|closing|time|status|distance)\b\s*[-–]?\s*")
        .expect("valid regex")
});

/// Removes markdown emphasis and heading punctuation from the whole text.
///
/// Idempotent: stripping twice yields the same text as stripping once.
#[must_use]
pub fn strip_markdown(text: &str) -> String {
    text.chars()
        .filter(|c| !matches!(c, '*' | '#' | '_'))
        .collect()
}

/// Builds the external map search link for an outlet.
///
/// The whole `name address` query is percent-encoded, so user text never
/// appears verbatim in the URL.
#[must_use]
pub fn build_map_url(maps_base_url: &str, name: &str, address: &str) -> String {
    let query = format!("{name} {address}");
    let encoded = utf8_percent_encode(&query, NON_ALPHANUMERIC);
    format!("{maps_base_url}?api=1&query={encoded}")
}

/// Turns discovery answers into outlet batches.
#[derive(Debug, Clone)]
pub struct ResponseParser {
    maps_base_url: String,
}

impl ResponseParser {
    #[must_use]
    pub fn new(maps_base_url: &str) -> Self {
        Self {
            maps_base_url: maps_base_url.to_string(),
        }
    }

    /// Parses `text` into outlets in answer order.
    ///
    /// `now` is the local wall clock used for urgency; `batch_millis` is
    /// embedded in every id so ids from different batches do not collide.
    /// Never fails: unusable blocks are dropped and an unusable answer
    /// yields an empty batch.
    #[must_use]
    pub fn parse(&self, text: &str, now: NaiveDateTime, batch_millis: i64) -> Vec<Outlet> {
        let cleaned = strip_markdown(text);
        let body = cleaned.trim_start();

        let starts_with_marker = LIST_MARKER_RE.find(body).is_some_and(|m| m.start() == 0);
        let mut segments = LIST_MARKER_RE.split(body);
        if !starts_with_marker {
            // Text before the first marker is an introduction, not a store.
            segments.next();
        }

        let outlets: Vec<Outlet> = segments
            .filter(|segment| !segment.trim().is_empty())
            .enumerate()
            .filter_map(|(index, block)| self.parse_block(block, index, now, batch_millis))
            .collect();

        tracing::debug!(count = outlets.len(), "parsed outlets from answer text");
        outlets
    }

    fn parse_block(
        &self,
        block: &str,
        index: usize,
        now: NaiveDateTime,
        batch_millis: i64,
    ) -> Option<Outlet> {
        let lines: Vec<&str> = block
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let (first, rest) = lines.split_first()?;
        if rest.is_empty() {
            tracing::debug!(index, "dropping single-line block");
            return None;
        }

        let name = NAME_LABEL_RE.replace(first, "").trim().to_string();
        if name.chars().count() <= 1 {
            tracing::debug!(index, "dropping block without a usable name");
            return None;
        }

        let address =
            labelled_value(rest, ADDRESS_KEYWORDS).unwrap_or_else(|| ADDRESS_FALLBACK.to_string());
        let closing_time = labelled_value(rest, CLOSING_TIME_KEYWORDS)
            .unwrap_or_else(|| CLOSING_TIME_FALLBACK.to_string());
        let status_text = labelled_value(rest, STATUS_KEYWORDS).unwrap_or_default();
        let distance = labelled_value(rest, DISTANCE_KEYWORDS);

        let status = if status_text.to_lowercase().contains("closed") {
            OutletStatus::Closed
        } else {
            OutletStatus::Open
        };
        let urgency = classify_urgency(status, block, now.hour());
        let map_url = build_map_url(&self.maps_base_url, &name, &address);

        Some(Outlet {
            id: format!("store-{index}-{batch_millis}"),
            name,
            address,
            status,
            closing_time,
            urgency,
            map_url,
            distance,
        })
    }
}

/// Value of the first line mentioning any of `keywords` (case-insensitive).
///
/// With a colon, everything after the first colon is the value, so
/// `"Closing Time: 9:00 PM"` yields `"9:00 PM"`. Without one, a leading
/// label is stripped. Empty values count as missing.
fn labelled_value(lines: &[&str], keywords: &[&str]) -> Option<String> {
    let line = lines.iter().find(|line| {
        let lower = line.to_lowercase();
        keywords.iter().any(|k| lower.contains(k))
    })?;

    let value = match line.split_once(':') {
        Some((_, after)) => after.trim().to_string(),
        None => FIELD_LABEL_RE.replace(line, "").trim().to_string(),
    };

    (!value.is_empty()).then_some(value)
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
