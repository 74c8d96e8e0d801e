//! Coarse urgency tint for outlet cards.
//!
//! Deliberately time-of-day based. The precise "closes within the hour"
//! check lives in the alert scheduler, which parses the closing time.

use crate::types::{OutletStatus, Urgency};

/// Local hour from which every open outlet is treated as urgent.
pub const LATE_HOUR: u32 = 21;

/// Local hour from which open outlets are at least medium urgency.
pub const EVENING_HOUR: u32 = 18;

/// Classifies an outlet from its status, the raw answer block it was parsed
/// from, and the current local hour (0..=23).
///
/// Closed outlets are always [`Urgency::Low`].
#[must_use]
pub fn classify_urgency(status: OutletStatus, source_block: &str, local_hour: u32) -> Urgency {
    if status == OutletStatus::Closed {
        return Urgency::Low;
    }

    if source_block.to_lowercase().contains("soon") || local_hour >= LATE_HOUR {
        Urgency::High
    } else if local_hour >= EVENING_HOUR {
        Urgency::Medium
    } else {
        Urgency::Low
    }
}
