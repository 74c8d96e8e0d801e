//! Plain-text rendering of outlets and session snapshots.

use std::fmt::Write as _;

use lastcall_core::{Outlet, OutletStatus};
use lastcall_session::SessionSnapshot;

const NAME_WIDTH: usize = 28;

pub(crate) const NO_STORES_MESSAGE: &str =
    "No stores found nearby. Try broadening your search or checking later.";

/// Table of outlets, one row each, followed by its map link.
pub(crate) fn render_outlets(outlets: &[Outlet]) -> String {
    if outlets.is_empty() {
        return format!("{NO_STORES_MESSAGE}\n");
    }

    let mut out = format!(
        "{:<30}{:<14}{:<14}{:<9}{:<12}ADDRESS\n",
        "NAME", "STATUS", "CLOSES", "URGENCY", "DISTANCE"
    );
    for outlet in outlets {
        let closes = if outlet.status == OutletStatus::Closed {
            format!("since {}", outlet.closing_time)
        } else {
            outlet.closing_time.clone()
        };
        let status = outlet.display_status().to_string();
        let urgency = outlet.urgency.to_string();
        let _ = writeln!(
            out,
            "{:<30}{:<14}{:<14}{:<9}{:<12}{}",
            truncate(&outlet.name, NAME_WIDTH),
            status,
            closes,
            urgency,
            outlet.distance.as_deref().unwrap_or("\u{2014}"),
            outlet.address
        );
        let _ = writeln!(out, "    {}", outlet.map_url);
    }
    out
}

/// Full screen for one session snapshot.
pub(crate) fn render_snapshot(snapshot: &SessionSnapshot) -> String {
    let mut out = String::from("LAST CALL");
    if let Some(position) = snapshot.position {
        let _ = write!(out, "  @ {position}");
    }
    let _ = writeln!(
        out,
        "  alerts: {}  refreshes: {}",
        if snapshot.alerts_enabled { "on" } else { "off" },
        snapshot.refresh_count
    );

    if let Some(error) = &snapshot.error {
        let _ = writeln!(out, "! {error}");
    }
    if let Some(hint) = &snapshot.hint {
        let _ = writeln!(out, "i {hint}");
    }

    let located = snapshot.position.is_some();
    let has_results = snapshot.error.is_none() || !snapshot.outlets.is_empty();
    if located && snapshot.loading {
        out.push_str("Searching nearby stores...\n");
    } else if located && has_results {
        out.push_str(&render_outlets(&snapshot.outlets));
    }

    if let Some(next) = &snapshot.next_closing {
        let _ = writeln!(out, "Next closing: {} at {}", next.name, next.closing_time);
    }
    out.push_str("[r] refresh  [a] toggle alerts  [q] quit\n");
    out
}

fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars - 3).collect::<String>())
    } else {
        s.to_string()
    }
}
