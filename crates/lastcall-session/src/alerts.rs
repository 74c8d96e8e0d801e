//! Closing alerts: at most one notification per outlet while alerts stay on.

use std::collections::HashSet;

use chrono::NaiveDateTime;
use lastcall_core::{minutes_until, parse_clock_time, Outlet, OutletStatus};

use crate::host::{Notification, Notifier};

pub const ALERT_TITLE: &str = "Last Call Alert!";

pub const ALERT_ICON_URL: &str = "https://www.gstatic.com/images/icons/material/system/2x/local_bar_black_48dp.png";

#[must_use]
pub fn closing_alert(outlet: &Outlet) -> Notification {
    Notification {
        title: ALERT_TITLE.to_string(),
        body: format!(
            "{} is closing at {}. Better hurry!",
            outlet.name, outlet.closing_time
        ),
        icon_url: ALERT_ICON_URL.to_string(),
    }
}

/// Dispatches closing alerts and remembers which outlets were already alerted.
#[derive(Debug)]
pub struct AlertScheduler {
    ledger: HashSet<String>,
    window_minutes: f64,
}

impl AlertScheduler {
    #[must_use]
    pub fn new(window_minutes: u32) -> Self {
        Self {
            ledger: HashSet::new(),
            window_minutes: f64::from(window_minutes),
        }
    }

    /// Inspects `outlets` in batch order and notifies for every open outlet
    /// closing within the window that has not been alerted yet.
    ///
    /// Returns the number of notifications shown. A failed dispatch is not
    /// recorded, so the outlet is retried on the next tick.
    pub fn tick<N>(&mut self, outlets: &[Outlet], now: NaiveDateTime, notifier: &N) -> usize
    where
        N: Notifier + ?Sized,
    {
        let mut dispatched = 0;

        for outlet in outlets {
            if outlet.status != OutletStatus::Open || self.ledger.contains(&outlet.id) {
                continue;
            }
            let Ok(closing) = parse_clock_time(&outlet.closing_time, now) else {
                continue;
            };

            let delta = minutes_until(closing, now);
            if delta <= 0.0 || delta > self.window_minutes {
                continue;
            }

            match notifier.show(&closing_alert(outlet)) {
                Ok(()) => {
                    tracing::info!(
                        outlet_id = %outlet.id,
                        name = %outlet.name,
                        minutes_left = delta,
                        "closing alert dispatched"
                    );
                    self.ledger.insert(outlet.id.clone());
                    dispatched += 1;
                }
                Err(e) => {
                    tracing::warn!(outlet_id = %outlet.id, error = %e, "closing alert failed");
                }
            }
        }

        dispatched
    }

    #[must_use]
    pub fn was_dispatched(&self, outlet_id: &str) -> bool {
        self.ledger.contains(outlet_id)
    }

    #[must_use]
    pub fn dispatched_count(&self) -> usize {
        self.ledger.len()
    }

    pub fn clear(&mut self) {
        self.ledger.clear();
    }
}

#[cfg(test)]
#[path = "alerts_test.rs"]
mod tests;
