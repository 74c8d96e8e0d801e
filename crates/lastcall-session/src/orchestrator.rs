//! Session state and the operations the UI collaborator drives.
//!
//! The orchestrator is owned by exactly one task. Discovery itself runs
//! elsewhere: [`Orchestrator::begin_discovery`] hands out a ticket, and the
//! result comes back through [`Orchestrator::complete_discovery`], which
//! drops anything but the latest ticket's result.

use chrono::NaiveDateTime;
use lastcall_core::{GeoPosition, Outlet, OutletStatus, Urgency};
use lastcall_discovery::{DiscoveryError, DISCOVERY_FAILED_MESSAGE};
use serde::Serialize;

use crate::alerts::AlertScheduler;
use crate::host::{Geolocator, Notifier, Permission};

pub const NOTIFICATIONS_DENIED_HINT: &str = "Enable notifications to receive closing alerts.";

/// What the UI renders.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionState {
    /// Latest successful batch, in answer order.
    pub outlets: Vec<Outlet>,
    pub loading: bool,
    pub error: Option<String>,
    pub position: Option<GeoPosition>,
    pub alerts_enabled: bool,
}

/// Everything the UI needs for one render, outlets in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub outlets: Vec<Outlet>,
    pub loading: bool,
    pub error: Option<String>,
    pub position: Option<GeoPosition>,
    pub alerts_enabled: bool,
    pub next_closing: Option<Outlet>,
    pub hint: Option<String>,
    pub refresh_count: u64,
}

/// Identifies one discovery request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscoveryTicket {
    pub epoch: u64,
    pub position: GeoPosition,
}

pub struct Orchestrator<G, N> {
    state: SessionState,
    epoch: u64,
    refresh_count: u64,
    hint: Option<&'static str>,
    alerts: AlertScheduler,
    geolocator: G,
    notifier: N,
}

impl<G, N> Orchestrator<G, N>
where
    G: Geolocator,
    N: Notifier,
{
    #[must_use]
    pub fn new(geolocator: G, notifier: N, alert_window_minutes: u32) -> Self {
        Self {
            state: SessionState::default(),
            epoch: 0,
            refresh_count: 0,
            hint: None,
            alerts: AlertScheduler::new(alert_window_minutes),
            geolocator,
            notifier,
        }
    }

    #[must_use]
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    #[must_use]
    pub fn alerts_enabled(&self) -> bool {
        self.state.alerts_enabled
    }

    #[must_use]
    pub fn refresh_count(&self) -> u64 {
        self.refresh_count
    }

    /// Epoch of the most recently started discovery; 0 before the first.
    #[must_use]
    pub fn current_epoch(&self) -> u64 {
        self.epoch
    }

    /// Asks the host for a high-accuracy fix.
    ///
    /// Marks the session as loading and clears any previous error first. On
    /// success the position is stored and `loading` stays set, since a
    /// discovery follows. On failure the host's message becomes the error.
    pub async fn request_position(&mut self) -> Option<GeoPosition> {
        self.state.loading = true;
        self.state.error = None;

        match self.geolocator.locate(true).await {
            Ok(position) => {
                tracing::debug!(%position, "position fix acquired");
                self.state.position = Some(position);
                Some(position)
            }
            Err(e) => {
                tracing::warn!(error = %e, "position fix failed");
                self.state.loading = false;
                self.state.error = Some(e.to_string());
                None
            }
        }
    }

    /// Starts a discovery for the current position, superseding any in flight.
    ///
    /// Returns `None` when no position is known yet.
    pub fn begin_discovery(&mut self) -> Option<DiscoveryTicket> {
        let position = self.state.position?;
        self.epoch += 1;
        self.state.loading = true;

        tracing::debug!(epoch = self.epoch, %position, "discovery started");
        Some(DiscoveryTicket {
            epoch: self.epoch,
            position,
        })
    }

    /// Applies a discovery result. Results for any epoch other than the
    /// latest are discarded; returns whether the state changed.
    pub fn complete_discovery(
        &mut self,
        epoch: u64,
        result: Result<Vec<Outlet>, DiscoveryError>,
    ) -> bool {
        if epoch != self.epoch {
            tracing::debug!(epoch, current = self.epoch, "discarding stale discovery");
            return false;
        }

        self.state.loading = false;
        match result {
            Ok(outlets) => {
                self.state.outlets = outlets;
                self.state.error = None;
            }
            Err(e) => {
                tracing::debug!(epoch, error = %e, "discovery failed; keeping previous outlets");
                self.state.error = Some(DISCOVERY_FAILED_MESSAGE.to_string());
            }
        }
        true
    }

    /// Locates again and starts a fresh discovery.
    ///
    /// Any discovery already in flight is superseded up front, so its result
    /// is discarded even when the new position fix fails.
    pub async fn refresh(&mut self) -> Option<DiscoveryTicket> {
        self.refresh_count += 1;
        self.epoch += 1;
        self.locate_and_discover().await
    }

    /// Initial fix and discovery for a new session; not counted as a refresh.
    pub async fn locate_and_discover(&mut self) -> Option<DiscoveryTicket> {
        self.request_position().await?;
        self.begin_discovery()
    }

    /// Flips the alert opt-in and returns the new value.
    ///
    /// Turning alerts on goes through the host consent flow; if permission is
    /// refused alerts stay off and a one-shot hint is queued. Turning them
    /// off forgets every dispatched alert.
    pub async fn toggle_alerts(&mut self) -> bool {
        if self.state.alerts_enabled {
            self.disable_alerts();
            return false;
        }

        let permission = match self.notifier.permission() {
            Permission::Default => self.notifier.request_permission().await,
            other => other,
        };

        if permission == Permission::Granted {
            self.state.alerts_enabled = true;
            tracing::info!("closing alerts enabled");
        } else {
            tracing::info!(?permission, "notification permission not granted");
            self.hint = Some(NOTIFICATIONS_DENIED_HINT);
        }
        self.state.alerts_enabled
    }

    fn disable_alerts(&mut self) {
        if self.state.alerts_enabled {
            tracing::info!(
                dispatched = self.alerts.dispatched_count(),
                "closing alerts disabled"
            );
        }
        self.state.alerts_enabled = false;
        self.alerts.clear();
    }

    /// Runs one alert pass over the current batch. No-op while alerts are off.
    pub fn tick_alerts(&mut self, now: NaiveDateTime) -> usize {
        if !self.state.alerts_enabled {
            return 0;
        }
        self.alerts.tick(&self.state.outlets, now, &self.notifier)
    }

    /// Outlets in display order: open and high urgency first, then other open
    /// outlets, closed outlets last. Ties keep batch order.
    #[must_use]
    pub fn sorted_outlets(&self) -> Vec<Outlet> {
        sort_for_display(&self.state.outlets)
    }

    /// The first open outlet of the display order.
    #[must_use]
    pub fn next_closing(&self) -> Option<Outlet> {
        first_open(&self.sorted_outlets()).cloned()
    }

    /// Returns the pending hint, if any, and clears it.
    pub fn take_hint(&mut self) -> Option<&'static str> {
        self.hint.take()
    }

    /// Builds a render snapshot. Consumes the pending hint.
    pub fn snapshot(&mut self) -> SessionSnapshot {
        let outlets = self.sorted_outlets();
        let next_closing = first_open(&outlets).cloned();

        SessionSnapshot {
            outlets,
            loading: self.state.loading,
            error: self.state.error.clone(),
            position: self.state.position,
            alerts_enabled: self.state.alerts_enabled,
            next_closing,
            hint: self.take_hint().map(str::to_string),
            refresh_count: self.refresh_count,
        }
    }

    /// Session teardown: alerts off, ledger cleared.
    pub fn shutdown(&mut self) {
        self.disable_alerts();
        tracing::debug!(refreshes = self.refresh_count, "session closed");
    }
}

/// Stable display ordering for a batch.
#[must_use]
pub fn sort_for_display(outlets: &[Outlet]) -> Vec<Outlet> {
    let mut sorted = outlets.to_vec();
    sorted.sort_by_key(|o| match (o.status, o.urgency) {
        (OutletStatus::Closed, _) => 2,
        (_, Urgency::High) => 0,
        _ => 1,
    });
    sorted
}

/// First outlet of an already sorted view that has not closed.
fn first_open(sorted: &[Outlet]) -> Option<&Outlet> {
    sorted.iter().find(|o| o.status != OutletStatus::Closed)
}

#[cfg(test)]
#[path = "orchestrator_test.rs"]
mod tests;
