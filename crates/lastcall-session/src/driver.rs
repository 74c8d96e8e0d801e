//! The session task: sole owner of the [`Orchestrator`].
//!
//! One `select!` loop multiplexes UI commands, discovery completions, and the
//! alert interval. Discoveries run on spawned tasks that only send back
//! `(epoch, result)`; every state change happens here.

use std::sync::Arc;
use std::time::Duration;

use lastcall_core::Outlet;
use lastcall_discovery::{DiscoveryError, OutletSource};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};

use crate::host::{Clock, Geolocator, Notifier};
use crate::orchestrator::{DiscoveryTicket, Orchestrator, SessionSnapshot, SessionState};

const COMPLETION_CHANNEL_CAPACITY: usize = 8;

type Completion = (u64, Result<Vec<Outlet>, DiscoveryError>);

/// Requests from the UI collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiCommand {
    Refresh,
    ToggleAlerts,
    Quit,
}

pub struct SessionDriver<S, G, N, C> {
    orchestrator: Orchestrator<G, N>,
    source: Arc<S>,
    clock: C,
    alert_tick: Duration,
}

impl<S, G, N, C> SessionDriver<S, G, N, C>
where
    S: OutletSource,
    G: Geolocator,
    N: Notifier,
    C: Clock,
{
    #[must_use]
    pub fn new(
        orchestrator: Orchestrator<G, N>,
        source: Arc<S>,
        clock: C,
        alert_tick: Duration,
    ) -> Self {
        Self {
            orchestrator,
            source,
            clock,
            alert_tick,
        }
    }

    /// Runs the session until [`UiCommand::Quit`], until `commands` closes,
    /// or until the snapshot receiver goes away.
    ///
    /// Starts with a location fix and discovery, then publishes a snapshot
    /// after every state change. Returns the final state after teardown.
    pub async fn run(
        mut self,
        mut commands: mpsc::Receiver<UiCommand>,
        snapshots: mpsc::Sender<SessionSnapshot>,
    ) -> SessionState {
        let (done_tx, mut done_rx) = mpsc::channel::<Completion>(COMPLETION_CHANNEL_CAPACITY);
        let mut in_flight: Vec<JoinHandle<()>> = Vec::new();
        let mut ticker: Option<Interval> = None;

        tracing::info!("session started");
        if let Some(ticket) = self.orchestrator.locate_and_discover().await {
            in_flight.push(self.spawn_discovery(ticket, done_tx.clone()));
        }

        let mut publish = snapshots.send(self.orchestrator.snapshot()).await.is_ok();
        while publish {
            tokio::select! {
                command = commands.recv() => match command {
                    Some(UiCommand::Refresh) => {
                        if let Some(ticket) = self.orchestrator.refresh().await {
                            in_flight.push(self.spawn_discovery(ticket, done_tx.clone()));
                        }
                    }
                    Some(UiCommand::ToggleAlerts) => {
                        let enabled = self.orchestrator.toggle_alerts().await;
                        ticker = enabled.then(|| self.alert_interval());
                    }
                    Some(UiCommand::Quit) | None => break,
                },
                Some((epoch, result)) = done_rx.recv() => {
                    if !self.orchestrator.complete_discovery(epoch, result) {
                        continue;
                    }
                }
                () = next_tick(&mut ticker), if self.orchestrator.alerts_enabled() => {
                    if self.orchestrator.tick_alerts(self.clock.now()) == 0 {
                        continue;
                    }
                }
            }

            in_flight.retain(|handle| !handle.is_finished());
            publish = snapshots.send(self.orchestrator.snapshot()).await.is_ok();
        }

        for handle in in_flight {
            handle.abort();
        }
        self.orchestrator.shutdown();
        tracing::info!(
            refreshes = self.orchestrator.refresh_count(),
            "session ended"
        );
        self.orchestrator.state().clone()
    }

    fn spawn_discovery(
        &self,
        ticket: DiscoveryTicket,
        done: mpsc::Sender<Completion>,
    ) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        tokio::spawn(async move {
            let result = source.fetch_nearby_outlets(ticket.position).await;
            // The receiver only closes at teardown, when the result is moot.
            let _ = done.send((ticket.epoch, result)).await;
        })
    }

    fn alert_interval(&self) -> Interval {
        let mut interval = tokio::time::interval(self.alert_tick);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        interval
    }
}

async fn next_tick(ticker: &mut Option<Interval>) {
    match ticker {
        Some(interval) => {
            interval.tick().await;
        }
        None => std::future::pending().await,
    }
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod tests;
