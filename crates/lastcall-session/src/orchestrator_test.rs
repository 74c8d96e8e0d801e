use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chrono::NaiveDate;

use super::*;
use crate::host::{GeolocationError, Notification, NotifyError};

// ---------------------------------------------------------------------------
// Fakes
// ---------------------------------------------------------------------------

struct ScriptedGeolocator {
    fixes: Mutex<VecDeque<Result<GeoPosition, GeolocationError>>>,
}

impl ScriptedGeolocator {
    fn new(fixes: Vec<Result<GeoPosition, GeolocationError>>) -> Self {
        Self {
            fixes: Mutex::new(fixes.into()),
        }
    }
}

impl Geolocator for ScriptedGeolocator {
    async fn locate(&self, high_accuracy: bool) -> Result<GeoPosition, GeolocationError> {
        assert!(high_accuracy, "fixes are always requested at high accuracy");
        self.fixes
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GeolocationError::Unavailable))
    }
}

struct FakeNotifier {
    current: Permission,
    on_request: Permission,
    requests: AtomicUsize,
    shown: AtomicUsize,
}

impl FakeNotifier {
    fn new(current: Permission, on_request: Permission) -> Self {
        Self {
            current,
            on_request,
            requests: AtomicUsize::new(0),
            shown: AtomicUsize::new(0),
        }
    }
}

impl Notifier for FakeNotifier {
    fn permission(&self) -> Permission {
        self.current
    }

    async fn request_permission(&self) -> Permission {
        self.requests.fetch_add(1, Ordering::SeqCst);
        self.on_request
    }

    fn show(&self, _notification: &Notification) -> Result<(), NotifyError> {
        self.shown.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn pos(lat: f64, lng: f64) -> GeoPosition {
    GeoPosition::new(lat, lng).unwrap()
}

fn outlet(id: &str, status: OutletStatus, urgency: Urgency, closing_time: &str) -> Outlet {
    Outlet {
        id: id.to_string(),
        name: format!("Outlet {id}"),
        address: "1 Main St".to_string(),
        status,
        closing_time: closing_time.to_string(),
        urgency,
        map_url: "https://www.google.com/maps/search/?api=1&query=x".to_string(),
        distance: None,
    }
}

fn orchestrator(
    fixes: Vec<Result<GeoPosition, GeolocationError>>,
    notifier: FakeNotifier,
) -> Orchestrator<ScriptedGeolocator, FakeNotifier> {
    Orchestrator::new(ScriptedGeolocator::new(fixes), notifier, 30)
}

fn granted() -> FakeNotifier {
    FakeNotifier::new(Permission::Granted, Permission::Granted)
}

fn at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 16)
        .unwrap()
        .and_hms_opt(hour, minute, 0)
        .unwrap()
}

// ---------------------------------------------------------------------------
// Position and discovery
// ---------------------------------------------------------------------------

#[tokio::test]
async fn position_fix_keeps_loading_until_discovery_completes() {
    let mut orch = orchestrator(vec![Ok(pos(40.0, -74.0))], granted());

    let ticket = orch.locate_and_discover().await.expect("ticket");
    assert_eq!(ticket.epoch, 1);
    assert_eq!(ticket.position, pos(40.0, -74.0));
    assert!(orch.state().loading);
    assert_eq!(orch.state().position, Some(pos(40.0, -74.0)));

    let batch = vec![outlet("a", OutletStatus::Open, Urgency::Low, "9:00 PM")];
    assert!(orch.complete_discovery(ticket.epoch, Ok(batch.clone())));
    assert!(!orch.state().loading);
    assert_eq!(orch.state().outlets, batch);
    assert_eq!(orch.state().error, None);
}

#[tokio::test]
async fn geolocation_failure_sets_error_and_stops_loading() {
    let mut orch = orchestrator(vec![Err(GeolocationError::PermissionDenied)], granted());

    assert!(orch.locate_and_discover().await.is_none());
    assert!(!orch.state().loading);
    assert_eq!(
        orch.state().error.as_deref(),
        Some("Permission denied. We need location to find nearby stores.")
    );
    assert_eq!(orch.current_epoch(), 0);
}

#[test]
fn discovery_requires_a_position() {
    let mut orch = orchestrator(vec![], granted());
    assert!(orch.begin_discovery().is_none());
}

#[tokio::test]
async fn discovery_failure_keeps_previous_outlets() {
    let mut orch = orchestrator(vec![Ok(pos(1.0, 1.0)), Ok(pos(1.0, 1.0))], granted());
    let batch = vec![outlet("a", OutletStatus::Open, Urgency::Low, "9:00 PM")];

    let first = orch.locate_and_discover().await.unwrap();
    orch.complete_discovery(first.epoch, Ok(batch.clone()));

    let second = orch.refresh().await.unwrap();
    orch.complete_discovery(second.epoch, Err(DiscoveryError::EmptyAnswer));

    assert_eq!(orch.state().outlets, batch);
    assert!(!orch.state().loading);
    assert_eq!(
        orch.state().error.as_deref(),
        Some("Failed to fetch store data. Please try again.")
    );
}

#[tokio::test]
async fn success_after_failure_clears_error() {
    let mut orch = orchestrator(vec![Ok(pos(1.0, 1.0)), Ok(pos(1.0, 1.0))], granted());

    let first = orch.locate_and_discover().await.unwrap();
    orch.complete_discovery(first.epoch, Err(DiscoveryError::EmptyAnswer));
    assert!(orch.state().error.is_some());

    let second = orch.refresh().await.unwrap();
    orch.complete_discovery(second.epoch, Ok(vec![]));
    assert_eq!(orch.state().error, None);
    assert!(orch.state().outlets.is_empty());
}

#[tokio::test]
async fn stale_completion_is_discarded() {
    let mut orch = orchestrator(vec![Ok(pos(10.0, 10.0)), Ok(pos(20.0, 20.0))], granted());

    let old = orch.locate_and_discover().await.unwrap();
    let new = orch.refresh().await.unwrap();
    assert!(new.epoch > old.epoch);

    let fresh = vec![outlet("new", OutletStatus::Open, Urgency::Low, "9:00 PM")];
    assert!(orch.complete_discovery(new.epoch, Ok(fresh.clone())));

    let stale = vec![outlet("old", OutletStatus::Open, Urgency::Low, "9:00 PM")];
    assert!(!orch.complete_discovery(old.epoch, Ok(stale)));

    assert_eq!(orch.state().outlets, fresh);
    assert_eq!(orch.state().position, Some(pos(20.0, 20.0)));
}

#[tokio::test]
async fn stale_completion_does_not_end_loading() {
    let mut orch = orchestrator(vec![Ok(pos(10.0, 10.0)), Ok(pos(20.0, 20.0))], granted());

    let old = orch.locate_and_discover().await.unwrap();
    let _new = orch.refresh().await.unwrap();

    assert!(!orch.complete_discovery(old.epoch, Err(DiscoveryError::EmptyAnswer)));
    assert!(orch.state().loading);
    assert_eq!(orch.state().error, None);
}

#[tokio::test]
async fn refresh_with_failed_fix_still_discards_prior_discovery() {
    let mut orch = orchestrator(
        vec![Ok(pos(10.0, 10.0)), Err(GeolocationError::PermissionDenied)],
        granted(),
    );

    let old = orch.locate_and_discover().await.unwrap();
    assert!(orch.refresh().await.is_none());
    let denied = GeolocationError::PermissionDenied.to_string();
    assert_eq!(orch.state().error.as_deref(), Some(denied.as_str()));

    let stale = vec![outlet("old", OutletStatus::Open, Urgency::Low, "9:00 PM")];
    assert!(!orch.complete_discovery(old.epoch, Ok(stale)));

    assert_eq!(orch.state().error.as_deref(), Some(denied.as_str()));
    assert!(orch.state().outlets.is_empty());
    assert!(!orch.state().loading);
}

#[tokio::test]
async fn snapshot_and_next_closing_agree() {
    let mut orch = orchestrator(vec![Ok(pos(1.0, 1.0))], granted());
    let ticket = orch.locate_and_discover().await.unwrap();
    let batch = vec![
        outlet("shut", OutletStatus::Closed, Urgency::Low, "6:00 PM"),
        outlet("late", OutletStatus::Open, Urgency::Low, "11:00 PM"),
        outlet("soon", OutletStatus::Open, Urgency::High, "9:10 PM"),
    ];
    orch.complete_discovery(ticket.epoch, Ok(batch));

    let expected = orch.next_closing().map(|o| o.id);
    assert_eq!(expected.as_deref(), Some("soon"));
    assert_eq!(orch.snapshot().next_closing.map(|o| o.id), expected);
}

#[tokio::test]
async fn refresh_counts_only_explicit_refreshes() {
    let mut orch = orchestrator(vec![Ok(pos(1.0, 1.0)), Ok(pos(1.0, 1.0))], granted());
    orch.locate_and_discover().await;
    assert_eq!(orch.refresh_count(), 0);
    orch.refresh().await;
    assert_eq!(orch.refresh_count(), 1);
}

// ---------------------------------------------------------------------------
// Alerts
// ---------------------------------------------------------------------------

#[tokio::test]
async fn enabling_alerts_with_granted_permission_skips_prompt() {
    let mut orch = orchestrator(vec![], granted());
    assert!(orch.toggle_alerts().await);
    assert!(orch.alerts_enabled());
    assert_eq!(orch.notifier.requests.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn enabling_alerts_prompts_when_undecided() {
    let mut orch = orchestrator(
        vec![],
        FakeNotifier::new(Permission::Default, Permission::Granted),
    );
    assert!(orch.toggle_alerts().await);
    assert_eq!(orch.notifier.requests.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn refused_permission_keeps_alerts_off_with_one_shot_hint() {
    let mut orch = orchestrator(
        vec![],
        FakeNotifier::new(Permission::Default, Permission::Denied),
    );
    assert!(!orch.toggle_alerts().await);
    assert!(!orch.alerts_enabled());
    assert_eq!(
        orch.take_hint(),
        Some("Enable notifications to receive closing alerts.")
    );
    assert_eq!(orch.take_hint(), None);
}

#[tokio::test]
async fn denied_permission_is_not_prompted_again() {
    let mut orch = orchestrator(
        vec![],
        FakeNotifier::new(Permission::Denied, Permission::Granted),
    );
    assert!(!orch.toggle_alerts().await);
    assert_eq!(orch.notifier.requests.load(Ordering::SeqCst), 0);
    assert_eq!(orch.take_hint(), Some(NOTIFICATIONS_DENIED_HINT));
}

#[tokio::test]
async fn ticks_are_ignored_while_alerts_are_off() {
    let mut orch = orchestrator(vec![Ok(pos(1.0, 1.0))], granted());
    let ticket = orch.locate_and_discover().await.unwrap();
    orch.complete_discovery(
        ticket.epoch,
        Ok(vec![outlet("a", OutletStatus::Open, Urgency::High, "9:00 PM")]),
    );

    assert_eq!(orch.tick_alerts(at(20, 45)), 0);
    assert_eq!(orch.notifier.shown.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn toggling_off_and_on_allows_redispatch() {
    let mut orch = orchestrator(vec![Ok(pos(1.0, 1.0))], granted());
    let ticket = orch.locate_and_discover().await.unwrap();
    orch.complete_discovery(
        ticket.epoch,
        Ok(vec![outlet("a", OutletStatus::Open, Urgency::High, "9:00 PM")]),
    );

    orch.toggle_alerts().await;
    assert_eq!(orch.tick_alerts(at(20, 45)), 1);
    assert_eq!(orch.tick_alerts(at(20, 46)), 0);

    assert!(!orch.toggle_alerts().await);
    assert!(orch.toggle_alerts().await);
    assert_eq!(orch.tick_alerts(at(20, 47)), 1);
    assert_eq!(orch.notifier.shown.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn shutdown_turns_alerts_off() {
    let mut orch = orchestrator(vec![], granted());
    orch.toggle_alerts().await;
    orch.shutdown();
    assert!(!orch.alerts_enabled());
}

// ---------------------------------------------------------------------------
// Display order
// ---------------------------------------------------------------------------

#[test]
fn sort_puts_urgent_first_and_closed_last() {
    let batch = vec![
        outlet("closed", OutletStatus::Closed, Urgency::Low, "9:00 PM"),
        outlet("low", OutletStatus::Open, Urgency::Low, "11:00 PM"),
        outlet("high", OutletStatus::Open, Urgency::High, "9:00 PM"),
        outlet("medium", OutletStatus::Open, Urgency::Medium, "10:00 PM"),
    ];
    let ids: Vec<String> = sort_for_display(&batch).into_iter().map(|o| o.id).collect();
    assert_eq!(ids, ["high", "low", "medium", "closed"]);
}

#[tokio::test]
async fn sorted_view_leaves_batch_order_intact() {
    let mut orch = orchestrator(vec![Ok(pos(1.0, 1.0))], granted());
    let ticket = orch.locate_and_discover().await.unwrap();
    let batch = vec![
        outlet("closed", OutletStatus::Closed, Urgency::Low, "9:00 PM"),
        outlet("open", OutletStatus::Open, Urgency::Medium, "10:00 PM"),
    ];
    orch.complete_discovery(ticket.epoch, Ok(batch.clone()));

    assert_eq!(orch.sorted_outlets()[0].id, "open");
    assert_eq!(orch.state().outlets, batch);
    assert_eq!(orch.next_closing().map(|o| o.id), Some("open".to_string()));
}

#[test]
fn next_closing_is_none_without_outlets() {
    let orch = orchestrator(vec![], granted());
    assert!(orch.next_closing().is_none());
}
