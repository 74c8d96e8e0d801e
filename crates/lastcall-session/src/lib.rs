//! Session orchestration for Last Call: position fixes, discovery epochs,
//! closing alerts, and the single-owner driver loop that ties them together.

pub mod alerts;
pub mod driver;
pub mod host;
pub mod orchestrator;

pub use alerts::{closing_alert, AlertScheduler, ALERT_ICON_URL, ALERT_TITLE};
pub use driver::{SessionDriver, UiCommand};
pub use host::{
    Clock, GeolocationError, Geolocator, Notification, Notifier, NotifyError, Permission,
    SystemClock,
};
pub use orchestrator::{
    sort_for_display, DiscoveryTicket, Orchestrator, SessionSnapshot, SessionState,
    NOTIFICATIONS_DENIED_HINT,
};
