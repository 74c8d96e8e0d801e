//! Terminal adapters for the session's host traits.

use std::sync::{Mutex, PoisonError};

use lastcall_core::GeoPosition;
use lastcall_session::{GeolocationError, Geolocator, Notification, Notifier, NotifyError, Permission};

/// Reports the fix given on the command line, or `Unsupported` without one.
#[derive(Debug, Clone, Copy)]
pub(crate) struct FixedGeolocator {
    position: Option<GeoPosition>,
}

impl FixedGeolocator {
    pub(crate) fn new(position: Option<GeoPosition>) -> Self {
        Self { position }
    }
}

impl Geolocator for FixedGeolocator {
    async fn locate(&self, _high_accuracy: bool) -> Result<GeoPosition, GeolocationError> {
        self.position.ok_or(GeolocationError::Unsupported)
    }
}

/// Prints notifications as banners on stdout.
///
/// Consent is implicit: the first request grants it unless the user passed
/// `--no-notify`, in which case every request is denied.
#[derive(Debug)]
pub(crate) struct TerminalNotifier {
    allow: bool,
    permission: Mutex<Permission>,
}

impl TerminalNotifier {
    pub(crate) fn new(allow: bool) -> Self {
        Self {
            allow,
            permission: Mutex::new(Permission::Default),
        }
    }
}

impl Notifier for TerminalNotifier {
    fn permission(&self) -> Permission {
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner)
    }

    async fn request_permission(&self) -> Permission {
        let decided = if self.allow {
            Permission::Granted
        } else {
            Permission::Denied
        };
        *self.permission.lock().unwrap_or_else(PoisonError::into_inner) = decided;
        decided
    }

    fn show(&self, notification: &Notification) -> Result<(), NotifyError> {
        if self.permission() != Permission::Granted {
            return Err(NotifyError::NotPermitted);
        }
        println!("\n*** {} ***\n{}\n", notification.title, notification.body);
        Ok(())
    }
}
