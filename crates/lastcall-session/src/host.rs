//! Seams to the host environment: location fixes, user notifications, and
//! the wall clock.
//!
//! The session layer only talks to these traits. The CLI supplies terminal
//! adapters; tests supply fakes.

use std::future::Future;

use chrono::{Local, NaiveDateTime};
use lastcall_core::GeoPosition;
use thiserror::Error;

/// Why the host could not produce a location fix. The display text is the
/// user-facing message stored in session state.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum GeolocationError {
    #[error("Geolocation is not supported by your browser.")]
    Unsupported,

    #[error("Permission denied. We need location to find nearby stores.")]
    PermissionDenied,

    #[error("Unable to retrieve your location. Please check your permissions.")]
    Unavailable,
}

pub trait Geolocator: Send + Sync {
    /// Requests a single position fix.
    fn locate(
        &self,
        high_accuracy: bool,
    ) -> impl Future<Output = Result<GeoPosition, GeolocationError>> + Send;
}

/// Host notification consent state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
    /// The user has not been asked yet.
    Default,
}

/// A user-visible notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub body: String,
    pub icon_url: String,
}

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("notification permission has not been granted")]
    NotPermitted,

    #[error("notification could not be shown: {0}")]
    Dispatch(String),
}

pub trait Notifier: Send + Sync {
    fn permission(&self) -> Permission;

    /// Runs the host consent flow and returns the resulting state.
    fn request_permission(&self) -> impl Future<Output = Permission> + Send;

    /// Shows `notification`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError`] when the host refuses or fails to display it.
    fn show(&self, notification: &Notification) -> Result<(), NotifyError>;
}

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}
