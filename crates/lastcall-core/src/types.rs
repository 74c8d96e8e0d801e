use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operating status of an outlet.
///
/// The parser only ever produces `Open` or `Closed`. `ClosingSoon` is a
/// display label derived from urgency; see [`Outlet::display_status`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutletStatus {
    Open,
    Closed,
    #[serde(rename = "Closing Soon")]
    ClosingSoon,
}

impl std::fmt::Display for OutletStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutletStatus::Open => write!(f, "Open"),
            OutletStatus::Closed => write!(f, "Closed"),
            OutletStatus::ClosingSoon => write!(f, "Closing Soon"),
        }
    }
}

/// Coarse three-level tint used by the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Urgency::Low => write!(f, "low"),
            Urgency::Medium => write!(f, "medium"),
            Urgency::High => write!(f, "high"),
        }
    }
}

/// One retail outlet recovered from a discovery answer.
///
/// `id` is unique within the batch that produced it and carries no meaning
/// beyond that batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Outlet {
    pub id: String,
    pub name: String,
    pub address: String,
    pub status: OutletStatus,
    /// `"H:MM AM"` style text when recoverable, otherwise `"Check hours"`.
    pub closing_time: String,
    pub urgency: Urgency,
    pub map_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
}

impl Outlet {
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.status == OutletStatus::Open
    }

    /// Status label for presentation: an open outlet with high urgency is
    /// shown as closing soon.
    #[must_use]
    pub fn display_status(&self) -> OutletStatus {
        match self.status {
            OutletStatus::Open if self.urgency == Urgency::High => OutletStatus::ClosingSoon,
            other => other,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum GeoError {
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),

    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A validated geographic fix. Replaced wholesale on refresh, never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPosition {
    latitude: f64,
    longitude: f64,
}

impl GeoPosition {
    /// Builds a position, rejecting NaN and out-of-range coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`GeoError`] naming the offending coordinate.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    #[must_use]
    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    #[must_use]
    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

impl std::fmt::Display for GeoPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.latitude, self.longitude)
    }
}
