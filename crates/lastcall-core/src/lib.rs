//! Shared domain types, clock parsing, urgency rules, and configuration for
//! the Last Call store discovery pipeline.

pub mod app_config;
pub mod config;
pub mod time;
pub mod types;
pub mod urgency;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use time::{minutes_until, parse_clock_time, TimeError};
pub use types::{GeoError, GeoPosition, Outlet, OutletStatus, Urgency};
pub use urgency::classify_urgency;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
