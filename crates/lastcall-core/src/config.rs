use std::fmt::Display;
use std::str::FromStr;

use crate::app_config::AppConfig;
use crate::ConfigError;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_API_BASE_URL: &str = "https://generativelanguage.googleapis.com/";
pub const DEFAULT_MAPS_BASE_URL: &str = "https://www.google.com/maps/search/";
pub const DEFAULT_USER_AGENT: &str = "lastcall/0.1 (store-discovery)";

/// Reads `.env` (if present) and then the process environment.
///
/// # Errors
///
/// Returns `ConfigError` when `API_KEY` is unset or a tuning variable does
/// not parse.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Same as [`load_app_config`] without touching `.env`.
///
/// # Errors
///
/// Returns `ConfigError` when `API_KEY` is unset or a tuning variable does
/// not parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Typed accessors over an env-var lookup.
struct Env<F> {
    lookup: F,
}

impl<F> Env<F>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    fn required(&self, var: &str) -> Result<String, ConfigError> {
        match (self.lookup)(var) {
            Ok(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(ConfigError::MissingEnvVar(var.to_owned())),
        }
    }

    fn text(&self, var: &str, fallback: &str) -> String {
        (self.lookup)(var).unwrap_or_else(|_| fallback.to_owned())
    }

    fn number<T>(&self, var: &str, fallback: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: Display,
    {
        match (self.lookup)(var) {
            Ok(raw) => raw.trim().parse().map_err(|e: T::Err| invalid(var, e)),
            Err(_) => Ok(fallback),
        }
    }

    /// Like [`Env::number`] but rejects zero.
    fn positive<T>(&self, var: &str, fallback: T) -> Result<T, ConfigError>
    where
        T: FromStr + Default + PartialEq,
        T::Err: Display,
    {
        let value = self.number(var, fallback)?;
        if value == T::default() {
            return Err(invalid(var, "must be greater than zero"));
        }
        Ok(value)
    }
}

fn invalid(var: &str, reason: impl Display) -> ConfigError {
    ConfigError::InvalidEnvVar {
        var: var.to_owned(),
        reason: reason.to_string(),
    }
}

fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let env = Env { lookup };

    Ok(AppConfig {
        api_key: env.required("API_KEY")?,
        model: env.text("LASTCALL_MODEL", DEFAULT_MODEL),
        api_base_url: env.text("LASTCALL_API_BASE_URL", DEFAULT_API_BASE_URL),
        maps_base_url: env.text("LASTCALL_MAPS_BASE_URL", DEFAULT_MAPS_BASE_URL),
        log_level: env.text("LASTCALL_LOG_LEVEL", "info"),
        request_timeout_secs: env.number("LASTCALL_REQUEST_TIMEOUT_SECS", 30)?,
        user_agent: env.text("LASTCALL_USER_AGENT", DEFAULT_USER_AGENT),
        max_retries: env.number("LASTCALL_MAX_RETRIES", 2)?,
        retry_backoff_base_ms: env.number("LASTCALL_RETRY_BACKOFF_BASE_MS", 500)?,
        // zero would make the tick interval spin
        alert_tick_secs: env.positive("LASTCALL_ALERT_TICK_SECS", 30)?,
        alert_window_minutes: env.positive("LASTCALL_ALERT_WINDOW_MINUTES", 30)?,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
