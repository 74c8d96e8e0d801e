#[derive(Clone)]
pub struct AppConfig {
    pub api_key: String,
    pub model: String,
    pub api_base_url: String,
    pub maps_base_url: String,
    pub log_level: String,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub max_retries: u32,
    pub retry_backoff_base_ms: u64,
    pub alert_tick_secs: u64,
    pub alert_window_minutes: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("api_base_url", &self.api_base_url)
            .field("maps_base_url", &self.maps_base_url)
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff_base_ms", &self.retry_backoff_base_ms)
            .field("alert_tick_secs", &self.alert_tick_secs)
            .field("alert_window_minutes", &self.alert_window_minutes)
            .finish()
    }
}
