//! HTTP client for the Gemini `generateContent` endpoint with Google Maps
//! grounding.
//!
//! Each call is independent: no caching, no conversation state. Failures are
//! logged here with their real cause; callers only ever show
//! [`crate::DISCOVERY_FAILED_MESSAGE`].

use std::time::Duration;

use chrono::Local;
use lastcall_core::{AppConfig, GeoPosition, Outlet};
use reqwest::{Client, Url};

use crate::error::DiscoveryError;
use crate::parser::ResponseParser;
use crate::prompt::build_prompt;
use crate::retry::retry_with_backoff;
use crate::types::{DiscoveryAnswer, GenerateContentRequest, GenerateContentResponse};

/// Upstream error bodies are truncated to this many characters in errors and logs.
const MAX_ERROR_BODY_CHARS: usize = 300;

/// Client for map-grounded outlet discovery.
///
/// Built once from [`AppConfig`]; the API key is read at construction time.
/// Point `api_base_url` at a mock server in tests.
pub struct DiscoveryClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: Url,
    parser: ResponseParser,
    max_retries: u32,
    retry_backoff_base_ms: u64,
}

impl std::fmt::Debug for DiscoveryClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiscoveryClient")
            .field("api_key", &"[redacted]")
            .field("model", &self.model)
            .field("endpoint", &self.endpoint.as_str())
            .field("max_retries", &self.max_retries)
            .finish_non_exhaustive()
    }
}

impl DiscoveryClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`DiscoveryError::InvalidBaseUrl`] if the
    /// configured base URL or model does not form a valid endpoint.
    pub fn new(config: &AppConfig) -> Result<Self, DiscoveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(config.user_agent.as_str())
            .build()?;

        let endpoint = build_endpoint(&config.api_base_url, &config.model)?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            endpoint,
            parser: ResponseParser::new(&config.maps_base_url),
            max_retries: config.max_retries,
            retry_backoff_base_ms: config.retry_backoff_base_ms,
        })
    }

    /// The fully-resolved `generateContent` URL this client posts to.
    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Asks the upstream for the closest outlets around `position` and
    /// returns the parsed batch in answer order.
    ///
    /// An answer that parses to zero outlets is a successful empty batch.
    ///
    /// # Errors
    ///
    /// Returns [`DiscoveryError`] for any upstream failure, including an
    /// answer with no text. The cause is logged before returning.
    pub async fn fetch_nearby_outlets(
        &self,
        position: GeoPosition,
    ) -> Result<Vec<Outlet>, DiscoveryError> {
        let answer = self.generate_answer(position).await.inspect_err(|e| {
            tracing::error!(model = %self.model, %position, error = %e, "store discovery failed");
        })?;

        let now = Local::now();
        let outlets = self
            .parser
            .parse(&answer.text, now.naive_local(), now.timestamp_millis());

        tracing::info!(
            %position,
            outlets = outlets.len(),
            grounding_places = answer.grounding.len(),
            "store discovery complete"
        );
        Ok(outlets)
    }

    /// Sends the grounded prompt and returns the raw answer, retrying
    /// transient failures.
    ///
    /// # Errors
    ///
    /// - [`DiscoveryError::Http`] on network failure.
    /// - [`DiscoveryError::UnexpectedStatus`] on a non-2xx response.
    /// - [`DiscoveryError::Deserialize`] if the body is not the expected JSON.
    /// - [`DiscoveryError::EmptyAnswer`] if the answer carries no text.
    pub async fn generate_answer(
        &self,
        position: GeoPosition,
    ) -> Result<DiscoveryAnswer, DiscoveryError> {
        let prompt = build_prompt(position);
        let request = GenerateContentRequest::grounded(&prompt, position);

        let answer = retry_with_backoff(self.max_retries, self.retry_backoff_base_ms, || {
            self.post_once(&request)
        })
        .await?;

        tracing::debug!(
            chars = answer.text.len(),
            grounding_places = answer.grounding.len(),
            "received discovery answer"
        );

        if answer.text.trim().is_empty() {
            return Err(DiscoveryError::EmptyAnswer);
        }
        Ok(answer)
    }

    async fn post_once(
        &self,
        request: &GenerateContentRequest<'_>,
    ) -> Result<DiscoveryAnswer, DiscoveryError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(DiscoveryError::UnexpectedStatus {
                status: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&body).map_err(|e| DiscoveryError::Deserialize {
                context: format!("generateContent(model={})", self.model),
                source: e,
            })?;

        Ok(DiscoveryAnswer::from(parsed))
    }
}

/// Resolves `{base}/v1beta/models/{model}:generateContent`.
fn build_endpoint(base_url: &str, model: &str) -> Result<Url, DiscoveryError> {
    let invalid = |reason: String| DiscoveryError::InvalidBaseUrl {
        base_url: base_url.to_string(),
        reason,
    };

    if model.trim().is_empty() || model.contains('/') {
        return Err(invalid(format!("invalid model id '{model}'")));
    }

    // Exactly one trailing slash so `join` appends instead of replacing the
    // last path segment.
    let normalised = format!("{}/", base_url.trim_end_matches('/'));
    let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
    base.join(&format!("v1beta/models/{model}:generateContent"))
        .map_err(|e| invalid(e.to_string()))
}
