use thiserror::Error;

/// The only message a discovery failure ever shows to the user. The real
/// cause is logged by the client.
pub const DISCOVERY_FAILED_MESSAGE: &str = "Failed to fetch store data. Please try again.";

/// Errors returned by the discovery client.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The upstream service answered with a non-2xx status (auth, quota, outage).
    #[error("unexpected HTTP status {status} from upstream: {body}")]
    UnexpectedStatus { status: u16, body: String },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The upstream call succeeded but carried no answer text.
    #[error("upstream returned an empty answer")]
    EmptyAnswer,

    #[error("invalid base URL \"{base_url}\": {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}
