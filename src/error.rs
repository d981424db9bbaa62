//! Unified SDK error types.

use thiserror::Error;

/// Top-level SDK error.
#[derive(Error, Debug)]
pub enum SdkError {
    #[error("HTTP error: {0}")]
    Http(#[from] HttpError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// The summary collaborator could not deliver data (rate limiting, outage).
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The chart collaborator returned no usable price series.
    #[error("No chart data: {0}")]
    NoChartData(String),

    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    #[error("{0}")]
    Other(String),
}

/// HTTP-layer errors.
#[derive(Error, Debug)]
pub enum HttpError {
    #[cfg(feature = "http")]
    #[error("Request failed: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Server error {status}: {body}")]
    ServerError { status: u16, body: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Timeout")]
    Timeout,

    #[error("Max retries exceeded after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded { attempts: u32, last_error: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = SdkError::InvalidTimeframe("3h".into());
        assert_eq!(err.to_string(), "Invalid timeframe: 3h");

        let err = SdkError::Http(HttpError::ServerError {
            status: 503,
            body: "down".into(),
        });
        assert_eq!(err.to_string(), "HTTP error: Server error 503: down");

        let err = SdkError::UpstreamUnavailable("Rate limited".into());
        assert_eq!(err.to_string(), "Upstream unavailable: Rate limited");
    }
}
