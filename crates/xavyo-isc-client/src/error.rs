//! Error types for the Identity Security Cloud client.

use thiserror::Error;

/// Result type alias using `IscError`.
pub type IscResult<T> = Result<T, IscError>;

/// Errors that can occur when talking to the ISC REST API.
#[derive(Debug, Error)]
pub enum IscError {
    /// Client configuration is invalid (base URL, page size, ...).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Token grant failed or the API rejected the access token.
    #[error("Authentication error: {0}")]
    Auth(String),

    /// The request never produced an HTTP response (connect, timeout, reset).
    #[error("Network error: {0}")]
    Network(#[source] reqwest::Error),

    /// The API answered 429 Too Many Requests.
    #[error("Rate limited by ISC API (retry after {retry_after_secs:?}s)")]
    RateLimited { retry_after_secs: Option<u64> },

    /// The API answered with a non-success status not covered above.
    #[error("ISC API error: HTTP {status} - {message}")]
    Api { status: u16, message: String },

    /// The requested resource does not exist.
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// A response body or pagination header could not be interpreted.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Request body serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// URL construction error.
    #[error("URL error: {0}")]
    Url(#[from] url::ParseError),
}

impl IscError {
    /// Whether the failure is worth retrying: network errors, 429 and 5xx.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Network(_) | Self::RateLimited { .. }) || self.is_server_error()
    }

    /// Whether the API answered with a 5xx status.
    #[must_use]
    pub fn is_server_error(&self) -> bool {
        matches!(self, Self::Api { status, .. } if *status >= 500)
    }

    /// HTTP status carried by the error, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } => Some(*status),
            Self::RateLimited { .. } => Some(429),
            Self::NotFound(_) => Some(404),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(IscError::RateLimited {
            retry_after_secs: None
        }
        .is_transient());
        assert!(IscError::Api {
            status: 503,
            message: "unavailable".into()
        }
        .is_transient());

        assert!(!IscError::Api {
            status: 400,
            message: "bad filter".into()
        }
        .is_transient());
        assert!(!IscError::NotFound("account".into()).is_transient());
        assert!(!IscError::Auth("invalid_client".into()).is_transient());
        assert!(!IscError::Parse("X-Total-Count".into()).is_transient());
    }

    #[test]
    fn test_status() {
        assert_eq!(IscError::NotFound("x".into()).status(), Some(404));
        assert_eq!(
            IscError::RateLimited {
                retry_after_secs: Some(3)
            }
            .status(),
            Some(429)
        );
        assert_eq!(IscError::Config("x".into()).status(), None);
    }
}
