//! Provider error types.

use thiserror::Error;

use ieltsprep_core::error::ServiceError;

/// Errors raised while talking to a remote service over HTTP.
///
/// Converted to `ServiceError` at the trait boundary.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// Authentication failed (invalid API key or id token).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The requested resource was not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    NetworkError(String),

    /// The response body did not have the expected shape.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The HTTP client could not be constructed.
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl From<ProviderError> for ServiceError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::RateLimited { .. } => ServiceError::Api {
                status: 429,
                message: err.to_string(),
            },
            ProviderError::AuthenticationFailed(m) => ServiceError::AuthenticationFailed(m),
            ProviderError::NotFound(m) => ServiceError::NotFound(m),
            ProviderError::ApiError { status, message } => ServiceError::Api { status, message },
            ProviderError::Timeout(secs) => ServiceError::Timeout(secs),
            ProviderError::NetworkError(m) | ProviderError::Client(m) => ServiceError::Network(m),
            ProviderError::InvalidResponse(m) => ServiceError::MalformedResponse(m),
        }
    }
}

/// Build a client with a request timeout.
pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client, ProviderError> {
    reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| ProviderError::Client(e.to_string()))
}

pub(crate) fn send_error(err: reqwest::Error, timeout_secs: u64) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(timeout_secs)
    } else {
        ProviderError::NetworkError(err.to_string())
    }
}

/// Map an error status to a `ProviderError`; success responses pass through.
///
/// `message_of` extracts the service's own error message from the body.
pub(crate) async fn check_status(
    response: reqwest::Response,
    what: &str,
    message_of: fn(&str) -> Option<String>,
) -> Result<reqwest::Response, ProviderError> {
    let status = response.status().as_u16();
    if status < 400 {
        return Ok(response);
    }
    if status == 429 {
        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(5)
            * 1000;
        return Err(ProviderError::RateLimited {
            retry_after_ms: retry_after,
        });
    }

    let body = response.text().await.unwrap_or_default();
    let message = message_of(&body).unwrap_or(body);
    Err(match status {
        401 | 403 => ProviderError::AuthenticationFailed(message),
        404 => ProviderError::NotFound(what.to_string()),
        _ => ProviderError::ApiError { status, message },
    })
}

/// Google APIs wrap failures as `{"error": {"message": ...}}`.
pub(crate) fn google_error_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("error")?
        .get("message")?
        .as_str()
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_to_service_error() {
        let err: ServiceError = ProviderError::AuthenticationFailed("bad key".into()).into();
        assert!(err.is_permanent());

        let err: ServiceError = ProviderError::RateLimited {
            retry_after_ms: 5000,
        }
        .into();
        assert!(matches!(err, ServiceError::Api { status: 429, .. }));
        assert!(!err.is_permanent());

        let err: ServiceError = ProviderError::InvalidResponse("no candidates".into()).into();
        assert!(matches!(err, ServiceError::MalformedResponse(_)));
    }

    #[test]
    fn extracts_google_error_message() {
        let body = r#"{"error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}}"#;
        assert_eq!(
            google_error_message(body).as_deref(),
            Some("API key not valid.")
        );
        assert_eq!(google_error_message("plain text"), None);
    }
}
