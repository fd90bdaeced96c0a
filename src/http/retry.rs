//! Retry policy for proxy requests.

use reqwest::StatusCode;

/// Maximum number of attempts per request.
pub const MAX_RETRIES: usize = 3;

/// Delay between attempts in milliseconds.
pub const RETRY_DELAY_MS: u64 = 1000;

/// Responses that will not succeed on retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NonRetryableError {
    /// HTTP 404 or 410; module proxies answer 410 for unknown modules.
    NotFound(String),
    /// Any other 4xx status.
    ClientError(u16, String),
}

impl NonRetryableError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, NonRetryableError::NotFound(_))
    }
}

impl std::fmt::Display for NonRetryableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NonRetryableError::NotFound(url) => write!(f, "Not found: {}", url),
            NonRetryableError::ClientError(status, url) => {
                write!(f, "HTTP {} error: {}", status, url)
            }
        }
    }
}

impl std::error::Error for NonRetryableError {}

/// Returns Ok(()) if the error is worth retrying.
pub fn classify_error(error: &reqwest::Error) -> Result<(), NonRetryableError> {
    let url = error
        .url()
        .map(|u| u.to_string())
        .unwrap_or_default();

    match error.status() {
        Some(StatusCode::NOT_FOUND) | Some(StatusCode::GONE) => {
            Err(NonRetryableError::NotFound(url))
        }
        Some(status) if status.is_client_error() => {
            Err(NonRetryableError::ClientError(status.as_u16(), url))
        }
        // 5xx, timeouts and connection failures
        _ => Ok(()),
    }
}

/// Wrap an error from `error_for_status()`, marking it non-retryable when
/// the status says so.
pub fn check_retryable(error: reqwest::Error) -> anyhow::Error {
    match classify_error(&error) {
        Ok(()) => anyhow::Error::from(error),
        Err(non_retryable) => anyhow::Error::from(non_retryable),
    }
}
