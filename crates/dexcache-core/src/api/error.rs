use thiserror::Error;

/// Failure of a remote fetch: transport, HTTP status, or response decoding.
#[derive(Error, Debug)]
pub enum RemoteFetchError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limited by remote service")]
    RateLimited,

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Unexpected response: {0}")]
    UnexpectedStatus(String),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Maximum length for error response bodies in error messages
const MAX_ERROR_BODY_LENGTH: usize = 500;

impl RemoteFetchError {
    /// Truncate a response body to avoid logging excessive data
    fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }

    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let truncated = Self::truncate_body(body);
        match status.as_u16() {
            404 => RemoteFetchError::NotFound(truncated),
            429 => RemoteFetchError::RateLimited,
            500..=599 => RemoteFetchError::ServerError(truncated),
            _ => RemoteFetchError::UnexpectedStatus(format!("Status {}: {}", status, truncated)),
        }
    }
}

impl From<serde_json::Error> for RemoteFetchError {
    fn from(err: serde_json::Error) -> Self {
        RemoteFetchError::Decode(err.to_string())
    }
}
