use thiserror::Error;

/// Errors produced by backend requests.
///
/// Cloneable so it can travel inside application messages; the underlying
/// `reqwest` errors are flattened to strings at the client boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    /// The request never produced a usable response (connection refused,
    /// DNS failure, broken transfer).
    #[error("request failed: {0}")]
    Transport(String),

    /// The response arrived but its body was not the expected JSON shape.
    #[error("malformed response: {0}")]
    Decode(String),

    /// The backend answered with its own error message; rendered verbatim.
    #[error("{0}")]
    Backend(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Transport(err.to_string())
        }
    }
}
