//! Error type for the backend service adapters.

/// Errors from a backend service call.
///
/// These never propagate as faults: the orchestration layer converts them
/// into sentinel state values or user-visible messages.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("backend rejected request: {0}")]
    Rejected(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else {
            ClientError::Request(err.to_string())
        }
    }
}
