use thiserror::Error;

/// Top-level error type for the Signvoice system.
///
/// Each variant wraps a subsystem-specific failure. Service adapters define
/// their own error types and are converted to `SignvoiceError` at the
/// orchestration boundary so that the `?` operator works across crates.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SignvoiceError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Prediction error: {0}")]
    Prediction(String),

    #[error("Suggestion error: {0}")]
    Suggestion(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for SignvoiceError {
    fn from(err: toml::de::Error) -> Self {
        SignvoiceError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SignvoiceError {
    fn from(err: toml::ser::Error) -> Self {
        SignvoiceError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SignvoiceError {
    fn from(err: serde_json::Error) -> Self {
        SignvoiceError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Signvoice operations.
pub type Result<T> = std::result::Result<T, SignvoiceError>;
