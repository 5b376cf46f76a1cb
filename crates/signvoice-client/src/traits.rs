//! Contracts the composition core requires from its collaborators.
//!
//! Each trait covers one backend concern so the orchestrator can be tested
//! against in-memory doubles and the transport swapped without touching the
//! session logic.

use async_trait::async_trait;

use signvoice_core::types::Prediction;

use crate::error::ClientError;

/// Source of the current predicted character.
#[async_trait]
pub trait PredictionSource: Send + Sync {
    /// Fetch the backend's current prediction.
    ///
    /// A backend that has no confident prediction returns
    /// `Prediction::None`; transport and parse failures are errors, which
    /// the poller renders as `Prediction::Unavailable`.
    async fn fetch_prediction(&self) -> Result<Prediction, ClientError>;
}

/// Source of ranked word completions for a lowercase prefix.
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Fetch completions for `prefix`, ordered best-first.
    async fn fetch_suggestions(&self, prefix: &str) -> Result<Vec<String>, ClientError>;
}

/// Best-effort sentence translation.
#[async_trait]
pub trait TranslationService: Send + Sync {
    /// Translate `text` into the target language `lang`.
    async fn translate(&self, text: &str, lang: &str) -> Result<String, ClientError>;
}

/// Fire-and-forget speech playback with explicit cancellation.
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Request playback of `text`. Completion is not reported; the caller
    /// owns the busy window.
    async fn speak(&self, text: &str, lang: &str) -> Result<(), ClientError>;

    /// Cancel any in-flight playback.
    async fn stop(&self) -> Result<(), ClientError>;
}
