//! HTTP implementation of the service-adapter traits.
//!
//! Talks to the recognition backend's GET endpoints:
//! `/get_prediction`, `/suggest`, `/translate`, `/speak`, `/stop_speech`.

use std::time::Duration;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;

use signvoice_core::config::BackendConfig;
use signvoice_core::types::Prediction;

use crate::error::ClientError;
use crate::traits::{PredictionSource, SpeechService, SuggestionSource, TranslationService};

#[derive(Debug, Deserialize)]
struct PredictionPayload {
    prediction: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestionPayload {
    #[serde(default)]
    suggestions: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct TranslationPayload {
    translated: String,
}

#[derive(Debug, Deserialize)]
struct SpeechPayload {
    status: String,
    message: Option<String>,
}

/// Backend client implementing all four service contracts over HTTP.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl HttpBackend {
    /// Create a client for the backend at `base_url`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            http: reqwest::Client::new(),
        }
    }

    /// Create a client from the backend configuration section.
    pub fn from_config(config: &BackendConfig) -> Self {
        Self::new(
            config.base_url.clone(),
            Duration::from_secs(config.request_timeout_secs),
        )
    }

    /// Base URL this client was configured with (trailing slashes trimmed).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .http
            .get(&url)
            .query(query)
            .timeout(self.timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Request(format!(
                "{} returned {}",
                path, status
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }
}

#[async_trait]
impl PredictionSource for HttpBackend {
    async fn fetch_prediction(&self) -> Result<Prediction, ClientError> {
        let payload: PredictionPayload = self.get_json("/get_prediction", &[]).await?;
        Ok(Prediction::from_backend(payload.prediction.as_deref()))
    }
}

#[async_trait]
impl SuggestionSource for HttpBackend {
    async fn fetch_suggestions(&self, prefix: &str) -> Result<Vec<String>, ClientError> {
        let payload: SuggestionPayload =
            self.get_json("/suggest", &[("prefix", prefix)]).await?;
        tracing::debug!(prefix = %prefix, count = payload.suggestions.len(), "Suggestions fetched");
        Ok(payload.suggestions)
    }
}

#[async_trait]
impl TranslationService for HttpBackend {
    async fn translate(&self, text: &str, lang: &str) -> Result<String, ClientError> {
        let payload: TranslationPayload = self
            .get_json("/translate", &[("lang", lang), ("text", text)])
            .await?;
        Ok(payload.translated)
    }
}

#[async_trait]
impl SpeechService for HttpBackend {
    async fn speak(&self, text: &str, lang: &str) -> Result<(), ClientError> {
        let payload: SpeechPayload = self
            .get_json("/speak", &[("text", text), ("lang", lang)])
            .await?;
        if payload.status == "success" {
            Ok(())
        } else {
            Err(ClientError::Rejected(
                payload
                    .message
                    .unwrap_or_else(|| "speech backend error".to_string()),
            ))
        }
    }

    async fn stop(&self) -> Result<(), ClientError> {
        let url = format!("{}/stop_speech", self.base_url);
        let response = self.http.get(&url).timeout(self.timeout).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ClientError::Request(format!(
                "/stop_speech returned {}",
                status
            )));
        }
        Ok(())
    }
}

// =============================================================================
// Tests
// =============================================================================
