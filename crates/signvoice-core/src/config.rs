use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::Result;

/// Top-level configuration for the Signvoice client.
///
/// Loaded from `~/.signvoice/config.toml` by default. Each section covers
/// one collaborator or cross-cutting concern.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SignvoiceConfig {
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
    #[serde(default)]
    pub translation: TranslationConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
}

impl SignvoiceConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: SignvoiceConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }
}

/// Recognition/translation/speech backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Base URL of the backend serving the prediction, suggestion,
    /// translation, and speech endpoints.
    pub base_url: String,
    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_string(),
            request_timeout_secs: 5,
        }
    }
}

/// Prediction polling cadence.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollingConfig {
    /// Interval between prediction polls, in milliseconds.
    pub interval_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self { interval_ms: 500 }
    }
}

/// Word-completion suggestion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuggestionConfig {
    /// Maximum number of suggestions shown to the user.
    pub max_count: usize,
    /// Fallback suggestions offered when the backend has none or is down,
    /// so the user always has actionable choices.
    pub fallback: Vec<String>,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            max_count: 4,
            fallback: [
                "hello", "please", "thank", "you", "good", "morning", "night", "help",
            ]
            .iter()
            .map(|w| w.to_string())
            .collect(),
        }
    }
}

/// Sentence translation settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslationConfig {
    /// Target language code sent to the translation endpoint.
    pub target_lang: String,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            target_lang: "kn".to_string(),
        }
    }
}

/// Speech playback settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    /// Language code sent to the speech endpoint.
    pub lang: String,
    /// The speech endpoint is fire-and-forget: playback completion is not
    /// reported, so the busy flag is released after this many seconds.
    pub busy_timeout_secs: u64,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            lang: "kn".to_string(),
            busy_timeout_secs: 3,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
