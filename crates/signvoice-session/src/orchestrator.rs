//! Async orchestration around the composition session.
//!
//! The orchestrator owns the one session instance and the three service
//! collaborators. Commands mutate the session synchronously under the lock,
//! release it across the network await, then re-apply the response through
//! the session's staleness guards. Speech playback is exclusive: a busy
//! window is opened on request acceptance and closed by an error, an
//! explicit stop, or a fallback timer (the speech endpoint is
//! fire-and-forget and never reports completion).

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use signvoice_client::traits::{SpeechService, SuggestionSource, TranslationService};
use signvoice_core::config::SignvoiceConfig;
use signvoice_core::error::{Result, SignvoiceError};
use signvoice_core::types::{Prediction, Translation};

use crate::session::CompositionSession;

/// A read-only copy of the session state for the UI layer.
#[derive(Debug, Clone)]
pub struct SessionSnapshot {
    pub prediction: Prediction,
    pub alternate_letters: [char; 3],
    pub staging_word: String,
    pub sentence: String,
    pub suggestions: Vec<String>,
    pub translation: Translation,
    pub auto_speak: bool,
    pub speech_busy: bool,
}

/// Coordinates the session with the suggestion, translation, and speech
/// services. One instance per session; cheap to share behind an `Arc`.
pub struct SessionOrchestrator {
    session: Arc<Mutex<CompositionSession>>,
    suggestions: Arc<dyn SuggestionSource>,
    translator: Arc<dyn TranslationService>,
    speech: Arc<dyn SpeechService>,
    target_lang: String,
    speech_lang: String,
    busy_timeout: Duration,
}

impl SessionOrchestrator {
    /// Create an orchestrator with a fresh session.
    pub fn new(
        config: &SignvoiceConfig,
        suggestions: Arc<dyn SuggestionSource>,
        translator: Arc<dyn TranslationService>,
        speech: Arc<dyn SpeechService>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(CompositionSession::new(&config.suggestions))),
            suggestions,
            translator,
            speech,
            target_lang: config.translation.target_lang.clone(),
            speech_lang: config.speech.lang.clone(),
            busy_timeout: Duration::from_secs(config.speech.busy_timeout_secs),
        }
    }

    /// Override the speech busy-release timeout.
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = timeout;
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, CompositionSession>> {
        self.session
            .lock()
            .map_err(|e| SignvoiceError::Session(format!("session mutex poisoned: {}", e)))
    }

    /// Record the latest prediction from the poller.
    pub fn set_prediction(&self, prediction: Prediction) -> Result<()> {
        self.lock()?.set_prediction(prediction);
        Ok(())
    }

    /// Commit the current predicted letter to the staging word and refresh
    /// suggestions for the new prefix. No-op when the prediction is a
    /// sentinel.
    pub async fn commit_char(&self) -> Result<()> {
        let prefix = {
            let mut session = self.lock()?;
            if !session.commit_char() {
                return Ok(());
            }
            session.staging_word().to_lowercase()
        };
        self.refresh_suggestions(prefix).await
    }

    /// Append an explicitly chosen letter and refresh suggestions.
    pub async fn select_letter(&self, letter: char) -> Result<()> {
        let prefix = {
            let mut session = self.lock()?;
            session.select_letter(letter);
            session.staging_word().to_lowercase()
        };
        self.refresh_suggestions(prefix).await
    }

    /// Accept a suggestion as the staging word.
    pub fn select_word(&self, word: &str) -> Result<()> {
        self.lock()?.select_word(word);
        Ok(())
    }

    /// Commit the staging word into the sentence and translate the result.
    pub async fn commit_word(&self) -> Result<()> {
        let to_translate = self.lock()?.commit_word();
        match to_translate {
            Some(sentence) => self.refresh_translation(sentence).await,
            None => Ok(()),
        }
    }

    /// Delete the last staged character or the last committed word, then
    /// refresh suggestions for whatever prefix remains.
    pub async fn delete_last(&self) -> Result<()> {
        let prefix = {
            let mut session = self.lock()?;
            session.delete_last();
            session.staging_word().to_lowercase()
        };
        self.refresh_suggestions(prefix).await
    }

    /// Swap the sentence with the undo snapshot and retranslate.
    pub async fn undo(&self) -> Result<()> {
        let to_translate = self.lock()?.undo();
        match to_translate {
            Some(sentence) => self.refresh_translation(sentence).await,
            None => Ok(()),
        }
    }

    /// Reset all text state and stop any in-flight playback.
    pub async fn clear(&self) -> Result<()> {
        self.lock()?.clear();
        if let Err(e) = self.stop_speech().await {
            tracing::warn!(error = %e, "Speech stop during clear failed");
        }
        Ok(())
    }

    /// Flip auto-speak and return the new value. Has no effect on in-flight
    /// operations.
    pub fn toggle_auto_speak(&self) -> Result<bool> {
        Ok(self.lock()?.toggle_auto_speak())
    }

    /// Manually speak the current translation.
    ///
    /// Rejected without a network call when there is no real translation to
    /// speak, and rejected while a previous playback window is still open.
    pub async fn speak_translation(&self) -> Result<()> {
        let (text, epoch) = {
            let mut session = self.lock()?;
            let text = match session.translation().speakable_text() {
                Some(t) => t.to_string(),
                None => {
                    return Err(SignvoiceError::Speech(
                        "no valid translation to speak".to_string(),
                    ))
                }
            };
            if session.speech_busy() {
                return Err(SignvoiceError::Speech(
                    "playback already in progress".to_string(),
                ));
            }
            let epoch = session.begin_speech();
            (text, epoch)
        };
        self.dispatch_speech(text, epoch).await
    }

    /// Cancel any in-flight playback and clear the busy flag immediately.
    pub async fn stop_speech(&self) -> Result<()> {
        self.lock()?.force_release_speech();
        self.speech
            .stop()
            .await
            .map_err(|e| SignvoiceError::Speech(e.to_string()))
    }

    /// Write the trimmed sentence to `path` as plain text.
    pub fn export_sentence(&self, path: &Path) -> Result<()> {
        let text = self.lock()?.trimmed_sentence().to_string();
        if text.is_empty() {
            return Err(SignvoiceError::Session("no sentence to save".to_string()));
        }
        std::fs::write(path, &text)?;
        tracing::info!(path = %path.display(), "Sentence exported");
        Ok(())
    }

    /// Copy out the current session state for display.
    pub fn snapshot(&self) -> Result<SessionSnapshot> {
        let session = self.lock()?;
        Ok(SessionSnapshot {
            prediction: session.prediction(),
            alternate_letters: session.alternate_letters(),
            staging_word: session.staging_word().to_string(),
            sentence: session.sentence().to_string(),
            suggestions: session.suggestions().to_vec(),
            translation: session.translation().clone(),
            auto_speak: session.auto_speak(),
            speech_busy: session.speech_busy(),
        })
    }

    /// Fetch suggestions for `prefix` and apply them under the staleness
    /// guard. Lookup failures fall back to the default list; they are never
    /// surfaced as hard errors.
    async fn refresh_suggestions(&self, prefix: String) -> Result<()> {
        let fetched = if prefix.trim().is_empty() {
            Vec::new()
        } else {
            match self.suggestions.fetch_suggestions(&prefix).await {
                Ok(list) => list,
                Err(e) => {
                    tracing::debug!(error = %e, prefix = %prefix, "Suggestion lookup failed, using fallback");
                    Vec::new()
                }
            }
        };
        let mut session = self.lock()?;
        if !session.apply_suggestions(&prefix, &fetched) {
            tracing::debug!(prefix = %prefix, "Stale suggestion response dropped");
        }
        Ok(())
    }

    /// Translate `sentence` and apply the result under the staleness guard.
    ///
    /// A failed or empty translation becomes the offline sentinel, which is
    /// never speakable. A freshly applied real translation triggers
    /// auto-speak when enabled and the speech window is free; a busy window
    /// drops the request rather than queueing it.
    async fn refresh_translation(&self, sentence: String) -> Result<()> {
        let translation = match self.translator.translate(&sentence, &self.target_lang).await {
            Ok(text) if !text.trim().is_empty() => Translation::Ready(text),
            Ok(_) => {
                tracing::warn!("Translation backend returned empty text");
                Translation::Offline(sentence.clone())
            }
            Err(e) => {
                tracing::warn!(error = %e, "Translation failed");
                Translation::Offline(sentence.clone())
            }
        };

        let speak_request = {
            let mut session = self.lock()?;
            if !session.apply_translation(&sentence, translation.clone()) {
                tracing::debug!("Stale translation response dropped");
                None
            } else if session.auto_speak() {
                match translation.speakable_text() {
                    Some(text) if !session.speech_busy() => {
                        let epoch = session.begin_speech();
                        Some((text.to_string(), epoch))
                    }
                    Some(_) => {
                        tracing::debug!("Speech busy, auto-speak request dropped");
                        None
                    }
                    None => None,
                }
            } else {
                None
            }
        };

        if let Some((text, epoch)) = speak_request {
            if let Err(e) = self.dispatch_speech(text, epoch).await {
                tracing::warn!(error = %e, "Auto-speak request failed");
            }
        }
        Ok(())
    }

    /// Send the speech request for an already-opened busy window.
    ///
    /// On acceptance, arms the fallback timer that releases the window if no
    /// explicit stop arrives first. On rejection, closes the window and
    /// returns the error.
    async fn dispatch_speech(&self, text: String, epoch: u64) -> Result<()> {
        match self.speech.speak(&text, &self.speech_lang).await {
            Ok(()) => {
                let session = Arc::clone(&self.session);
                let timeout = self.busy_timeout;
                tokio::spawn(async move {
                    tokio::time::sleep(timeout).await;
                    if let Ok(mut s) = session.lock() {
                        if s.release_speech(epoch) {
                            tracing::debug!("Speech busy window released by fallback timeout");
                        }
                    }
                });
                Ok(())
            }
            Err(e) => {
                self.lock()?.release_speech(epoch);
                Err(SignvoiceError::Speech(e.to_string()))
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
