//! The composition session: all text state and the commands that mutate it.
//!
//! This is a pure, synchronous state machine. Every command runs to
//! completion before control returns, so no state is ever observed
//! half-applied by the async layer around it. Responses from the
//! asynchronous collaborators re-enter through the `apply_*` methods, which
//! compare the input the response was issued for against current state and
//! silently drop anything stale.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use signvoice_core::config::SuggestionConfig;
use signvoice_core::types::{Prediction, Translation};

/// In-memory state for one composition session.
///
/// Owns the prediction display value, the staging word, the sentence, a
/// single generation of undo history, the translation sentinel, the
/// suggestion list, and the speech-busy flag. Nothing here is shared;
/// the orchestrator holds the only instance.
#[derive(Debug, Clone)]
pub struct CompositionSession {
    id: Uuid,
    started_at: DateTime<Utc>,
    current_prediction: Prediction,
    staging_word: String,
    sentence: String,
    undo_snapshot: String,
    translation: Translation,
    suggestions: Vec<String>,
    fallback_suggestions: Vec<String>,
    max_suggestions: usize,
    auto_speak: bool,
    speech_busy: bool,
    speech_epoch: u64,
}

impl CompositionSession {
    /// Create a session with empty text state and the fallback suggestions
    /// on display.
    pub fn new(suggestions: &SuggestionConfig) -> Self {
        let fallback: Vec<String> = suggestions
            .fallback
            .iter()
            .map(|w| w.to_uppercase())
            .take(suggestions.max_count)
            .collect();
        let session = Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            current_prediction: Prediction::None,
            staging_word: String::new(),
            sentence: String::new(),
            undo_snapshot: String::new(),
            translation: Translation::None,
            suggestions: fallback.clone(),
            fallback_suggestions: fallback,
            max_suggestions: suggestions.max_count,
            auto_speak: false,
            speech_busy: false,
            speech_epoch: 0,
        };
        tracing::info!(session_id = %session.id, "Composition session started");
        session
    }

    // -------------------------------------------------------------------------
    // Commands
    // -------------------------------------------------------------------------

    /// Record the latest prediction from the poller. Pure; touches nothing else.
    pub fn set_prediction(&mut self, prediction: Prediction) {
        self.current_prediction = prediction;
    }

    /// Append the current predicted letter to the staging word.
    ///
    /// Returns `true` if a letter was appended (the caller should refresh
    /// suggestions for the new prefix); no-op on either sentinel.
    pub fn commit_char(&mut self) -> bool {
        match self.current_prediction.as_letter() {
            Some(letter) => {
                self.staging_word.push(letter);
                true
            }
            None => false,
        }
    }

    /// Explicit override: append `letter` regardless of the prediction.
    ///
    /// Used when the user picks from the alternate-letter list.
    pub fn select_letter(&mut self, letter: char) {
        self.staging_word.push(letter.to_ascii_uppercase());
    }

    /// Accept a suggestion: replace the staging word with `word`.
    pub fn select_word(&mut self, word: &str) {
        self.staging_word = word.to_string();
    }

    /// Commit the staging word into the sentence.
    ///
    /// Snapshots the sentence for undo, appends the word plus one separator,
    /// and clears the staging word. Returns the new trimmed sentence for
    /// translation, or `None` if the staging word was empty or whitespace
    /// (in which case nothing changes, including the undo snapshot).
    pub fn commit_word(&mut self) -> Option<String> {
        let word = self.staging_word.trim();
        if word.is_empty() {
            return None;
        }
        self.undo_snapshot = self.sentence.clone();
        self.sentence.push_str(word);
        self.sentence.push(' ');
        self.staging_word.clear();
        self.translation = Translation::None;
        tracing::debug!(session_id = %self.id, sentence = %self.sentence, "Word committed");
        Some(self.trimmed_sentence().to_string())
    }

    /// Delete the last staged character, or the last committed word.
    ///
    /// Character-level edits are not undoable; only the word-level deletion
    /// takes an undo snapshot. Empty state is a no-op that leaves the
    /// snapshot untouched.
    pub fn delete_last(&mut self) {
        if !self.staging_word.is_empty() {
            self.staging_word.pop();
        } else if !self.sentence.trim().is_empty() {
            self.undo_snapshot = self.sentence.clone();
            let mut words: Vec<&str> = self.sentence.split_whitespace().collect();
            words.pop();
            self.sentence = if words.is_empty() {
                String::new()
            } else {
                format!("{} ", words.join(" "))
            };
            self.translation = Translation::None;
        }
    }

    /// Swap the sentence with the undo snapshot.
    ///
    /// A true swap rather than a pop, so calling this twice restores the
    /// pre-undo state. Returns the new trimmed sentence if non-empty, for
    /// retranslation.
    pub fn undo(&mut self) -> Option<String> {
        std::mem::swap(&mut self.sentence, &mut self.undo_snapshot);
        self.translation = Translation::None;
        let restored = self.trimmed_sentence();
        if restored.is_empty() {
            None
        } else {
            Some(restored.to_string())
        }
    }

    /// Reset all text state, keeping the current sentence reachable via undo.
    pub fn clear(&mut self) {
        self.undo_snapshot = self.sentence.clone();
        self.staging_word.clear();
        self.sentence.clear();
        self.translation = Translation::None;
        self.suggestions = self.fallback_suggestions.clone();
        tracing::debug!(session_id = %self.id, "Session cleared");
    }

    /// Flip the auto-speak flag and return the new value.
    pub fn toggle_auto_speak(&mut self) -> bool {
        self.auto_speak = !self.auto_speak;
        self.auto_speak
    }

    // -------------------------------------------------------------------------
    // Staleness-guarded response application
    // -------------------------------------------------------------------------

    /// Apply a suggestion response issued for `for_prefix`.
    ///
    /// Applies only if `for_prefix` still matches the current staging word
    /// (lowercased); anything else is an out-of-order response and is
    /// dropped. An empty result falls back to the fixed default list so the
    /// UI always offers actionable choices. Returns whether it was applied.
    pub fn apply_suggestions(&mut self, for_prefix: &str, suggestions: &[String]) -> bool {
        if for_prefix != self.staging_word.to_lowercase() {
            return false;
        }
        self.suggestions = if suggestions.is_empty() {
            self.fallback_suggestions.clone()
        } else {
            suggestions
                .iter()
                .take(self.max_suggestions)
                .map(|s| s.to_uppercase())
                .collect()
        };
        true
    }

    /// Apply a translation response issued for `for_sentence`.
    ///
    /// Applies only if `for_sentence` still matches the current trimmed
    /// sentence. Returns whether it was applied.
    pub fn apply_translation(&mut self, for_sentence: &str, translation: Translation) -> bool {
        if for_sentence != self.trimmed_sentence() {
            return false;
        }
        self.translation = translation;
        true
    }

    // -------------------------------------------------------------------------
    // Speech busy window
    // -------------------------------------------------------------------------

    /// Mark the start of an exclusive speech window.
    ///
    /// Returns the epoch identifying this window; the matching
    /// [`release_speech`](Self::release_speech) call must present it.
    pub fn begin_speech(&mut self) -> u64 {
        self.speech_busy = true;
        self.speech_epoch += 1;
        self.speech_epoch
    }

    /// Release the speech window identified by `epoch`.
    ///
    /// A stale epoch (an older window's fallback timer firing after a newer
    /// request started) is ignored. Returns whether the flag was cleared.
    pub fn release_speech(&mut self, epoch: u64) -> bool {
        if self.speech_busy && epoch == self.speech_epoch {
            self.speech_busy = false;
            true
        } else {
            false
        }
    }

    /// Clear the busy flag immediately and invalidate any pending release.
    pub fn force_release_speech(&mut self) {
        self.speech_busy = false;
        self.speech_epoch += 1;
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn prediction(&self) -> Prediction {
        self.current_prediction
    }

    /// The alternate letters derived from the current prediction.
    pub fn alternate_letters(&self) -> [char; 3] {
        self.current_prediction.alternates()
    }

    pub fn staging_word(&self) -> &str {
        &self.staging_word
    }

    /// The sentence as stored, including the trailing separator left by the
    /// most recent commit.
    pub fn sentence(&self) -> &str {
        &self.sentence
    }

    /// The sentence with separators trimmed, as sent downstream.
    pub fn trimmed_sentence(&self) -> &str {
        self.sentence.trim()
    }

    pub fn undo_snapshot(&self) -> &str {
        &self.undo_snapshot
    }

    pub fn translation(&self) -> &Translation {
        &self.translation
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn auto_speak(&self) -> bool {
        self.auto_speak
    }

    pub fn speech_busy(&self) -> bool {
        self.speech_busy
    }
}

impl Default for CompositionSession {
    fn default() -> Self {
        Self::new(&SuggestionConfig::default())
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> CompositionSession {
        CompositionSession::new(&SuggestionConfig::default())
    }

    #[test]
    fn test_initial_state() {
        let s = session();
        assert!(!s.id().is_nil());
        assert!(s.started_at() <= Utc::now());
        assert_eq!(s.prediction(), Prediction::None);
        assert_eq!(s.staging_word(), "");
        assert_eq!(s.sentence(), "");
        assert_eq!(s.undo_snapshot(), "");
        assert_eq!(*s.translation(), Translation::None);
        assert!(!s.auto_speak());
        assert!(!s.speech_busy());
        // Fallback suggestions are on display from the start.
        assert!(!s.suggestions().is_empty());
    }

    #[test]
    fn test_staging_word_is_concatenation_of_appends() {
        let mut s = session();
        s.set_prediction(Prediction::Letter('H'));
        assert!(s.commit_char());
        s.select_letter('e');
        s.set_prediction(Prediction::Letter('Y'));
        assert!(s.commit_char());
        assert_eq!(s.staging_word(), "HEY");
    }

    #[test]
    fn test_commit_char_noop_on_sentinels() {
        let mut s = session();
        s.set_prediction(Prediction::None);
        assert!(!s.commit_char());
        s.set_prediction(Prediction::Unavailable);
        assert!(!s.commit_char());
        assert_eq!(s.staging_word(), "");
    }

    #[test]
    fn test_select_word_replaces_staging() {
        let mut s = session();
        s.select_letter('H');
        s.select_letter('E');
        s.select_word("HELLO");
        assert_eq!(s.staging_word(), "HELLO");
    }

    #[test]
    fn test_commit_word_appends_with_separator() {
        let mut s = session();
        s.select_word("HELLO");
        let to_translate = s.commit_word();
        assert_eq!(to_translate.as_deref(), Some("HELLO"));
        assert_eq!(s.sentence(), "HELLO ");
        assert_eq!(s.staging_word(), "");
        assert_eq!(s.undo_snapshot(), "");

        s.select_word("YOU");
        let to_translate = s.commit_word();
        assert_eq!(to_translate.as_deref(), Some("HELLO YOU"));
        assert_eq!(s.sentence(), "HELLO YOU ");
        assert_eq!(s.undo_snapshot(), "HELLO ");
    }

    #[test]
    fn test_commit_word_empty_staging_is_noop() {
        let mut s = session();
        s.select_word("HELLO");
        s.commit_word();
        let snapshot_before = s.undo_snapshot().to_string();

        s.select_word("   ");
        assert!(s.commit_word().is_none());
        assert_eq!(s.sentence(), "HELLO ");
        assert_eq!(s.undo_snapshot(), snapshot_before);
    }

    #[test]
    fn test_commit_word_clears_translation() {
        let mut s = session();
        s.select_word("HELLO");
        s.commit_word();
        assert!(s.apply_translation("HELLO", Translation::Ready("hola".to_string())));
        s.select_word("YOU");
        s.commit_word();
        assert_eq!(*s.translation(), Translation::None);
    }

    #[test]
    fn test_delete_last_pops_staging_char_without_snapshot() {
        let mut s = session();
        s.select_word("HELLO");
        s.commit_word();
        s.select_letter('A');
        s.select_letter('B');
        s.delete_last();
        assert_eq!(s.staging_word(), "A");
        // Character edits never touch the snapshot.
        assert_eq!(s.undo_snapshot(), "");
    }

    #[test]
    fn test_delete_last_drops_last_word_with_snapshot() {
        let mut s = session();
        s.select_word("GOOD");
        s.commit_word();
        s.select_word("MORNING");
        s.commit_word();

        s.delete_last();
        assert_eq!(s.sentence(), "GOOD ");
        assert_eq!(s.undo_snapshot(), "GOOD MORNING ");

        s.delete_last();
        assert_eq!(s.sentence(), "");
        assert_eq!(s.undo_snapshot(), "GOOD ");
    }

    #[test]
    fn test_delete_last_on_empty_state_is_noop() {
        let mut s = session();
        s.select_word("HI");
        s.commit_word();
        s.delete_last(); // sentence now empty
        let snapshot = s.undo_snapshot().to_string();

        s.delete_last(); // nothing left to delete
        assert_eq!(s.sentence(), "");
        assert_eq!(s.staging_word(), "");
        assert_eq!(s.undo_snapshot(), snapshot);
    }

    #[test]
    fn test_undo_is_its_own_inverse() {
        let mut s = session();
        s.select_letter('H');
        s.select_letter('E');
        assert_eq!(s.staging_word(), "HE");
        s.commit_word();
        assert_eq!(s.sentence(), "HE ");
        assert_eq!(s.undo_snapshot(), "");

        assert!(s.undo().is_none()); // restored sentence is empty
        assert_eq!(s.sentence(), "");

        assert_eq!(s.undo().as_deref(), Some("HE"));
        assert_eq!(s.sentence(), "HE ");
    }

    #[test]
    fn test_undo_clears_translation() {
        let mut s = session();
        s.select_word("HI");
        s.commit_word();
        s.apply_translation("HI", Translation::Ready("hei".to_string()));
        s.undo();
        assert_eq!(*s.translation(), Translation::None);
    }

    #[test]
    fn test_clear_resets_everything_but_keeps_undo() {
        let mut s = session();
        s.select_word("HELLO");
        s.commit_word();
        s.select_letter('A');
        s.apply_translation("HELLO", Translation::Ready("hola".to_string()));

        s.clear();
        assert_eq!(s.staging_word(), "");
        assert_eq!(s.sentence(), "");
        assert_eq!(*s.translation(), Translation::None);
        assert_eq!(s.undo_snapshot(), "HELLO ");
        let d = SuggestionConfig::default();
        let expected: Vec<String> = d
            .fallback
            .iter()
            .map(|w| w.to_uppercase())
            .take(d.max_count)
            .collect();
        assert_eq!(s.suggestions(), &expected[..]);

        // Undo after clear restores the sentence.
        s.undo();
        assert_eq!(s.sentence(), "HELLO ");
    }

    #[test]
    fn test_toggle_auto_speak() {
        let mut s = session();
        assert!(s.toggle_auto_speak());
        assert!(s.auto_speak());
        assert!(!s.toggle_auto_speak());
        assert!(!s.auto_speak());
    }

    #[test]
    fn test_apply_suggestions_matching_prefix() {
        let mut s = session();
        s.select_letter('H');
        s.select_letter('E');
        let applied = s.apply_suggestions(
            "he",
            &["hello".to_string(), "help".to_string(), "hey".to_string()],
        );
        assert!(applied);
        assert_eq!(s.suggestions(), ["HELLO", "HELP", "HEY"]);
    }

    #[test]
    fn test_apply_suggestions_stale_prefix_dropped() {
        let mut s = session();
        s.select_letter('H');
        s.select_letter('E');
        let before = s.suggestions().to_vec();
        // Response for the old one-letter prefix arrives late.
        let applied = s.apply_suggestions("h", &["hat".to_string()]);
        assert!(!applied);
        assert_eq!(s.suggestions(), before);
    }

    #[test]
    fn test_apply_suggestions_empty_falls_back() {
        let mut s = session();
        s.select_letter('Q');
        assert!(s.apply_suggestions("q", &[]));
        assert!(!s.suggestions().is_empty());
        let d = SuggestionConfig::default();
        assert_eq!(s.suggestions().len(), d.fallback.len().min(d.max_count));
    }

    #[test]
    fn test_apply_suggestions_capped_and_uppercased() {
        let mut s = session();
        s.select_letter('H');
        let many: Vec<String> = ["ha", "hb", "hc", "hd", "he", "hf"]
            .iter()
            .map(|w| w.to_string())
            .collect();
        assert!(s.apply_suggestions("h", &many));
        assert_eq!(s.suggestions(), ["HA", "HB", "HC", "HD"]);
    }

    #[test]
    fn test_apply_translation_matching_sentence() {
        let mut s = session();
        s.select_word("HELLO");
        s.commit_word();
        assert!(s.apply_translation("HELLO", Translation::Ready("hola".to_string())));
        assert_eq!(*s.translation(), Translation::Ready("hola".to_string()));
    }

    #[test]
    fn test_apply_translation_stale_sentence_dropped() {
        let mut s = session();
        s.select_word("HELLO");
        s.commit_word();
        s.select_word("YOU");
        s.commit_word();
        // Response for the old sentence arrives after the second commit.
        let applied = s.apply_translation("HELLO", Translation::Ready("hola".to_string()));
        assert!(!applied);
        assert_eq!(*s.translation(), Translation::None);
    }

    #[test]
    fn test_speech_epoch_release() {
        let mut s = session();
        let first = s.begin_speech();
        assert!(s.speech_busy());

        // A newer window supersedes the old one.
        s.force_release_speech();
        let second = s.begin_speech();
        assert_ne!(first, second);

        // The old window's release must not clear the new busy flag.
        assert!(!s.release_speech(first));
        assert!(s.speech_busy());

        assert!(s.release_speech(second));
        assert!(!s.speech_busy());
    }

    #[test]
    fn test_release_speech_when_idle_is_noop() {
        let mut s = session();
        assert!(!s.release_speech(1));
        assert!(!s.speech_busy());
    }

    #[test]
    fn test_alternate_letters_follow_prediction() {
        let mut s = session();
        s.set_prediction(Prediction::Letter('Z'));
        assert_eq!(s.alternate_letters(), ['A', 'B', 'C']);
        s.set_prediction(Prediction::None);
        assert_eq!(s.alternate_letters(), ['A', 'B', 'C']);
        s.set_prediction(Prediction::Letter('B'));
        assert_eq!(s.alternate_letters(), ['C', 'D', 'E']);
    }

    #[test]
    fn test_trimmed_sentence() {
        let mut s = session();
        s.select_word("HI");
        s.commit_word();
        assert_eq!(s.sentence(), "HI ");
        assert_eq!(s.trimmed_sentence(), "HI");
    }
}
