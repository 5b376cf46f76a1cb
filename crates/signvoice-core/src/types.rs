//! Domain value types shared across the Signvoice crates.
//!
//! The composition pipeline treats backend output as opaque and possibly
//! wrong, so both the prediction stream and the translation result are
//! modelled as sentinel enums: "no data" and "service failed" are distinct
//! values that the UI can render distinguishably, never empty strings.

use std::fmt;

/// Fixed alternates offered when the current prediction is not a letter.
pub const DEFAULT_ALTERNATES: [char; 3] = ['A', 'B', 'C'];

/// The most recent predicted character from the recognition backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prediction {
    /// A single predicted letter, stored uppercase.
    Letter(char),
    /// The backend responded but has no confident prediction.
    None,
    /// The poll failed (network error or malformed response).
    Unavailable,
}

impl Prediction {
    /// Parse the backend's `prediction` field.
    ///
    /// `null`, empty, and non-alphabetic payloads all map to `None`; only a
    /// leading ASCII letter produces `Letter`. Transport failures are mapped
    /// to `Unavailable` by the caller, never here.
    pub fn from_backend(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some(s) if !s.is_empty() => {
                let first = s.chars().next().unwrap_or(' ');
                if first.is_ascii_alphabetic() {
                    Prediction::Letter(first.to_ascii_uppercase())
                } else {
                    Prediction::None
                }
            }
            _ => Prediction::None,
        }
    }

    /// Returns the predicted letter, or `None` for either sentinel.
    pub fn as_letter(&self) -> Option<char> {
        match self {
            Prediction::Letter(c) => Some(*c),
            _ => None,
        }
    }

    /// Returns whether this is a committable letter rather than a sentinel.
    pub fn is_letter(&self) -> bool {
        matches!(self, Prediction::Letter(_))
    }

    /// Derive the three alternate letters offered alongside this prediction.
    ///
    /// For a letter, the three cyclic successors through the alphabet
    /// (`Z` wraps to `A B C`). For either sentinel, the fixed default set.
    pub fn alternates(&self) -> [char; 3] {
        match self {
            Prediction::Letter(c) if c.is_ascii_alphabetic() => {
                let index = (c.to_ascii_uppercase() as u8 - b'A') as u32;
                let mut out = ['A'; 3];
                for (i, slot) in out.iter_mut().enumerate() {
                    let offset = (index + i as u32 + 1) % 26;
                    *slot = char::from(b'A' + offset as u8);
                }
                out
            }
            _ => DEFAULT_ALTERNATES,
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Letter(c) => write!(f, "{}", c),
            Prediction::None => write!(f, "_"),
            Prediction::Unavailable => write!(f, "!"),
        }
    }
}

/// The translation of the current sentence, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Translation {
    /// No sentence has been translated yet, or the sentence was cleared.
    None,
    /// A real translation returned by the backend.
    Ready(String),
    /// Translation failed; carries the untranslated sentence so the UI can
    /// still show something, clearly marked as not a translation.
    Offline(String),
}

impl Translation {
    /// Only a real, non-empty translation may be sent to the speech service.
    pub fn is_speakable(&self) -> bool {
        matches!(self, Translation::Ready(text) if !text.trim().is_empty())
    }

    /// The speakable text, if any.
    pub fn speakable_text(&self) -> Option<&str> {
        match self {
            Translation::Ready(text) if !text.trim().is_empty() => Some(text),
            _ => None,
        }
    }
}

impl fmt::Display for Translation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Translation::None => write!(f, "_"),
            Translation::Ready(text) => write!(f, "{}", text),
            Translation::Offline(text) => write!(f, "[offline: {}]", text),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
