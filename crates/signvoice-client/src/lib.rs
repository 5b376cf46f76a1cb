//! Service adapters for the Signvoice backend collaborators.
//!
//! The composition core only ever talks to the four async traits defined in
//! [`traits`]; [`http`] provides the production implementation against the
//! backend's GET endpoints.

pub mod error;
pub mod http;
pub mod traits;

pub use error::ClientError;
pub use http::HttpBackend;
pub use traits::{PredictionSource, SpeechService, SuggestionSource, TranslationService};
