pub mod config;
pub mod error;
pub mod types;

pub use config::SignvoiceConfig;
pub use error::{Result, SignvoiceError};
pub use types::{Prediction, Translation, DEFAULT_ALTERNATES};
