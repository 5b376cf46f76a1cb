//! CLI argument definitions for the Signvoice client.
//!
//! Uses `clap` with derive macros. Priority resolution:
//! CLI args > env vars > config file > defaults.

use clap::Parser;
use std::path::PathBuf;

/// Signvoice — assistive gesture-to-speech composition client.
#[derive(Parser, Debug)]
#[command(name = "signvoice", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,

    /// Base URL of the recognition/translation/speech backend.
    #[arg(short = 'b', long = "base-url")]
    pub base_url: Option<String>,

    /// Target language code for translation and speech.
    #[arg(short = 'l', long = "lang")]
    pub lang: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long = "log-level")]
    pub log_level: Option<String>,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > SIGNVOICE_CONFIG env var > ~/.signvoice/config.toml.
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("SIGNVOICE_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }
}

fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".signvoice").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".signvoice").join("config.toml");
    }
    PathBuf::from("config.toml")
}
