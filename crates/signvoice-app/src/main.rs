//! Signvoice binary - composition root.
//!
//! Ties the crates together into one interactive client:
//! 1. Load configuration from TOML (with CLI overrides)
//! 2. Build the HTTP backend adapters
//! 3. Start the background prediction poller
//! 4. Drive the session orchestrator from a stdin command loop
//!
//! The stdin loop stands in for the UI-binding layer: each line maps to one
//! session command, and the session snapshot is printed after every command.

mod cli;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::AsyncBufReadExt;

use signvoice_client::HttpBackend;
use signvoice_core::SignvoiceConfig;
use signvoice_session::{PredictionPoller, SessionOrchestrator, SessionSnapshot};

use cli::CliArgs;

fn print_snapshot(snap: &SessionSnapshot) {
    let alternates: String = snap
        .alternate_letters
        .iter()
        .map(|c| c.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    println!("  prediction:  {}   (alternates: {})", snap.prediction, alternates);
    println!("  word:        {}", snap.staging_word);
    println!("  sentence:    {}", snap.sentence);
    println!("  suggestions: {}", snap.suggestions.join(" "));
    println!("  translation: {}", snap.translation);
    println!(
        "  auto-speak:  {}   speaking: {}",
        if snap.auto_speak { "on" } else { "off" },
        if snap.speech_busy { "yes" } else { "no" }
    );
}

fn print_help() {
    println!("Commands:");
    println!("  <letter>      append a letter to the current word");
    println!("  next          commit the predicted letter");
    println!("  word <text>   replace the current word (accept a suggestion)");
    println!("  space         commit the current word into the sentence");
    println!("  del           delete last letter, or last word");
    println!("  undo          swap sentence with previous version");
    println!("  clear         reset everything");
    println!("  speak         speak the current translation");
    println!("  stop          stop playback");
    println!("  auto          toggle auto-speak");
    println!("  save <path>   save the sentence to a file");
    println!("  show          print the session state");
    println!("  quit          exit");
}

async fn handle_command(orchestrator: &SessionOrchestrator, line: &str) {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return;
    };
    let arg = parts.next();

    let result = match command.to_lowercase().as_str() {
        "next" | "." => orchestrator.commit_char().await,
        "word" => match arg {
            Some(w) => orchestrator.select_word(w),
            None => {
                println!("usage: word <text>");
                return;
            }
        },
        "space" | "commit" => orchestrator.commit_word().await,
        "del" => orchestrator.delete_last().await,
        "undo" => orchestrator.undo().await,
        "clear" => orchestrator.clear().await,
        "speak" => orchestrator.speak_translation().await,
        "stop" => orchestrator.stop_speech().await,
        "auto" => orchestrator.toggle_auto_speak().map(|_| ()),
        "save" => match arg {
            Some(p) => orchestrator.export_sentence(Path::new(p)),
            None => {
                println!("usage: save <path>");
                return;
            }
        },
        "show" => Ok(()),
        "help" | "?" => {
            print_help();
            return;
        }
        single if single.len() == 1 && single.chars().all(|c| c.is_ascii_alphabetic()) => {
            let letter = single.chars().next().unwrap_or('a');
            orchestrator.select_letter(letter).await
        }
        other => {
            println!("unknown command: {} (try 'help')", other);
            return;
        }
    };

    if let Err(e) = result {
        // Command failures degrade to messages; nothing here is fatal.
        println!("  ! {}", e);
    }

    match orchestrator.snapshot() {
        Ok(snap) => print_snapshot(&snap),
        Err(e) => tracing::error!(error = %e, "Failed to read session state"),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Tracing.
    let default_filter = args.log_level.clone().unwrap_or_else(|| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .init();

    tracing::info!("Starting Signvoice v{}", env!("CARGO_PKG_VERSION"));

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = SignvoiceConfig::load_or_default(&config_file);
    if let Some(base_url) = args.base_url {
        config.backend.base_url = base_url;
    }
    if let Some(lang) = args.lang {
        config.translation.target_lang = lang.clone();
        config.speech.lang = lang;
    }
    tracing::info!(
        backend = %config.backend.base_url,
        lang = %config.translation.target_lang,
        "Configuration resolved"
    );

    // One backend client shared across the four service contracts.
    let backend = Arc::new(HttpBackend::from_config(&config.backend));

    let orchestrator = Arc::new(SessionOrchestrator::new(
        &config,
        backend.clone(),
        backend.clone(),
        backend.clone(),
    ));

    // Background prediction poller.
    let poller = Arc::new(PredictionPoller::new(
        backend,
        Arc::clone(&orchestrator),
        Duration::from_millis(config.polling.interval_ms),
    ));
    let poller_task = {
        let poller = Arc::clone(&poller);
        tokio::spawn(async move { poller.run().await })
    };

    println!("Signvoice ready. Type 'help' for commands.");

    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let trimmed = line.trim();
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }
        handle_command(&orchestrator, trimmed).await;
    }

    poller.shutdown();
    let _ = poller_task.await;
    tracing::info!("Signvoice stopped");
    Ok(())
}
