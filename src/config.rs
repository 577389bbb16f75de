//! Configuration loading and management

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::knowledge::{DEFAULT_DUCKDUCKGO_URL, DEFAULT_WIKIPEDIA_URL};

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Path to the Unix domain socket for IPC
    pub socket_path: PathBuf,

    /// Directory for runtime data
    pub data_dir: PathBuf,

    /// Word that must open every voice utterance
    pub wake_word: String,

    /// How long the voice channel stays locked after an admitted utterance
    pub input_cooldown: Duration,

    /// Whether captions are shown at startup
    pub captions_enabled: bool,

    /// Whether commands wait for approval at startup
    pub confirm_commands: bool,

    /// Speaking pace of the console synthesizer
    pub words_per_minute: u32,

    /// Base URL of the page summary API
    pub wikipedia_url: String,

    /// Base URL of the instant answer API
    pub duckduckgo_url: String,
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let data_dir = match lookup("JARVIS_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => {
                let home = lookup("HOME").context("HOME is not set")?;
                PathBuf::from(home)
                    .join(".local")
                    .join("share")
                    .join("jarvis")
            }
        };

        let socket_path = lookup("JARVIS_SOCKET")
            .map(PathBuf::from)
            .unwrap_or_else(|| data_dir.join("daemon.sock"));

        let cooldown_ms: u64 = parse_or(&lookup, "JARVIS_INPUT_COOLDOWN_MS", 1200)?;

        Ok(Self {
            socket_path,
            data_dir,
            wake_word: lookup("JARVIS_WAKE_WORD").unwrap_or_else(|| "jarvis".to_string()),
            input_cooldown: Duration::from_millis(cooldown_ms),
            captions_enabled: parse_or(&lookup, "JARVIS_CAPTIONS", true)?,
            confirm_commands: parse_or(&lookup, "JARVIS_CONFIRM_COMMANDS", false)?,
            words_per_minute: parse_or(&lookup, "JARVIS_WORDS_PER_MINUTE", 170)?,
            wikipedia_url: lookup("JARVIS_WIKIPEDIA_URL")
                .unwrap_or_else(|| DEFAULT_WIKIPEDIA_URL.to_string()),
            duckduckgo_url: lookup("JARVIS_DUCKDUCKGO_URL")
                .unwrap_or_else(|| DEFAULT_DUCKDUCKGO_URL.to_string()),
        })
    }

    /// Ensure data directory exists
    pub fn ensure_dirs(&self) -> Result<()> {
        std::fs::create_dir_all(&self.data_dir)
            .with_context(|| format!("failed to create {}", self.data_dir.display()))?;
        Ok(())
    }
}

fn parse_or<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        None => Ok(default),
    }
}
