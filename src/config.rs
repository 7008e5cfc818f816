use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILE_NAME: &str = ".voice-ledger.toml";

const DEFAULT_CONFIG: &str = r##"[display]
currency_symbol = "₹"
bar_glyph = "#"

[transcription]
enabled = true
model_name = "base.en"
model_path = "~/.voice-ledger/models/ggml-base.en.bin"
threads = 4
beam_size = 1

[telemetry]
enabled = false
log_path = "~/.voice-ledger/voice-ledger.log"
"##;

/// Application configuration loaded from `~/.voice-ledger.toml`
#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    /// How amounts and breakdown bars are rendered
    pub display: DisplayConfig,
    /// Voice input for expense descriptions
    pub transcription: TranscriptionConfig,
    /// Log output
    pub telemetry: TelemetryConfig,
}

/// Rendering options for summaries and listings
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Symbol printed in front of every amount
    pub currency_symbol: String,
    /// Glyph repeated once per 5% in breakdown bars
    pub bar_glyph: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            currency_symbol: "₹".to_owned(),
            bar_glyph: "#".to_owned(),
        }
    }
}

/// Speech-to-text settings
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TranscriptionConfig {
    /// Voice input on/off
    pub enabled: bool,
    /// Whisper model name, e.g. `base.en` or `small`
    pub model_name: String,
    /// Where the model file lives (downloaded on first use)
    pub model_path: String,
    /// CPU threads used for inference
    pub threads: usize,
    /// Beam search width; 1 selects greedy decoding
    pub beam_size: usize,
    /// Spoken language code; `None` auto-detects
    pub language: Option<String>,
}

impl Default for TranscriptionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model_name: "base.en".to_owned(),
            model_path: "~/.voice-ledger/models/ggml-base.en.bin".to_owned(),
            threads: 4,
            beam_size: 1,
            language: None,
        }
    }
}

/// Log destination
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TelemetryConfig {
    /// Write logs to `log_path` instead of stderr
    pub enabled: bool,
    /// Log file location
    pub log_path: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            log_path: "~/.voice-ledger/voice-ledger.log".to_owned(),
        }
    }
}

impl Config {
    /// Load config from ~/.voice-ledger.toml, creating it with defaults if missing
    ///
    /// # Errors
    /// Returns error if `HOME` is unset or the file cannot be written, read or parsed
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load config from an explicit path, creating it with defaults if missing
    ///
    /// # Errors
    /// Returns error if the file cannot be written, read or parsed
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            Self::create_default(config_path).context("failed to create default config")?;
        }

        let contents = fs::read_to_string(config_path).context("failed to read config file")?;

        Self::from_toml(&contents)
    }

    /// Parse config from TOML text; missing sections and keys take defaults
    ///
    /// # Errors
    /// Returns error if the text is not valid TOML for this schema
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config TOML")
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(CONFIG_FILE_NAME))
    }

    fn create_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("failed to create config directory")?;
        }
        fs::write(path, DEFAULT_CONFIG).context("failed to write default config")?;
        tracing::info!(path = %path.display(), "default config written");
        Ok(())
    }

    /// Expand ~ in paths to home directory
    ///
    /// # Errors
    /// Returns error if the path starts with `~/` and `HOME` is unset
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(stripped) = path.strip_prefix("~/") {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            Ok(PathBuf::from(home).join(stripped))
        } else {
            Ok(PathBuf::from(path))
        }
    }
}
