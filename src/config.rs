use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::matcher::DEFAULT_MATCH_THRESHOLD;

/// Environment variable names for TheTVDB credentials
pub const ENV_TVDB_API_KEY: &str = "TVDB_API_KEY";
pub const ENV_TVDB_PIN: &str = "TVDB_PIN";

const CONFIG_DIR_NAME: &str = "series-renamer";
const CONFIG_FILE_NAME: &str = "config.json";

const DEFAULT_EXTENSIONS: &[&str] = &["mkv", "mp4", "avi", "m4v", "mov", "wmv", "ts", "webm"];

const DEFAULT_QUALITY_TAGS: &[&str] = &[
    "480p", "576p", "720p", "1080p", "1080i", "2160p", "4K", "UHD", "HDR", "HDTV", "SDTV",
    "WEB-DL", "WEBRip", "BluRay", "BDRip", "BRRip", "DVDRip", "x264", "x265", "H264", "H.264",
    "H265", "HEVC", "AVC", "AAC", "AC3", "DDP5.1", "DTS", "10bit", "REPACK",
];

const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "the", "of", "and", "at", "in", "on", "to", "le", "la", "les", "l", "de", "du",
    "des", "d", "sur", "et", "un", "une",
];

/// Errors that can occur while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// User configuration, read from JSON and overridden by the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub pin: Option<String>,
    pub valid_extensions: Vec<String>,
    pub quality_tags: Vec<String>,
    pub stopwords: Vec<String>,
    /// Either a 0-1 ratio or a 0-100 percentage
    pub match_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            pin: None,
            valid_extensions: to_strings(DEFAULT_EXTENSIONS),
            quality_tags: to_strings(DEFAULT_QUALITY_TAGS),
            stopwords: to_strings(DEFAULT_STOPWORDS),
            match_threshold: DEFAULT_MATCH_THRESHOLD,
        }
    }
}

impl Config {
    /// Load from an explicit path, or from the default location if present.
    ///
    /// A missing explicit file is an error; a missing default file means
    /// built-in defaults. Environment credentials are applied last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                Self::from_file(path)?
            }
            None => match Self::default_path() {
                Some(path) if path.exists() => Self::from_file(&path)?,
                _ => {
                    debug!("No config file found, using defaults");
                    Self::default()
                }
            },
        };

        config.apply_env();
        config.validate()?;

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        info!("Loading config from {:?}", path);

        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;

        serde_json::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// `<config dir>/series-renamer/config.json`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Override credentials from `TVDB_API_KEY` / `TVDB_PIN`
    pub fn apply_env(&mut self) {
        if let Some(key) = non_empty_var(ENV_TVDB_API_KEY) {
            self.api_key = Some(key);
        }
        if let Some(pin) = non_empty_var(ENV_TVDB_PIN) {
            self.pin = Some(pin);
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=100.0).contains(&self.match_threshold) {
            return Err(ConfigError::Invalid(format!(
                "match_threshold must be between 0 and 100, got {}",
                self.match_threshold
            )));
        }

        if self.extensions().is_empty() {
            return Err(ConfigError::Invalid(
                "valid_extensions must not be empty".to_string(),
            ));
        }

        Ok(())
    }

    /// Threshold as a ratio in [0, 1]
    pub fn threshold(&self) -> f64 {
        if self.match_threshold > 1.0 {
            self.match_threshold / 100.0
        } else {
            self.match_threshold
        }
    }

    /// Lowercased extensions without a leading dot
    pub fn extensions(&self) -> Vec<String> {
        self.valid_extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_lowercase())
            .filter(|e| !e.is_empty())
            .collect()
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
