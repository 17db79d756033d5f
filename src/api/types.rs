use serde::Deserialize;
use thiserror::Error;

use crate::config::Config;

pub const DEFAULT_BASE_URL: &str = "https://api4.thetvdb.com/v4";

/// A series returned by a metadata search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesCandidate {
    /// Numeric series id, as a string
    pub id: String,
    pub name: String,
    pub year: Option<String>,
}

impl SeriesCandidate {
    pub fn display_name(&self) -> String {
        match &self.year {
            Some(year) => format!("{} ({})", self.name, year),
            None => self.name.clone(),
        }
    }
}

/// Normalize ids like "series-12345" to "12345"
pub fn numeric_series_id(raw: &str) -> Option<String> {
    let id = raw.trim().rsplit('-').next()?.trim();
    if !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()) {
        Some(id.to_string())
    } else {
        None
    }
}

/// API client configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub api_key: String,
    pub pin: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            pin: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            max_retries: 3,
        }
    }
}

impl ApiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Default::default()
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            api_key: config.api_key.clone().unwrap_or_default(),
            pin: config.pin.clone(),
            ..Default::default()
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }
}

/// Errors that can occur when talking to TheTVDB
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: check TVDB_API_KEY and TVDB_PIN")]
    Unauthorized,

    #[error("Rate limited by TheTVDB")]
    RateLimited,

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("API returned error: {0}")]
    ServerError(String),

    #[error("Max retries exceeded after {attempts} attempts")]
    MaxRetriesExceeded { attempts: u32 },

    #[error("Client not configured: TVDB_API_KEY must be set or api_key given in the config file")]
    NotConfigured,
}

impl ApiError {
    /// Errors that another attempt cannot fix
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            ApiError::NotFound(_)
                | ApiError::Unauthorized
                | ApiError::NotConfigured
                | ApiError::ParseError(_)
        )
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else {
            ApiError::NetworkError(err.to_string())
        }
    }
}

// Wire shapes of the v4 API. Every response is wrapped in {"status", "data"}.

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub links: Option<Links>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Links {
    pub next: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginData {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SearchRecord {
    pub id: Option<String>,
    pub tvdb_id: Option<String>,
    pub name: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct SeriesRecord {
    pub id: u64,
    pub name: Option<String>,
    pub year: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct EpisodePage {
    #[serde(default)]
    pub episodes: Vec<EpisodeRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EpisodeRecord {
    pub season_number: Option<u32>,
    pub number: Option<u32>,
    pub name: Option<String>,
}
