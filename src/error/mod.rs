mod codes;

pub use codes::ExitCode;

use crate::api::ApiError;
use crate::cache::CacheError;
use crate::config::ConfigError;
use crate::history::HistoryError;
use crate::rename::RenameError;
use crate::revert::RevertError;
use crate::scanner::ScannerError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Target directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("No series found for '{query}'")]
    SeriesNotFound { query: String },

    #[error("TheTVDB error: {message}")]
    Api { message: String },

    #[error("History file error: {message}")]
    History {
        path: Option<PathBuf>,
        message: String,
    },

    #[error("Rename failed: {from} -> {to}")]
    RenameError {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Cache error: {message}")]
    CacheError { message: String },

    #[error("{0}")]
    Other(String),
}

impl AppError {
    pub fn exit_code(&self) -> ExitCode {
        match self {
            AppError::DirectoryNotFound { .. } => ExitCode::DirectoryNotFound,
            AppError::NotADirectory { .. } => ExitCode::DirectoryNotFound,
            AppError::PermissionDenied { .. } => ExitCode::PermissionError,
            AppError::InvalidArgument(_) => ExitCode::InvalidArguments,
            AppError::Config { .. } => ExitCode::ConfigError,
            AppError::SeriesNotFound { .. } => ExitCode::SeriesNotFound,
            AppError::Api { .. } => ExitCode::ApiError,
            AppError::History { .. } => ExitCode::HistoryError,
            AppError::RenameError { .. } => ExitCode::RenameError,
            AppError::CacheError { .. } => ExitCode::CacheError,
            AppError::Other(_) => ExitCode::GeneralError,
        }
    }

    pub fn detailed_message(&self) -> String {
        match self {
            AppError::DirectoryNotFound { path } => {
                format!(
                    "The specified directory does not exist:\n  {}\n\n\
                     Please verify the path and try again.",
                    path.display()
                )
            }

            AppError::NotADirectory { path } => {
                format!(
                    "The specified path is not a directory:\n  {}\n\n\
                     Please provide a valid directory path.",
                    path.display()
                )
            }

            AppError::PermissionDenied { path } => {
                format!(
                    "Permission denied when accessing:\n  {}\n\n\
                     Please check file permissions or run with appropriate privileges.",
                    path.display()
                )
            }

            AppError::InvalidArgument(message) => {
                format!("{}\n\nRun with --help for usage.", message)
            }

            AppError::Config { message } => {
                format!(
                    "Could not load configuration:\n  {}\n\n\
                     Check the JSON syntax of the config file, or pass --config with a valid path.",
                    message
                )
            }

            AppError::SeriesNotFound { query } => {
                format!(
                    "TheTVDB returned no series for:\n  {}\n\n\
                     Try a different spelling with --series, or enter the series ID directly.",
                    query
                )
            }

            AppError::Api { message } => {
                format!(
                    "Failed to talk to TheTVDB:\n  {}\n\n\
                     This could be due to:\n\
                     - A missing or invalid TVDB_API_KEY\n\
                     - Network connectivity issues\n\
                     - TheTVDB rate limiting\n\n\
                     Set TVDB_API_KEY in the environment or a .env file and try again.",
                    message
                )
            }

            AppError::History { path, message } => {
                let path_info = path
                    .as_ref()
                    .map(|p| format!("File: {}\n", p.display()))
                    .unwrap_or_default();

                format!(
                    "History file error:\n  {}\n{}\n\
                     Ensure the history file exists and is valid JSON.",
                    message, path_info
                )
            }

            AppError::RenameError { from, to, source } => {
                format!(
                    "Failed to rename file:\n\
                     From: {}\n\
                     To:   {}\n\
                     Error: {}\n\n\
                     Check file permissions and ensure no files are open.",
                    from, to, source
                )
            }

            AppError::CacheError { message } => {
                format!(
                    "Cache error: {}\n\n\
                     The cache file may be corrupted. \
                     Delete the cache file to rebuild it.",
                    message
                )
            }

            AppError::Other(message) => message.clone(),
        }
    }
}

impl From<ScannerError> for AppError {
    fn from(err: ScannerError) -> Self {
        match err {
            ScannerError::PathNotFound(path) => AppError::DirectoryNotFound { path },
            ScannerError::NotADirectory(path) => AppError::NotADirectory { path },
            ScannerError::PermissionDenied(path) => AppError::PermissionDenied { path },
            ScannerError::IoError(e) => AppError::Other(format!("I/O error: {}", e)),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(err: ConfigError) -> Self {
        AppError::Config {
            message: err.to_string(),
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        let message = match err {
            ApiError::RateLimited => {
                "Rate limited by TheTVDB - please wait and try again".to_string()
            }
            ApiError::Timeout => "Request timed out".to_string(),
            ApiError::MaxRetriesExceeded { attempts } => {
                format!("Max retries ({}) exceeded", attempts)
            }
            other => other.to_string(),
        };
        AppError::Api { message }
    }
}

impl From<CacheError> for AppError {
    fn from(err: CacheError) -> Self {
        AppError::CacheError {
            message: err.to_string(),
        }
    }
}

impl From<HistoryError> for AppError {
    fn from(err: HistoryError) -> Self {
        AppError::History {
            path: None,
            message: err.to_string(),
        }
    }
}

impl From<RevertError> for AppError {
    fn from(err: RevertError) -> Self {
        match err {
            RevertError::History(e) => e.into(),
            RevertError::ValidationFailed(message) => AppError::History {
                path: None,
                message: format!("Cannot revert: {}", message),
            },
            RevertError::RenameError { from, to, source } => {
                AppError::RenameError { from, to, source }
            }
        }
    }
}

impl From<RenameError> for AppError {
    fn from(err: RenameError) -> Self {
        match err {
            RenameError::SeriesNotFound(query) => AppError::SeriesNotFound { query },
            RenameError::Cancelled => AppError::Other("Series selection cancelled".to_string()),
            RenameError::Api(e) => e.into(),
        }
    }
}
