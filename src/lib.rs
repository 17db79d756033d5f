pub mod api;
pub mod cache;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod engine;
pub mod error;
pub mod history;
pub mod json_file;
pub mod logging;
pub mod matcher;
pub mod output;
pub mod parser;
pub mod progress;
pub mod prompt;
pub mod rename;
pub mod revert;
pub mod scanner;

pub use api::{MetadataSource, SeriesCandidate};
pub use catalog::{CatalogEpisode, EpisodeCatalog};
pub use config::Config;
pub use engine::{Engine, Resolution};
pub use error::{AppError, ExitCode};
pub use matcher::{MatchCandidate, TokenMatcher};
pub use parser::{extract, ExtractedMetadata, NormalizedName, QualityTags};
pub use rename::{format_name, FormatError, ResolvedRename};
pub use scanner::{scan_media_files, MediaFile, ScannerError};
