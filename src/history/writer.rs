use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{info, warn};

use crate::json_file::write_atomic;
use crate::rename::{RenameOperation, RenameResult};

use super::types::*;

/// Error types for history operations
#[derive(Debug, thiserror::Error)]
pub enum HistoryError {
    #[error("Failed to write history file: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to serialize history: {0}")]
    SerializeError(#[from] serde_json::Error),

    #[error("Failed to read history file: {0}")]
    ReadError(String),

    #[error("History file version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },
}

/// Write the history file for an executed rename batch
pub fn write_history(result: &RenameResult, target_dir: &Path) -> Result<PathBuf, HistoryError> {
    let history = create_history_from_result(result, target_dir);
    write_history_file(&history, target_dir)
}

fn create_history_from_result(result: &RenameResult, target_dir: &Path) -> HistoryFile {
    let changes: Vec<HistoryEntry> = result
        .operations
        .iter()
        .map(|op| entry_for(op, target_dir))
        .collect();

    HistoryFile {
        version: HISTORY_VERSION.to_string(),
        executed_at: Utc::now(),
        operation: OperationType::Rename,
        target_directory: target_dir.to_path_buf(),
        series: result.series.clone(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        changes,
    }
}

fn entry_for(op: &RenameOperation, target_dir: &Path) -> HistoryEntry {
    HistoryEntry {
        source: relative_to(&op.source_path, target_dir),
        destination: relative_to(&op.destination_path, target_dir),
        season: op.season,
        episodes: op.episodes.clone(),
    }
}

fn relative_to(path: &Path, base: &Path) -> PathBuf {
    path.strip_prefix(base)
        .map(Path::to_path_buf)
        .unwrap_or_else(|_| path.to_path_buf())
}

pub fn write_history_file(history: &HistoryFile, target_dir: &Path) -> Result<PathBuf, HistoryError> {
    let file_path = target_dir.join(history.generate_filename());

    if file_path.exists() {
        warn!("History file already exists: {:?}", file_path);
        let unique_path = target_dir.join(history.generate_unique_filename());
        return write_to_path(history, &unique_path);
    }

    write_to_path(history, &file_path)
}

fn write_to_path(history: &HistoryFile, path: &Path) -> Result<PathBuf, HistoryError> {
    write_atomic::<_, HistoryError>(path, history)?;
    info!("History written to: {:?}", path);
    Ok(path.to_path_buf())
}
