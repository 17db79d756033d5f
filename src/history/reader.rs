use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path};

use super::types::*;
use super::writer::HistoryError;

/// Read and parse a history file
pub fn read_history(path: &Path) -> Result<HistoryFile, HistoryError> {
    let file = File::open(path)
        .map_err(|e| HistoryError::ReadError(format!("Cannot open file: {}", e)))?;

    let reader = BufReader::new(file);
    let history: HistoryFile = serde_json::from_reader(reader)
        .map_err(|e| HistoryError::ReadError(format!("Invalid JSON: {}", e)))?;

    if history.version != HISTORY_VERSION {
        return Err(HistoryError::VersionMismatch {
            expected: HISTORY_VERSION.to_string(),
            found: history.version,
        });
    }

    Ok(history)
}

/// Check that a history file can be replayed in reverse
pub fn validate_for_revert(history: &HistoryFile) -> Result<(), HistoryError> {
    if !history.target_directory.is_dir() {
        return Err(HistoryError::ReadError(format!(
            "Target directory no longer exists: {:?}",
            history.target_directory
        )));
    }

    for entry in &history.changes {
        for path in [&entry.source, &entry.destination] {
            if !is_contained(path) {
                return Err(HistoryError::ReadError(format!(
                    "Entry escapes the target directory: {:?}",
                    path
                )));
            }
        }
    }

    Ok(())
}

/// Relative and free of `..`
fn is_contained(path: &Path) -> bool {
    path.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
