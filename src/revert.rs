use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, error, info};

use crate::history::{
    read_history, validate_for_revert, write_history_file, HistoryEntry, HistoryError,
    HistoryFile, OperationType, HISTORY_VERSION,
};
use crate::progress::Progress;

#[derive(Debug, thiserror::Error)]
pub enum RevertError {
    #[error("History error: {0}")]
    History(#[from] HistoryError),

    #[error("Validation failed: {0}")]
    ValidationFailed(String),

    #[error("Failed to rename '{from}' to '{to}': {source}")]
    RenameError {
        from: String,
        to: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default)]
pub struct RevertOptions {
    pub dry_run: bool,
}

/// One renamed file and the name it gets back
#[derive(Debug, Clone)]
pub struct RevertOperation {
    pub current_path: PathBuf,
    pub current_name: PathBuf,
    pub revert_path: PathBuf,
    pub revert_name: PathBuf,
    pub season: u32,
    pub episodes: Vec<u32>,
}

impl RevertOperation {
    /// Pair a recorded change with the files on disk.
    ///
    /// The renamed file must still be there and its original name must be free.
    fn check(target_dir: &Path, change: &HistoryEntry) -> Result<Self, String> {
        let current_path = target_dir.join(&change.destination);
        let revert_path = target_dir.join(&change.source);

        if !current_path.exists() {
            return Err(format!(
                "File not found: '{}' (expected from previous rename)",
                change.destination.display()
            ));
        }
        if revert_path.exists() {
            return Err(format!(
                "Cannot revert: '{}' already exists",
                change.source.display()
            ));
        }

        Ok(Self {
            current_path,
            current_name: change.destination.clone(),
            revert_path,
            revert_name: change.source.clone(),
            season: change.season,
            episodes: change.episodes.clone(),
        })
    }
}

impl From<&RevertOperation> for HistoryEntry {
    fn from(op: &RevertOperation) -> Self {
        HistoryEntry {
            source: op.current_name.clone(),
            destination: op.revert_name.clone(),
            season: op.season,
            episodes: op.episodes.clone(),
        }
    }
}

#[derive(Debug)]
pub struct RevertResult {
    pub operations: Vec<RevertOperation>,
    pub series: String,
    pub original_history: PathBuf,
    pub dry_run: bool,
    pub revert_history_path: Option<PathBuf>,
}

/// Undo the renames recorded in a history file.
///
/// Nothing is renamed unless every recorded change can be undone. A revert
/// writes its own history, so it can be reverted in turn.
pub fn revert_from_history(
    history_path: &Path,
    options: &RevertOptions,
    progress: &mut Progress,
) -> Result<RevertResult, RevertError> {
    let history = read_history(history_path)?;
    validate_for_revert(&history)?;

    info!(
        "Reverting {} changes ({}) from {:?}",
        history.changes.len(),
        history.operation.description(),
        history_path
    );
    progress.revert_start(history.changes.len(), &history.executed_at.to_string());

    let operations = check_all(&history, progress)?;

    let revert_history_path = if options.dry_run {
        None
    } else {
        restore_files(&operations, progress)?;

        let record = HistoryFile {
            version: HISTORY_VERSION.to_string(),
            executed_at: Utc::now(),
            operation: OperationType::Revert,
            target_directory: history.target_directory.clone(),
            series: history.series.clone(),
            tool_version: env!("CARGO_PKG_VERSION").to_string(),
            changes: operations.iter().map(HistoryEntry::from).collect(),
        };
        let path = write_history_file(&record, &history.target_directory)?;
        progress.history_written(&path);
        Some(path)
    };

    progress.revert_complete(operations.len(), options.dry_run);

    Ok(RevertResult {
        operations,
        series: history.series,
        original_history: history_path.to_path_buf(),
        dry_run: options.dry_run,
        revert_history_path,
    })
}

fn check_all(
    history: &HistoryFile,
    progress: &mut Progress,
) -> Result<Vec<RevertOperation>, RevertError> {
    let (ok, failed): (Vec<_>, Vec<_>) = history
        .changes
        .iter()
        .map(|change| RevertOperation::check(&history.target_directory, change))
        .partition(Result::is_ok);

    let problems: Vec<String> = failed.into_iter().filter_map(Result::err).collect();
    if !problems.is_empty() {
        for problem in &problems {
            error!("{}", problem);
            progress.warn(problem);
        }
        return Err(RevertError::ValidationFailed(problems.join("; ")));
    }

    Ok(ok.into_iter().filter_map(Result::ok).collect())
}

fn restore_files(operations: &[RevertOperation], progress: &mut Progress) -> Result<(), RevertError> {
    let total = operations.len();

    for (i, op) in operations.iter().enumerate() {
        let from = op.current_name.display().to_string();
        let to = op.revert_name.display().to_string();
        progress.rename_progress(i + 1, total, &from, &to);
        debug!("Restoring {:?} -> {:?}", op.current_path, op.revert_path);

        if let Err(source) = fs::rename(&op.current_path, &op.revert_path) {
            return Err(RevertError::RenameError { from, to, source });
        }
    }

    Ok(())
}
