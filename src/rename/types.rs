use std::path::PathBuf;

/// A fully resolved match, ready for formatting
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRename {
    pub series: String,
    pub season: u32,
    /// Strictly increasing, at least one
    pub episode_numbers: Vec<u32>,
    /// One title per episode number, same order
    pub titles: Vec<String>,
    /// Without the dot, may be empty
    pub extension: String,
}

/// A single file rename
#[derive(Debug, Clone)]
pub struct RenameOperation {
    /// Full path to the source file
    pub source_path: PathBuf,
    /// Original file name
    pub source_name: String,
    /// Full path to the destination
    pub destination_path: PathBuf,
    /// New file name
    pub destination_name: String,
    pub season: u32,
    pub episodes: Vec<u32>,
}

impl RenameOperation {
    pub fn new(
        source_path: PathBuf,
        destination_name: String,
        season: u32,
        episodes: Vec<u32>,
    ) -> Self {
        let source_name = source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let destination_path = source_path
            .parent()
            .map(|p| p.join(&destination_name))
            .unwrap_or_else(|| PathBuf::from(&destination_name));

        Self {
            source_path,
            source_name,
            destination_path,
            destination_name,
            season,
            episodes,
        }
    }

    /// Source already carries the target name
    pub fn is_noop(&self) -> bool {
        self.source_name == self.destination_name
    }
}

/// Why a file was left untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    NeedsManualInput,
    NoMatch,
    FormatViolation(String),
    AlreadyNamed,
    Declined,
    DestinationExists,
    RenameFailed(String),
}

impl SkipReason {
    pub fn description(&self) -> String {
        match self {
            SkipReason::NeedsManualInput => "needs manual input".to_string(),
            SkipReason::NoMatch => "no match above threshold".to_string(),
            SkipReason::FormatViolation(msg) => format!("could not build name: {}", msg),
            SkipReason::AlreadyNamed => "already named correctly".to_string(),
            SkipReason::Declined => "declined".to_string(),
            SkipReason::DestinationExists => "destination already exists".to_string(),
            SkipReason::RenameFailed(msg) => format!("rename failed: {}", msg),
        }
    }
}

/// A file the batch did not rename
#[derive(Debug, Clone)]
pub struct SkippedFile {
    pub name: String,
    pub path: PathBuf,
    pub reason: SkipReason,
}

/// Result of a rename batch
#[derive(Debug, Clone)]
pub struct RenameResult {
    pub series: String,
    /// Operations performed or planned
    pub operations: Vec<RenameOperation>,
    pub skipped: Vec<SkippedFile>,
    pub dry_run: bool,
}

impl RenameResult {
    pub fn new(series: impl Into<String>, dry_run: bool) -> Self {
        Self {
            series: series.into(),
            operations: Vec::new(),
            skipped: Vec::new(),
            dry_run,
        }
    }

    pub fn add_operation(&mut self, op: RenameOperation) {
        self.operations.push(op);
    }

    pub fn skip(&mut self, path: PathBuf, reason: SkipReason) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        self.skipped.push(SkippedFile { name, path, reason });
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }
}
