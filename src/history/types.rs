use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const HISTORY_VERSION: &str = "1.0";

pub const HISTORY_FILE_PREFIX: &str = "series-renamer-history-";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryFile {
    /// Schema version for compatibility
    pub version: String,

    /// When the operation was executed
    pub executed_at: DateTime<Utc>,

    /// Type of operation performed
    pub operation: OperationType,

    /// Target directory path
    pub target_directory: PathBuf,

    /// Series the files were matched against
    pub series: String,

    /// Tool version that created this history
    pub tool_version: String,

    /// All changes made
    pub changes: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Rename,
    Revert,
}

/// One renamed file. Paths are relative to the target directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub season: u32,
    pub episodes: Vec<u32>,
}

impl HistoryFile {
    /// Generate the filename for this history file
    pub fn generate_filename(&self) -> String {
        let timestamp = self.executed_at.format("%Y%m%d-%H%M%S");
        format!("{}{}.json", HISTORY_FILE_PREFIX, timestamp)
    }

    /// Fallback filename when one for the same second already exists
    pub fn generate_unique_filename(&self) -> String {
        format!(
            "{}{}-{:03}.json",
            HISTORY_FILE_PREFIX,
            self.executed_at.format("%Y%m%d-%H%M%S"),
            self.executed_at.timestamp_subsec_millis()
        )
    }
}

impl OperationType {
    pub fn description(&self) -> &'static str {
        match self {
            OperationType::Rename => "rename",
            OperationType::Revert => "revert",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history_at(timestamp: &str) -> HistoryFile {
        HistoryFile {
            version: HISTORY_VERSION.to_string(),
            executed_at: DateTime::parse_from_rfc3339(timestamp)
                .unwrap()
                .with_timezone(&Utc),
            operation: OperationType::Rename,
            target_directory: PathBuf::from("/test"),
            series: "Rosie's Rules".to_string(),
            tool_version: "0.1.0".to_string(),
            changes: vec![],
        }
    }

    #[test]
    fn test_generate_filename() {
        let history = history_at("2026-01-15T10:30:45Z");

        assert_eq!(
            history.generate_filename(),
            "series-renamer-history-20260115-103045.json"
        );
    }

    #[test]
    fn test_generate_unique_filename() {
        let history = history_at("2026-01-15T10:30:45.042Z");

        assert_eq!(
            history.generate_unique_filename(),
            "series-renamer-history-20260115-103045-042.json"
        );
    }

    #[test]
    fn test_operation_type_serialization() {
        assert_eq!(
            serde_json::to_string(&OperationType::Rename).unwrap(),
            "\"rename\""
        );
        assert_eq!(
            serde_json::to_string(&OperationType::Revert).unwrap(),
            "\"revert\""
        );
    }

    #[test]
    fn test_entry_serialization() {
        let entry = HistoryEntry {
            source: PathBuf::from("Season 1/show.s01e02.mkv"),
            destination: PathBuf::from("Season 1/Show - S01E02 - Cat Mail.mkv"),
            season: 1,
            episodes: vec![2],
        };

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"source\":\"Season 1/show.s01e02.mkv\""));
        assert!(json.contains("\"episodes\":[2]"));
    }
}
