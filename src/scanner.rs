use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, trace, warn};
use walkdir::{DirEntry, WalkDir};

#[derive(Error, Debug)]
pub enum ScannerError {
    #[error("Path does not exist: {0}")]
    PathNotFound(PathBuf),

    #[error("Path is not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Permission denied: {0}")]
    PermissionDenied(PathBuf),

    #[error("Failed to read directory: {0}")]
    IoError(#[from] std::io::Error),
}

/// A video file found under the target directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub path: PathBuf,
}

impl MediaFile {
    pub fn new(name: String, path: PathBuf) -> Self {
        Self { name, path }
    }
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .is_some_and(|e| extensions.iter().any(|x| *x == e))
}

/// Recursively collect files whose extension is in `extensions`
/// (lowercase, without dot), sorted by path.
pub fn scan_media_files(target: &Path, extensions: &[String]) -> Result<Vec<MediaFile>, ScannerError> {
    debug!(path = ?target, "Scanning directory");

    if !target.exists() {
        return Err(ScannerError::PathNotFound(target.to_path_buf()));
    }

    if !target.is_dir() {
        return Err(ScannerError::NotADirectory(target.to_path_buf()));
    }

    let mut files = Vec::new();

    for entry in WalkDir::new(target).into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => {
                return Err(match e.into_io_error() {
                    Some(io) if io.kind() == std::io::ErrorKind::PermissionDenied => {
                        ScannerError::PermissionDenied(target.to_path_buf())
                    }
                    Some(io) => ScannerError::IoError(io),
                    None => ScannerError::PermissionDenied(target.to_path_buf()),
                });
            }
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        trace!(entry = ?entry.path(), "Examining entry");

        if !entry.file_type().is_file() {
            continue;
        }

        if !has_extension(entry.path(), extensions) {
            trace!(path = ?entry.path(), "Skipping non-video file");
            continue;
        }

        let name = entry.file_name().to_string_lossy().to_string();
        debug!(name = %name, "Found media file");
        files.push(MediaFile::new(name, entry.into_path()));
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));

    debug!(count = files.len(), "Scan complete");

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn exts() -> Vec<String> {
        vec!["mkv".to_string(), "mp4".to_string()]
    }

    #[test]
    fn test_scan_empty_directory() {
        let dir = tempdir().unwrap();
        let result = scan_media_files(dir.path(), &exts()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_filters_by_extension() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.mkv"), "").unwrap();
        fs::write(dir.path().join("b.MP4"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();
        fs::write(dir.path().join("noext"), "").unwrap();

        let result = scan_media_files(dir.path(), &exts()).unwrap();
        let names: Vec<_> = result.iter().map(|f| f.name.as_str()).collect();

        assert_eq!(names, vec!["a.mkv", "b.MP4"]);
    }

    #[test]
    fn test_recurses_into_subdirectories() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Season 1")).unwrap();
        fs::create_dir_all(dir.path().join("Season 2")).unwrap();
        fs::write(dir.path().join("Season 2").join("x.mkv"), "").unwrap();
        fs::write(dir.path().join("Season 1").join("y.mkv"), "").unwrap();

        let result = scan_media_files(dir.path(), &exts()).unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].path, dir.path().join("Season 1").join("y.mkv"));
        assert_eq!(result[1].path, dir.path().join("Season 2").join("x.mkv"));
    }

    #[test]
    fn test_ignores_hidden_entries() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join(".hidden")).unwrap();
        fs::write(dir.path().join(".hidden").join("a.mkv"), "").unwrap();
        fs::write(dir.path().join(".b.mkv"), "").unwrap();
        fs::write(dir.path().join("c.mkv"), "").unwrap();

        let result = scan_media_files(dir.path(), &exts()).unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].name, "c.mkv");
    }

    #[test]
    fn test_path_not_found() {
        let result = scan_media_files(Path::new("/nonexistent/path"), &exts());
        assert!(matches!(result, Err(ScannerError::PathNotFound(_))));
    }

    #[test]
    fn test_not_a_directory() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("file.mkv");
        fs::write(&file_path, "content").unwrap();

        let result = scan_media_files(&file_path, &exts());
        assert!(matches!(result, Err(ScannerError::NotADirectory(_))));
    }
}
