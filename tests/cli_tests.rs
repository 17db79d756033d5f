use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::{tempdir, TempDir};

use series_renamer::history::{write_history_file, HistoryEntry, HistoryFile, OperationType, HISTORY_VERSION};

/// A config file with built-in defaults and no credentials
fn empty_config() -> (TempDir, PathBuf) {
    let dir = tempdir().unwrap();
    let path = dir.path().join("config.json");
    fs::write(&path, "{}").unwrap();
    (dir, path)
}

fn renamer(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("series-renamer").unwrap();
    cmd.current_dir(cwd)
        .env_remove("TVDB_API_KEY")
        .env_remove("TVDB_PIN")
        .env("NO_COLOR", "1");
    cmd
}

#[test]
fn test_help_flag() {
    Command::cargo_bin("series-renamer")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Rename TV episode files"));
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("series-renamer")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_missing_target_dir() {
    Command::cargo_bin("series-renamer")
        .unwrap()
        .assert()
        .failure()
        .stderr(predicate::str::contains("required"));
}

#[test]
fn test_nonexistent_directory() {
    let (cfg_dir, config) = empty_config();

    renamer(cfg_dir.path())
        .args(["--config", config.to_str().unwrap(), "/nonexistent/path/12345"])
        .assert()
        .failure()
        .code(3) // ExitCode::DirectoryNotFound
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn test_file_instead_of_directory() {
    let (cfg_dir, config) = empty_config();
    let file = cfg_dir.path().join("episode.mkv");
    fs::write(&file, "").unwrap();

    renamer(cfg_dir.path())
        .args(["--config", config.to_str().unwrap(), file.to_str().unwrap()])
        .assert()
        .failure()
        .code(3); // ExitCode::DirectoryNotFound (NotADirectory maps to same code)
}

#[test]
fn test_empty_directory() {
    let (cfg_dir, config) = empty_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();

    renamer(cfg_dir.path())
        .args(["--config", config.to_str().unwrap(), dir.path().to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("No video files"));
}

#[test]
fn test_missing_explicit_config() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.json");

    renamer(dir.path())
        .args(["--config", missing.to_str().unwrap(), dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(4) // ExitCode::ConfigError
        .stderr(predicate::str::contains("missing.json"));
}

#[test]
fn test_malformed_config() {
    let dir = tempdir().unwrap();
    let config = dir.path().join("config.json");
    fs::write(&config, "{ not json").unwrap();

    renamer(dir.path())
        .args(["--config", config.to_str().unwrap(), dir.path().to_str().unwrap()])
        .assert()
        .failure()
        .code(4);
}

#[test]
fn test_threshold_out_of_range() {
    let (cfg_dir, config) = empty_config();
    let dir = tempdir().unwrap();

    renamer(cfg_dir.path())
        .args([
            "--config",
            config.to_str().unwrap(),
            "--threshold",
            "150",
            dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(2); // ExitCode::InvalidArguments
}

#[test]
fn test_missing_api_key() {
    let (cfg_dir, config) = empty_config();
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("show.s01e01.mkv"), "").unwrap();

    renamer(cfg_dir.path())
        .args([
            "--dry",
            "-y",
            "--config",
            config.to_str().unwrap(),
            dir.path().to_str().unwrap(),
        ])
        .assert()
        .failure()
        .code(6) // ExitCode::ApiError
        .stderr(predicate::str::contains("TVDB_API_KEY"));

    assert!(dir.path().join("show.s01e01.mkv").exists());
}

#[test]
fn test_revert_missing_history() {
    let dir = tempdir().unwrap();

    renamer(dir.path())
        .args(["--revert", "/nonexistent/series-renamer-history.json"])
        .assert()
        .failure()
        .code(8); // ExitCode::HistoryError
}

fn write_rename_history(dir: &Path) -> PathBuf {
    let history = HistoryFile {
        version: HISTORY_VERSION.to_string(),
        executed_at: chrono::Utc::now(),
        operation: OperationType::Rename,
        target_directory: dir.to_path_buf(),
        series: "Rosie's Rules".to_string(),
        tool_version: env!("CARGO_PKG_VERSION").to_string(),
        changes: vec![HistoryEntry {
            source: PathBuf::from("rosie.s01e02.mkv"),
            destination: PathBuf::from("Rosie's Rules - S01E02 - Cat Mail.mkv"),
            season: 1,
            episodes: vec![2],
        }],
    };
    write_history_file(&history, dir).unwrap()
}

#[test]
fn test_revert_dry_run() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("Rosie's Rules - S01E02 - Cat Mail.mkv"), "").unwrap();
    let history = write_rename_history(dir.path());

    renamer(dir.path())
        .args(["--dry", "--revert", history.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("rosie.s01e02.mkv"));

    assert!(dir.path().join("Rosie's Rules - S01E02 - Cat Mail.mkv").exists());
    assert!(!dir.path().join("rosie.s01e02.mkv").exists());
}

#[test]
fn test_revert_restores_files() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("Rosie's Rules - S01E02 - Cat Mail.mkv"), "").unwrap();
    let history = write_rename_history(dir.path());

    renamer(dir.path())
        .args(["--revert", history.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Restored 1 files"));

    assert!(dir.path().join("rosie.s01e02.mkv").exists());
    assert!(!dir.path().join("Rosie's Rules - S01E02 - Cat Mail.mkv").exists());
}
