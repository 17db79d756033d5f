//! Progress output for user-facing status updates.
//!
//! In verbose mode, output is suppressed since tracing handles everything.
//! In normal mode, output is shown with colors to give feedback during API calls etc.

use colored::Colorize;
use std::io::{self, IsTerminal, Write};
use std::path::Path;

/// Progress reporter for user-facing output
pub struct Progress {
    writer: Box<dyn Write>,
    /// When true, all output is suppressed (verbose mode uses tracing instead)
    silent: bool,
    /// When true, output is colorized
    colors_enabled: bool,
}

/// Check if we should use colors in output
pub fn should_use_colors() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }
    if std::env::var("FORCE_COLOR").is_ok() {
        return true;
    }
    io::stderr().is_terminal()
}

impl Default for Progress {
    fn default() -> Self {
        Self::new()
    }
}

impl Progress {
    /// Create a new progress reporter writing to stderr
    pub fn new() -> Self {
        Self::new_with_ui(false, should_use_colors())
    }

    /// When verbose=true, output is suppressed (tracing handles it)
    pub fn new_with_ui(verbose: bool, colors_enabled: bool) -> Self {
        Self {
            writer: Box::new(io::stderr()),
            silent: verbose,
            colors_enabled,
        }
    }

    /// Create a progress reporter with a custom writer (for testing)
    #[cfg(test)]
    pub fn with_writer(writer: Box<dyn Write>) -> Self {
        Self {
            writer,
            silent: false,
            colors_enabled: false,
        }
    }

    /// A reporter that writes nothing
    pub fn silent() -> Self {
        Self {
            writer: Box::new(io::sink()),
            silent: true,
            colors_enabled: false,
        }
    }

    fn dimmed_line(&mut self, text: &str) {
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{}", text.dimmed());
        } else {
            let _ = writeln!(self.writer, "{}", text);
        }
    }

    pub fn scan_start(&mut self, target: &Path) {
        if self.silent {
            return;
        }
        self.dimmed_line(&format!("Scanning {} ...", target.display()));
    }

    pub fn scan_complete(&mut self, count: usize) {
        if self.silent {
            return;
        }
        let _ = writeln!(self.writer, "Found {} video files", count);
    }

    pub fn search_start(&mut self, query: &str) {
        if self.silent {
            return;
        }
        self.dimmed_line(&format!("Searching TheTVDB for '{}' ...", query));
    }

    pub fn series_confirmed(&mut self, display_name: &str, id: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{} {} (ID {})",
                "Series confirmed:".green(),
                display_name.bold(),
                id
            );
        } else {
            let _ = writeln!(self.writer, "Series confirmed: {} (ID {})", display_name, id);
        }
    }

    /// Report fetching the episode list from the API
    pub fn fetch_start(&mut self, series: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = write!(
                self.writer,
                "{}",
                format!("Fetching episodes for {}...", series).dimmed()
            );
        } else {
            let _ = write!(self.writer, "Fetching episodes for {}...", series);
        }
        let _ = self.writer.flush();
    }

    /// Report fetch complete (same line)
    pub fn fetch_complete(&mut self, count: usize) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, " {} ({} episodes)", "done".green(), count);
        } else {
            let _ = writeln!(self.writer, " done ({} episodes)", count);
        }
    }

    pub fn using_cache(&mut self, count: usize) {
        if self.silent {
            return;
        }
        self.dimmed_line(&format!("Using cached episode list ({} episodes)", count));
    }

    /// Report a planned or executed rename
    pub fn rename_progress(&mut self, current: usize, total: usize, from: &str, to: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let counter = format!("[{}/{}]", current, total);
            let _ = writeln!(
                self.writer,
                "{} {} {} {}",
                counter.cyan(),
                from.dimmed(),
                "→".cyan(),
                to
            );
        } else {
            let _ = writeln!(self.writer, "[{}/{}] {} -> {}", current, total, from, to);
        }
    }

    /// Report a file left untouched
    pub fn skipped(&mut self, current: usize, total: usize, name: &str, reason: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let counter = format!("[{}/{}]", current, total);
            let _ = writeln!(
                self.writer,
                "{} {} {}",
                counter.cyan(),
                name.dimmed(),
                format!("skipped: {}", reason).yellow()
            );
        } else {
            let _ = writeln!(
                self.writer,
                "[{}/{}] {} skipped: {}",
                current, total, name, reason
            );
        }
    }

    /// Report an error during operation (non-fatal)
    pub fn warn(&mut self, message: &str) {
        if self.silent {
            return;
        }
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{} {}", "!".yellow().bold(), message.yellow());
        } else {
            let _ = writeln!(self.writer, "Warning: {}", message);
        }
    }

    pub fn rename_complete(&mut self, renamed: usize, skipped: usize, dry_run: bool) {
        if self.silent {
            return;
        }
        let _ = writeln!(self.writer);
        if dry_run {
            self.dimmed_line(&format!(
                "Dry run complete. {} files would be renamed, {} skipped.",
                renamed, skipped
            ));
        } else if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{} {}",
                "✓".green().bold(),
                format!("{} files renamed, {} skipped", renamed, skipped).green()
            );
        } else {
            let _ = writeln!(
                self.writer,
                "Rename complete. {} files renamed, {} skipped.",
                renamed, skipped
            );
        }
    }

    /// Report history file written
    pub fn history_written(&mut self, path: &Path) {
        if self.silent {
            return;
        }
        self.dimmed_line(&format!("History saved to: {}", path.display()));
    }

    /// Report starting a revert operation
    pub fn revert_start(&mut self, total: usize, from_timestamp: &str) {
        if self.silent {
            return;
        }
        let _ = writeln!(self.writer);
        let line = format!("Reverting {} files from history ({})", total, from_timestamp);
        if self.colors_enabled {
            let _ = writeln!(self.writer, "{}", line.bold());
        } else {
            let _ = writeln!(self.writer, "{}", line);
        }
    }

    /// Report revert complete
    pub fn revert_complete(&mut self, count: usize, dry_run: bool) {
        if self.silent {
            return;
        }
        let _ = writeln!(self.writer);
        if dry_run {
            self.dimmed_line(&format!(
                "Dry run complete. {} files would be reverted.",
                count
            ));
        } else if self.colors_enabled {
            let _ = writeln!(
                self.writer,
                "{} {}",
                "✓".green().bold(),
                format!("{} files restored", count).green()
            );
        } else {
            let _ = writeln!(self.writer, "Revert complete. {} files restored.", count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    fn create_test_progress() -> (Progress, Arc<Mutex<Vec<u8>>>) {
        let buffer = Arc::new(Mutex::new(Vec::new()));
        let writer = TestWriter(buffer.clone());
        let progress = Progress::with_writer(Box::new(writer));
        (progress, buffer)
    }

    struct TestWriter(Arc<Mutex<Vec<u8>>>);

    impl Write for TestWriter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn output(buffer: &Arc<Mutex<Vec<u8>>>) -> String {
        String::from_utf8(buffer.lock().unwrap().clone()).unwrap()
    }

    #[test]
    fn test_rename_progress() {
        let (mut progress, buffer) = create_test_progress();

        progress.rename_progress(1, 3, "a.mkv", "Show - S01E01 - A.mkv");
        progress.rename_progress(2, 3, "b.mkv", "Show - S01E02 - B.mkv");

        let output = output(&buffer);
        assert!(output.contains("[1/3] a.mkv -> Show - S01E01 - A.mkv"));
        assert!(output.contains("[2/3]"));
    }

    #[test]
    fn test_fetch_output() {
        let (mut progress, buffer) = create_test_progress();

        progress.fetch_start("Rosie's Rules");
        progress.fetch_complete(42);

        let output = output(&buffer);
        assert!(output.contains("Fetching episodes for Rosie's Rules... done (42 episodes)"));
    }

    #[test]
    fn test_skipped_output() {
        let (mut progress, buffer) = create_test_progress();

        progress.skipped(2, 5, "x.mkv", "needs manual input");

        assert!(output(&buffer).contains("[2/5] x.mkv skipped: needs manual input"));
    }

    #[test]
    fn test_complete_output() {
        let (mut progress, buffer) = create_test_progress();

        progress.rename_complete(3, 1, true);
        progress.rename_complete(3, 1, false);

        let output = output(&buffer);
        assert!(output.contains("3 files would be renamed, 1 skipped"));
        assert!(output.contains("Rename complete. 3 files renamed, 1 skipped."));
    }

    #[test]
    fn test_silent_writes_nothing() {
        let mut progress = Progress::silent();
        progress.rename_progress(1, 1, "a", "b");
        progress.warn("nothing");
    }
}
