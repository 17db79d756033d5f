//! JSON state files (cache, history) written through a temporary sibling.

use serde::Serialize;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

/// `<name>.json` becomes `<name>.json.tmp`
pub fn temp_path_for(path: &Path) -> PathBuf {
    path.with_extension("json.tmp")
}

/// Pretty-print `value` to `path`.
///
/// Readers see either the previous file or the complete new one, never a
/// partial write.
pub fn write_atomic<T, E>(path: &Path, value: &T) -> Result<(), E>
where
    T: Serialize + ?Sized,
    E: From<io::Error> + From<serde_json::Error>,
{
    let temp = temp_path_for(path);

    {
        let mut writer = BufWriter::new(File::create(&temp)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }

    fs::rename(&temp, path)?;
    Ok(())
}
