use crate::rename::RenameResult;
use crate::revert::RevertResult;
use std::io::{self, Write};

fn episode_label(season: u32, episodes: &[u32]) -> String {
    let numbers: String = episodes.iter().map(|n| format!("E{:02}", n)).collect();
    format!("S{:02}{}", season, numbers)
}

fn display_skipped(result: &RenameResult, writer: &mut impl Write) -> io::Result<()> {
    if result.skipped.is_empty() {
        return Ok(());
    }

    writeln!(writer, "Skipped files:")?;
    writeln!(writer)?;
    for skipped in &result.skipped {
        writeln!(writer, "  - {} ({})", skipped.name, skipped.reason.description())?;
    }
    writeln!(writer)?;

    Ok(())
}

/// Display dry run results in a formatted output
pub fn display_dry_run(result: &RenameResult, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(writer, "========================================")?;
    writeln!(writer, "              DRY RUN")?;
    writeln!(writer, "========================================")?;
    writeln!(writer)?;
    writeln!(writer, "Series:     {}", result.series)?;
    writeln!(writer, "Operations: {}", result.operations.len())?;
    writeln!(writer)?;

    if result.operations.is_empty() {
        writeln!(writer, "No files to rename.")?;
        writeln!(writer)?;
    } else {
        writeln!(writer, "Planned changes:")?;
        writeln!(writer)?;

        for (i, op) in result.operations.iter().enumerate() {
            writeln!(writer, "  {}. [{}]", i + 1, episode_label(op.season, &op.episodes))?;
            writeln!(writer, "     From: {}", op.source_name)?;
            writeln!(writer, "     To:   {}", op.destination_name)?;
            writeln!(writer)?;
        }
    }

    display_skipped(result, writer)?;

    writeln!(writer, "----------------------------------------")?;
    writeln!(writer, "Summary:")?;
    writeln!(
        writer,
        "  {} files would be renamed",
        result.operations.len()
    )?;
    if !result.skipped.is_empty() {
        writeln!(writer, "  {} files would be skipped", result.skipped.len())?;
    }

    if !result.operations.is_empty() {
        writeln!(writer)?;
        writeln!(writer, "Run without --dry to apply these changes.")?;
    }

    Ok(())
}

/// Display execution results (non-dry-run)
pub fn display_execution_result(result: &RenameResult, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    writeln!(
        writer,
        "Successfully renamed {} files.",
        result.operations.len()
    )?;

    if !result.skipped.is_empty() {
        writeln!(writer)?;
        display_skipped(result, writer)?;
    }

    Ok(())
}

/// Display what a revert did or would do
pub fn display_revert_result(result: &RevertResult, writer: &mut impl Write) -> io::Result<()> {
    writeln!(writer)?;
    if result.dry_run {
        writeln!(writer, "Files that would be restored:")?;
    } else {
        writeln!(writer, "Restored {} files:", result.operations.len())?;
    }
    writeln!(writer)?;

    for op in &result.operations {
        writeln!(writer, "  {}", op.current_name.display())?;
        writeln!(writer, "  -> {}", op.revert_name.display())?;
    }

    Ok(())
}
