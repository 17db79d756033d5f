use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::api::{ApiError, MetadataSource, SeriesCandidate};
use crate::cache::CacheStore;
use crate::catalog::EpisodeCatalog;
use crate::engine::{Engine, Resolution};
use crate::progress::Progress;
use crate::prompt::{Prompter, SeriesChoice, MAX_SERIES_CHOICES};
use crate::scanner::MediaFile;

use super::types::{RenameOperation, RenameResult, SkipReason};

/// Errors that stop a rename session before any file is touched
#[derive(Error, Debug)]
pub enum RenameError {
    #[error("No series found for '{0}'")]
    SeriesNotFound(String),

    #[error("Series selection cancelled")]
    Cancelled,

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[derive(Debug, Clone, Default)]
pub struct RenameOptions {
    pub dry_run: bool,
}

/// Ask for the series name, search for it and let the prompter pick one.
pub fn select_series<S, P>(
    source: &S,
    prompter: &mut P,
    suggested: &str,
    progress: &mut Progress,
) -> Result<SeriesCandidate, RenameError>
where
    S: MetadataSource + ?Sized,
    P: Prompter + ?Sized,
{
    let answer = prompter.series_name(suggested);
    let query = match answer.trim() {
        "" => suggested.trim(),
        answer => answer,
    };

    info!("Searching for series '{}'", query);
    progress.search_start(query);

    let candidates = source.search_series(query)?;
    if candidates.is_empty() {
        return Err(RenameError::SeriesNotFound(query.to_string()));
    }

    for candidate in &candidates {
        debug!("  candidate: {} (ID {})", candidate.display_name(), candidate.id);
    }

    let offered = &candidates[..candidates.len().min(MAX_SERIES_CHOICES)];
    let series = match prompter.choose_series(offered) {
        Some(SeriesChoice::Candidate(index)) => {
            offered.get(index).cloned().ok_or(RenameError::Cancelled)?
        }
        Some(SeriesChoice::SeriesId(id)) => source.fetch_series(&id)?,
        None => return Err(RenameError::Cancelled),
    };

    info!("Series confirmed: {} (ID {})", series.display_name(), series.id);
    progress.series_confirmed(&series.display_name(), &series.id);

    Ok(series)
}

/// Episode catalog for `series`, from the cache when fresh.
///
/// A dry run never writes to the cache.
pub fn fetch_catalog_cached<S>(
    source: &S,
    series: &SeriesCandidate,
    cache: &mut CacheStore,
    options: &RenameOptions,
    progress: &mut Progress,
) -> Result<EpisodeCatalog, RenameError>
where
    S: MetadataSource + ?Sized,
{
    if let Some(catalog) = cache.get(&series.id) {
        debug!("Using cached catalog for series {}", series.id);
        progress.using_cache(catalog.len());
        return Ok(catalog);
    }

    progress.fetch_start(&series.name);
    let catalog = source.fetch_episode_catalog(series, None)?;
    progress.fetch_complete(catalog.len());

    if options.dry_run {
        debug!("Dry run: not caching catalog for series {}", series.id);
    } else {
        cache.insert(&series.id, &catalog);
    }

    Ok(catalog)
}

/// Resolve every file against the catalog and decide what to rename.
///
/// Files are handled in the order given. Nothing on disk changes here.
pub fn plan_renames<P>(
    files: &[MediaFile],
    engine: &Engine,
    catalog: &EpisodeCatalog,
    prompter: &mut P,
    options: &RenameOptions,
    progress: &mut Progress,
) -> RenameResult
where
    P: Prompter + ?Sized,
{
    let mut result = RenameResult::new(catalog.series_name(), options.dry_run);
    let mut claimed: HashSet<PathBuf> = HashSet::new();
    let total = files.len();

    info!("Planning renames for {} files", total);

    for (i, file) in files.iter().enumerate() {
        let current = i + 1;

        let op = match plan_file(file, engine, catalog) {
            Ok(op) => op,
            Err(reason) => {
                skip(&mut result, progress, current, total, file.path.clone(), reason);
                continue;
            }
        };

        if op.is_noop() {
            skip(&mut result, progress, current, total, op.source_path, SkipReason::AlreadyNamed);
            continue;
        }

        if claimed.contains(&op.destination_path) || op.destination_path.exists() {
            skip(
                &mut result,
                progress,
                current,
                total,
                op.source_path,
                SkipReason::DestinationExists,
            );
            continue;
        }

        if !options.dry_run && !prompter.confirm_rename(&op.source_name, &op.destination_name) {
            skip(&mut result, progress, current, total, op.source_path, SkipReason::Declined);
            continue;
        }

        progress.rename_progress(current, total, &op.source_name, &op.destination_name);
        claimed.insert(op.destination_path.clone());
        result.add_operation(op);
    }

    result
}

fn plan_file(
    file: &MediaFile,
    engine: &Engine,
    catalog: &EpisodeCatalog,
) -> Result<RenameOperation, SkipReason> {
    let meta = engine.extract(&file.name);
    debug!(
        file = %file.name,
        marker = meta.rule.map_or("none", |rule| rule.description()),
        ?meta,
        "Extracted metadata"
    );

    let mut resolved = match engine.resolve(&meta, catalog) {
        Resolution::Resolved(resolved) => resolved,
        Resolution::Ambiguous => return Err(SkipReason::NeedsManualInput),
        Resolution::NoMatch => return Err(SkipReason::NoMatch),
    };

    if resolved.extension.is_empty() {
        if let Some(ext) = file.path.extension() {
            resolved.extension = ext.to_string_lossy().to_string();
        }
    }

    let name = engine.format_name(&resolved).map_err(|e| {
        error!(file = %file.name, "{}", e);
        SkipReason::FormatViolation(e.to_string())
    })?;

    Ok(RenameOperation::new(
        file.path.clone(),
        name,
        resolved.season,
        resolved.episode_numbers,
    ))
}

fn skip(
    result: &mut RenameResult,
    progress: &mut Progress,
    current: usize,
    total: usize,
    path: PathBuf,
    reason: SkipReason,
) {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let description = reason.description();

    warn!("Skipping {}: {}", name, description);
    progress.skipped(current, total, &name, &description);
    result.skip(path, reason);
}

/// Perform the planned renames.
///
/// A file that fails to rename moves from `operations` to `skipped`; the
/// rest of the batch still runs.
pub fn execute_renames(result: &mut RenameResult, progress: &mut Progress) {
    let planned = std::mem::take(&mut result.operations);
    let total = planned.len();

    for (i, op) in planned.into_iter().enumerate() {
        if op.destination_path.exists() {
            skip(result, progress, i + 1, total, op.source_path, SkipReason::DestinationExists);
            continue;
        }

        match fs::rename(&op.source_path, &op.destination_path) {
            Ok(()) => {
                info!("Renamed: {} -> {}", op.source_name, op.destination_name);
                result.add_operation(op);
            }
            Err(e) => {
                skip(
                    result,
                    progress,
                    i + 1,
                    total,
                    op.source_path,
                    SkipReason::RenameFailed(e.to_string()),
                );
            }
        }
    }

    info!(
        "Renamed {} files, {} skipped",
        result.operations.len(),
        result.skipped.len()
    );
}
