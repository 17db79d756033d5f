use std::fs;
use std::io;
use std::path::Path;

use clap::Parser;
use tracing::{debug, error, info, warn};

use series_renamer::api::{ApiConfig, TvdbClient};
use series_renamer::cache::{CacheConfig, CacheStore};
use series_renamer::cli::Args;
use series_renamer::config::Config;
use series_renamer::engine::Engine;
use series_renamer::error::AppError;
use series_renamer::history::write_history;
use series_renamer::logging;
use series_renamer::output::{display_dry_run, display_execution_result, display_revert_result};
use series_renamer::progress::{should_use_colors, Progress};
use series_renamer::prompt::{AutoPrompter, ConsolePrompter, Prompter};
use series_renamer::rename::{
    execute_renames, fetch_catalog_cached, plan_renames, select_series, RenameOptions,
};
use series_renamer::revert::{revert_from_history, RevertOptions};
use series_renamer::scanner::scan_media_files;

fn main() {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    logging::init(args.verbose);

    if let Err(e) = run(args) {
        error!("{}", e);
        eprintln!("\nError: {}", e.detailed_message());
        std::process::exit(e.exit_code().into());
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut progress = Progress::new_with_ui(args.verbose > 0, should_use_colors());

    if let Some(history_file) = &args.revert {
        return run_revert(history_file, args.dry, &mut progress);
    }

    let raw_target = args
        .target_dir
        .as_deref()
        .ok_or_else(|| AppError::InvalidArgument("A target directory is required".to_string()))?;
    let target_dir = fs::canonicalize(raw_target).unwrap_or_else(|_| raw_target.to_path_buf());

    let config = load_config(&args)?;

    // Step 1: find the episode files
    progress.scan_start(&target_dir);
    let files = scan_media_files(&target_dir, &config.extensions())?;
    progress.scan_complete(files.len());

    info!("Found {} video files", files.len());
    for file in &files {
        debug!("  {}", file.path.display());
    }

    if files.is_empty() {
        println!("No video files found in {}", target_dir.display());
        return Ok(());
    }

    // Step 2: settle on the series
    let client = TvdbClient::new(ApiConfig::from_config(&config))?;
    let mut prompter: Box<dyn Prompter> = if args.non_interactive {
        Box::new(AutoPrompter)
    } else {
        Box::new(ConsolePrompter::new())
    };

    let suggested = args
        .series
        .clone()
        .unwrap_or_else(|| directory_name(&target_dir));
    let series = select_series(&client, prompter.as_mut(), &suggested, &mut progress)?;

    // Step 3: episode catalog, cached per target directory
    let options = RenameOptions { dry_run: args.dry };
    let mut cache = CacheStore::load(CacheConfig::for_target_dir(&target_dir, args.cache_expiry));
    if !options.dry_run {
        cache.prune_expired();
    }

    let catalog = fetch_catalog_cached(&client, &series, &mut cache, &options, &mut progress)?;

    if !options.dry_run {
        if let Err(e) = cache.save() {
            warn!("Failed to save cache: {}", e);
        }
    }

    // Step 4: match every file and rename
    let engine = Engine::from_config(&config);
    let mut result = plan_renames(
        &files,
        &engine,
        &catalog,
        prompter.as_mut(),
        &options,
        &mut progress,
    );

    if options.dry_run {
        progress.rename_complete(result.operations.len(), result.skipped.len(), true);
        display_dry_run(&result, &mut io::stdout())
            .map_err(|e| AppError::Other(format!("Failed to display output: {}", e)))?;
        return Ok(());
    }

    execute_renames(&mut result, &mut progress);

    if !result.is_empty() {
        let history_path = write_history(&result, &target_dir)?;
        progress.history_written(&history_path);
    }

    progress.rename_complete(result.operations.len(), result.skipped.len(), false);
    display_execution_result(&result, &mut io::stdout())
        .map_err(|e| AppError::Other(format!("Failed to display output: {}", e)))?;

    Ok(())
}

fn load_config(args: &Args) -> Result<Config, AppError> {
    let mut config = Config::load(args.config.as_deref())?;

    if let Some(threshold) = args.threshold {
        config.match_threshold = threshold;
        config
            .validate()
            .map_err(|e| AppError::InvalidArgument(e.to_string()))?;
    }

    debug!("Match threshold {:.2}", config.threshold());
    Ok(config)
}

fn run_revert(history_file: &Path, dry_run: bool, progress: &mut Progress) -> Result<(), AppError> {
    info!("Revert mode: {:?}", history_file);

    let result = revert_from_history(history_file, &RevertOptions { dry_run }, progress)
        .map_err(|e| match AppError::from(e) {
            AppError::History { message, .. } => AppError::History {
                path: Some(history_file.to_path_buf()),
                message,
            },
            other => other,
        })?;

    display_revert_result(&result, &mut io::stdout())
        .map_err(|e| AppError::Other(format!("Failed to display output: {}", e)))?;

    Ok(())
}

/// Last path component, used as the default search query
fn directory_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default()
}
