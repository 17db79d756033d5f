use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "series-renamer")]
#[command(author, version, about, long_about = None)]
#[command(about = "Rename TV episode files to TheTVDB naming using fuzzy episode-title matching")]
pub struct Args {
    /// Directory containing the episode files of one series
    #[arg(required_unless_present = "revert")]
    pub target_dir: Option<PathBuf>,

    /// Simulate changes without modifying the filesystem
    #[arg(short, long)]
    pub dry: bool,

    /// Never prompt: take the first search result and accept every rename
    #[arg(short = 'y', long)]
    pub non_interactive: bool,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Series name to search for (defaults to the directory name)
    #[arg(short, long)]
    pub series: Option<String>,

    /// Path to the JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Match threshold, 0-1 or a percentage (overrides the config file)
    #[arg(short, long)]
    pub threshold: Option<f64>,

    /// Cache expiration in days
    #[arg(long, default_value = "30")]
    pub cache_expiry: u32,

    /// Revert changes using a history file
    #[arg(short, long, value_name = "HISTORY_FILE")]
    pub revert: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let args = Args::try_parse_from(["series-renamer", "/tv/Show"]).unwrap();
        assert_eq!(args.target_dir, Some(PathBuf::from("/tv/Show")));
        assert!(!args.dry);
        assert!(!args.non_interactive);
        assert_eq!(args.cache_expiry, 30);
    }

    #[test]
    fn test_parse_all_flags() {
        let args = Args::try_parse_from([
            "series-renamer",
            "/tv/Show",
            "-d",
            "-y",
            "-vv",
            "--series",
            "Rosie's Rules",
            "--threshold",
            "90",
            "--cache-expiry",
            "7",
        ])
        .unwrap();

        assert!(args.dry);
        assert!(args.non_interactive);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.series.as_deref(), Some("Rosie's Rules"));
        assert_eq!(args.threshold, Some(90.0));
        assert_eq!(args.cache_expiry, 7);
    }

    #[test]
    fn test_target_required_without_revert() {
        assert!(Args::try_parse_from(["series-renamer"]).is_err());
        assert!(Args::try_parse_from(["series-renamer", "--revert", "h.json"]).is_ok());
    }
}
