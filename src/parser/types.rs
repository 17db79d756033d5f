/// Which marker rule recognized the season/episode token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerRule {
    /// `S01E02`, `S01E02E03`, `S01E02-03`
    Compact,
    /// `S01 E02` with standalone tokens
    Spaced,
    /// `Season 1 Episode 2`
    Verbose,
}

impl MarkerRule {
    pub fn description(&self) -> &'static str {
        match self {
            MarkerRule::Compact => "compact SxxEyy marker",
            MarkerRule::Spaced => "spaced Sxx Eyy marker",
            MarkerRule::Verbose => "Season/Episode words",
        }
    }
}

/// Best-guess metadata pulled out of a filename.
///
/// Every field is optional: a filename without a marker or usable text
/// produces an all-absent record, never one filled with defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedMetadata {
    pub series_hint: Option<String>,
    pub season: Option<u32>,
    /// Strictly increasing, empty when unknown
    pub episode_numbers: Vec<u32>,
    pub embedded_title: Option<String>,
    pub extension: Option<String>,
    pub rule: Option<MarkerRule>,
}

impl ExtractedMetadata {
    pub fn has_marker(&self) -> bool {
        self.season.is_some() || !self.episode_numbers.is_empty()
    }

    /// True when nothing besides the extension was recovered
    pub fn is_empty(&self) -> bool {
        !self.has_marker() && self.series_hint.is_none() && self.embedded_title.is_none()
    }
}
