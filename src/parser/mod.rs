mod normalize;
mod types;

pub use normalize::{
    normalize, normalize_separators, normalize_with_extensions, split_extension,
    split_known_extension, NormalizedName,
};
pub use types::*;

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use tracing::{trace, warn};

// Release-group and bracketed noise: "[GROUP]", "{tag}"
static BRACKET_TAG_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]|\{[^}]*\}").unwrap());

static DIGITS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const TAG_SEPARATOR_PATTERN: &str = r"[\s._-]+";

fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '.' | '_' | '-')
}

/// Longest inclusive range accepted from markers like `S01E01-03`
const MAX_EPISODE_RANGE: u32 = 20;

type MarkerParser = fn(&Captures<'_>) -> Option<(u32, Vec<u32>)>;

struct MarkerPattern {
    rule: MarkerRule,
    regex: Regex,
    parse: MarkerParser,
}

// Most specific first; the first rule that yields a valid marker wins.
static MARKER_RULES: Lazy<Vec<MarkerPattern>> = Lazy::new(|| {
    vec![
        // S01E02, S01E02E03, S01E02 E03 (from "S01E02-E03"), S01E02-04
        MarkerPattern {
            rule: MarkerRule::Compact,
            regex: Regex::new(r"(?i)\bS(\d{1,3})E(\d{1,4})((?:\s?E\d{1,4})*)(?:-(\d{1,4}))?\b")
                .unwrap(),
            parse: parse_compact,
        },
        // "Show S01 E01 Title"
        MarkerPattern {
            rule: MarkerRule::Spaced,
            regex: Regex::new(r"(?i)\bS(\d{1,3})\s+E(\d{1,4})((?:\s+E\d{1,4})*)\b").unwrap(),
            parse: parse_listed,
        },
        // "Season 1 Episode 2", "Season 1 Episode 2 & 3"
        MarkerPattern {
            rule: MarkerRule::Verbose,
            regex: Regex::new(
                r"(?i)\bSeason\s*(\d{1,3})\s*,?\s*Episodes?\s*(\d{1,4})((?:\s*(?:&|\+|and)\s*\d{1,4})*)\b",
            )
            .unwrap(),
            parse: parse_listed,
        },
    ]
});

/// Quality and release tags stripped from embedded titles
#[derive(Debug, Clone, Default)]
pub struct QualityTags {
    regex: Option<Regex>,
}

impl QualityTags {
    pub fn new<S: AsRef<str>>(tags: &[S]) -> Self {
        // Any run of separators matches between tag parts, so "WEB-DL" also
        // matches "WEB DL" and "web.dl", and "DDP5.1" matches "DDP5 1".
        let mut alternatives: Vec<String> = tags
            .iter()
            .map(|tag| {
                tag.as_ref()
                    .split(is_separator)
                    .filter(|part| !part.is_empty())
                    .map(regex::escape)
                    .collect::<Vec<_>>()
                    .join(TAG_SEPARATOR_PATTERN)
            })
            .filter(|pattern| !pattern.is_empty())
            .collect();

        if alternatives.is_empty() {
            return Self::default();
        }

        // Longest first so "WEB-DL" wins over "WEB"
        alternatives.sort_by(|a, b| b.len().cmp(&a.len()));

        let pattern = format!(r"(?i)\b(?:{})\b", alternatives.join("|"));
        match Regex::new(&pattern) {
            Ok(regex) => Self { regex: Some(regex) },
            Err(e) => {
                warn!("Ignoring quality tags, pattern failed to compile: {}", e);
                Self::default()
            }
        }
    }

    /// Remove every configured tag from `text`
    pub fn strip<'a>(&self, text: &'a str) -> std::borrow::Cow<'a, str> {
        match &self.regex {
            Some(regex) => regex.replace_all(text, " "),
            None => std::borrow::Cow::Borrowed(text),
        }
    }

    /// Strip tags and separator leftovers; `None` when nothing remains
    pub fn clean_title(&self, text: &str) -> Option<String> {
        let stripped = self.strip(text);
        let collapsed = WHITESPACE_REGEX.replace_all(&stripped, " ");
        let cleaned = trim_separators(&collapsed);

        if cleaned.is_empty() {
            None
        } else {
            Some(cleaned.to_string())
        }
    }
}

/// Extract metadata from a raw filename (normalizes first)
pub fn extract(raw: &str, tags: &QualityTags) -> ExtractedMetadata {
    extract_normalized(&normalize(raw), tags)
}

/// Extract metadata from an already normalized filename
pub fn extract_normalized(name: &NormalizedName, tags: &QualityTags) -> ExtractedMetadata {
    let stem = BRACKET_TAG_REGEX.replace_all(&name.stem, " ");
    let stem = WHITESPACE_REGEX.replace_all(&stem, " ");
    let stem = stem.trim();

    for pattern in MARKER_RULES.iter() {
        for captures in pattern.regex.captures_iter(stem) {
            let Some((season, episode_numbers)) = (pattern.parse)(&captures) else {
                trace!(rule = ?pattern.rule, "Marker rejected, numbers out of range");
                continue;
            };
            let Some(whole) = captures.get(0) else {
                continue;
            };

            let series_hint = Some(trim_separators(&stem[..whole.start()]))
                .filter(|hint| !hint.is_empty())
                .map(str::to_string);

            return ExtractedMetadata {
                series_hint,
                season: Some(season),
                episode_numbers,
                embedded_title: tags.clean_title(&stem[whole.end()..]),
                extension: name.extension.clone(),
                rule: Some(pattern.rule),
            };
        }
    }

    // Fallback: no marker, the whole stem is the title candidate
    ExtractedMetadata {
        embedded_title: tags.clean_title(stem),
        extension: name.extension.clone(),
        ..Default::default()
    }
}

fn parse_compact(captures: &Captures<'_>) -> Option<(u32, Vec<u32>)> {
    let (season, mut episodes) = parse_listed(captures)?;

    if let Some(end) = captures.get(4) {
        let end: u32 = end.as_str().parse().ok()?;
        let last = *episodes.last()?;
        if end > last && end - last <= MAX_EPISODE_RANGE {
            episodes.extend(last + 1..=end);
        }
    }

    Some((season, episodes))
}

fn parse_listed(captures: &Captures<'_>) -> Option<(u32, Vec<u32>)> {
    let season: u32 = captures.get(1)?.as_str().parse().ok()?;
    let first: u32 = captures.get(2)?.as_str().parse().ok()?;

    let mut episodes = vec![first];
    if let Some(extra) = captures.get(3) {
        for m in DIGITS_REGEX.find_iter(extra.as_str()) {
            episodes.push(m.as_str().parse().ok()?);
        }
    }

    if season == 0 || episodes.contains(&0) {
        return None;
    }

    episodes.sort_unstable();
    episodes.dedup();

    Some((season, episodes))
}

fn trim_separators(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || matches!(c, '-' | '.' | '_' | '+'))
}
