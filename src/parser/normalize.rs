use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;

// Extension: short alphanumeric suffix that starts with a letter (mkv, mp4, m4v, webm)
static EXTENSION_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?s)(.*)\.([A-Za-z][A-Za-z0-9]{1,3})$").unwrap());

static WHITESPACE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// A filename with separator noise canonicalized to single spaces.
///
/// The extension is kept verbatim and decimal-like numbers ("1.5", "01-02")
/// are never split.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedName {
    pub stem: String,
    pub extension: Option<String>,
}

impl fmt::Display for NormalizedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.extension {
            Some(ext) => write!(f, "{}.{}", self.stem, ext),
            None => f.write_str(&self.stem),
        }
    }
}

/// Normalize a raw filename for metadata extraction
pub fn normalize(raw: &str) -> NormalizedName {
    let (stem, extension) = split_extension(raw);

    NormalizedName {
        stem: normalize_separators(stem),
        extension: extension.map(str::to_string),
    }
}

/// Normalize with the extension restricted to `known` (lowercase, no dot).
///
/// An empty `known` falls back to the shape-based guess of [`normalize`].
pub fn normalize_with_extensions(raw: &str, known: &[String]) -> NormalizedName {
    let (stem, extension) = split_known_extension(raw, known);

    NormalizedName {
        stem: normalize_separators(stem),
        extension: extension.map(str::to_string),
    }
}

/// Like [`split_extension`], but a suffix only counts when it is in `known`
pub fn split_known_extension<'a>(raw: &'a str, known: &[String]) -> (&'a str, Option<&'a str>) {
    if known.is_empty() {
        return split_extension(raw);
    }

    match raw.rsplit_once('.') {
        Some((stem, ext)) if known.iter().any(|k| k.eq_ignore_ascii_case(ext)) => (stem, Some(ext)),
        _ => (raw, None),
    }
}

/// Split a filename into stem and extension (without the dot)
pub fn split_extension(raw: &str) -> (&str, Option<&str>) {
    match EXTENSION_REGEX.captures(raw) {
        Some(captures) => {
            let stem = captures.get(1).map_or("", |m| m.as_str());
            (stem, captures.get(2).map(|m| m.as_str()))
        }
        None => (raw, None),
    }
}

/// Replace `.`, `_` and `-` with spaces unless they sit between two digits,
/// then collapse whitespace.
pub fn normalize_separators(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();

    let replaced: String = chars
        .iter()
        .enumerate()
        .map(|(i, &c)| {
            if matches!(c, '.' | '_' | '-') && !between_digits(&chars, i) {
                ' '
            } else {
                c
            }
        })
        .collect();

    WHITESPACE_REGEX
        .replace_all(&replaced, " ")
        .trim()
        .to_string()
}

fn between_digits(chars: &[char], i: usize) -> bool {
    i > 0
        && chars[i - 1].is_ascii_digit()
        && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit())
}
