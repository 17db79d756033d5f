use thiserror::Error;

use super::types::ResolvedRename;

/// A resolved rename that breaks the formatter's input contract
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Format contract violation: {0}")]
    ContractViolation(String),
}

/// Build the canonical episode filename:
/// `{series} - S{ss}E{nn}[E{nn}...] - {title}[ + {title}...].{ext}`
pub fn format_name(resolved: &ResolvedRename) -> Result<String, FormatError> {
    check_contract(resolved)?;

    let episodes: String = resolved
        .episode_numbers
        .iter()
        .map(|n| format!("E{:02}", n))
        .collect();

    let titles = resolved.titles.join(" + ");

    let mut name = format!(
        "{} - S{:02}{} - {}",
        resolved.series, resolved.season, episodes, titles
    );

    if !resolved.extension.is_empty() {
        name.push('.');
        name.push_str(&resolved.extension);
    }

    Ok(sanitize_filename(&name))
}

fn check_contract(resolved: &ResolvedRename) -> Result<(), FormatError> {
    if resolved.episode_numbers.is_empty() {
        return Err(FormatError::ContractViolation(
            "no episode numbers".to_string(),
        ));
    }

    if resolved.titles.len() != resolved.episode_numbers.len() {
        return Err(FormatError::ContractViolation(format!(
            "{} titles for {} episodes",
            resolved.titles.len(),
            resolved.episode_numbers.len()
        )));
    }

    if resolved.episode_numbers.windows(2).any(|w| w[0] >= w[1]) {
        return Err(FormatError::ContractViolation(format!(
            "episode numbers not strictly increasing: {:?}",
            resolved.episode_numbers
        )));
    }

    Ok(())
}

/// Remove characters that are invalid in filenames
pub fn sanitize_filename(name: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];

    name.chars().filter(|c| !invalid_chars.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{extract, QualityTags};

    fn resolved(numbers: &[u32], titles: &[&str], ext: &str) -> ResolvedRename {
        ResolvedRename {
            series: "Rosie's Rules".to_string(),
            season: 1,
            episode_numbers: numbers.to_vec(),
            titles: titles.iter().map(|t| t.to_string()).collect(),
            extension: ext.to_string(),
        }
    }

    #[test]
    fn test_format_single_episode() {
        let name = format_name(&resolved(&[3], &["Cat Mail"], "mkv")).unwrap();
        assert_eq!(name, "Rosie's Rules - S01E03 - Cat Mail.mkv");
    }

    #[test]
    fn test_format_multi_episode() {
        let name = format_name(&resolved(
            &[1, 2],
            &["Abuela's Birthday", "Cat Mail"],
            "mp4",
        ))
        .unwrap();
        assert_eq!(
            name,
            "Rosie's Rules - S01E01E02 - Abuela's Birthday + Cat Mail.mp4"
        );
    }

    #[test]
    fn test_format_without_extension() {
        let name = format_name(&resolved(&[1], &["Pilot"], "")).unwrap();
        assert_eq!(name, "Rosie's Rules - S01E01 - Pilot");
    }

    #[test]
    fn test_format_wide_numbers() {
        let mut r = resolved(&[105], &["Big One"], "mkv");
        r.season = 12;
        assert_eq!(
            format_name(&r).unwrap(),
            "Rosie's Rules - S12E105 - Big One.mkv"
        );
    }

    #[test]
    fn test_format_removes_invalid_chars() {
        let name = format_name(&resolved(&[1], &["What? Who: Me/You"], "mkv")).unwrap();
        assert_eq!(name, "Rosie's Rules - S01E01 - What Who MeYou.mkv");
    }

    #[test]
    fn test_format_contract_violations() {
        assert!(matches!(
            format_name(&resolved(&[], &[], "mkv")),
            Err(FormatError::ContractViolation(_))
        ));
        assert!(matches!(
            format_name(&resolved(&[1, 2], &["Only One"], "mkv")),
            Err(FormatError::ContractViolation(_))
        ));
        assert!(matches!(
            format_name(&resolved(&[2, 1], &["B", "A"], "mkv")),
            Err(FormatError::ContractViolation(_))
        ));
        assert!(matches!(
            format_name(&resolved(&[2, 2], &["B", "B"], "mkv")),
            Err(FormatError::ContractViolation(_))
        ));
    }

    #[test]
    fn test_formatted_name_parses_back() {
        let tags = QualityTags::default();
        let cases: [(&[u32], &[&str]); 3] = [
            (&[1], &["Pilot"]),
            (&[1, 2], &["Abuela's Birthday", "Cat Mail"]),
            (&[7, 8, 9], &["One", "Two", "Three"]),
        ];

        for (numbers, titles) in cases {
            let name = format_name(&resolved(numbers, titles, "mkv")).unwrap();
            let meta = extract(&name, &tags);
            assert_eq!(meta.season, Some(1), "season for {}", name);
            assert_eq!(meta.episode_numbers, numbers.to_vec(), "episodes for {}", name);
        }
    }

    #[test]
    fn test_sanitize_filename() {
        let input = "Test: File/Name*With?Invalid<Chars>And|More\"Stuff";
        assert_eq!(
            sanitize_filename(input),
            "Test FileNameWithInvalidCharsAndMoreStuff"
        );
    }
}
