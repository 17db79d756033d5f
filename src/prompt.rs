//! Interactive decisions: series name, series choice and per-file confirmation.

use dialoguer::{console::Term, Confirm, Input, Select};
use tracing::warn;

use crate::api::SeriesCandidate;

/// Search results offered for selection
pub const MAX_SERIES_CHOICES: usize = 3;

/// What the user picked from the search results
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeriesChoice {
    /// Index into the offered candidates
    Candidate(usize),
    /// A series id typed directly
    SeriesId(String),
}

pub trait Prompter {
    /// Series name to search for, given the suggestion
    fn series_name(&mut self, suggested: &str) -> String;

    /// Pick one of `candidates`, or `None` to abort
    fn choose_series(&mut self, candidates: &[SeriesCandidate]) -> Option<SeriesChoice>;

    /// Whether `from` should be renamed to `to`
    fn confirm_rename(&mut self, from: &str, to: &str) -> bool;
}

/// Non-interactive mode: accept every suggestion
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoPrompter;

impl Prompter for AutoPrompter {
    fn series_name(&mut self, suggested: &str) -> String {
        suggested.to_string()
    }

    fn choose_series(&mut self, candidates: &[SeriesCandidate]) -> Option<SeriesChoice> {
        if candidates.is_empty() {
            None
        } else {
            Some(SeriesChoice::Candidate(0))
        }
    }

    fn confirm_rename(&mut self, _from: &str, _to: &str) -> bool {
        true
    }
}

/// Terminal prompts, drawn on stderr so stdout keeps the plan output.
///
/// A prompt that cannot be shown (no terminal, closed input) is logged and
/// answered with the safe default: keep the suggestion, pick nothing, skip.
pub struct ConsolePrompter {
    term: Term,
}

impl Default for ConsolePrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl ConsolePrompter {
    pub fn new() -> Self {
        Self {
            term: Term::stderr(),
        }
    }

    fn ask_series_id(&self) -> Option<SeriesChoice> {
        let answer: Result<String, _> = Input::new()
            .with_prompt("Series ID")
            .allow_empty(true)
            .interact_text_on(&self.term);

        match answer {
            Ok(id) => series_id_choice(&id),
            Err(e) => {
                warn!("Series ID prompt failed: {}", e);
                None
            }
        }
    }
}

impl Prompter for ConsolePrompter {
    fn series_name(&mut self, suggested: &str) -> String {
        let answer: Result<String, _> = Input::new()
            .with_prompt("Series name (Enter accepts the directory name)")
            .default(suggested.to_string())
            .interact_text_on(&self.term);

        match answer {
            Ok(name) if !name.trim().is_empty() => name.trim().to_string(),
            Ok(_) => suggested.to_string(),
            Err(e) => {
                warn!("Series name prompt failed, using '{}': {}", suggested, e);
                suggested.to_string()
            }
        }
    }

    fn choose_series(&mut self, candidates: &[SeriesCandidate]) -> Option<SeriesChoice> {
        let offered = &candidates[..candidates.len().min(MAX_SERIES_CHOICES)];
        let labels = choice_labels(offered);

        let picked = Select::new()
            .with_prompt("Select the correct series")
            .items(&labels[..])
            .default(0)
            .interact_on_opt(&self.term);

        match picked {
            Ok(Some(index)) if index < offered.len() => Some(SeriesChoice::Candidate(index)),
            Ok(Some(_)) => self.ask_series_id(),
            Ok(None) => None,
            Err(e) => {
                warn!("Series selection prompt failed: {}", e);
                None
            }
        }
    }

    fn confirm_rename(&mut self, from: &str, to: &str) -> bool {
        let answer = Confirm::new()
            .with_prompt(format!("Rename '{}' to '{}'?", from, to))
            .default(false)
            .interact_on(&self.term);

        match answer {
            Ok(confirmed) => confirmed,
            Err(e) => {
                warn!("Confirmation prompt failed, skipping '{}': {}", from, e);
                false
            }
        }
    }
}

/// Menu entries: each offered candidate, then a free series-id entry last
pub fn choice_labels(offered: &[SeriesCandidate]) -> Vec<String> {
    offered
        .iter()
        .map(|candidate| format!("{} - ID: {}", candidate.display_name(), candidate.id))
        .chain(std::iter::once("Enter a specific series ID".to_string()))
        .collect()
}

/// A typed series id; blank means no choice
pub fn series_id_choice(answer: &str) -> Option<SeriesChoice> {
    let answer = answer.trim();
    if answer.is_empty() {
        None
    } else {
        Some(SeriesChoice::SeriesId(answer.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> Vec<SeriesCandidate> {
        (1..=5)
            .map(|i| SeriesCandidate {
                id: (100 + i).to_string(),
                name: format!("Show {}", i),
                year: None,
            })
            .collect()
    }

    #[test]
    fn test_series_id_choice() {
        assert_eq!(
            series_id_choice(" 412345 "),
            Some(SeriesChoice::SeriesId("412345".to_string()))
        );
        assert_eq!(series_id_choice("  "), None);
    }

    #[test]
    fn test_choice_labels_end_with_id_entry() {
        let all = candidates();
        let labels = choice_labels(&all[..MAX_SERIES_CHOICES]);

        assert_eq!(labels.len(), MAX_SERIES_CHOICES + 1);
        assert_eq!(labels[2], "Show 3 - ID: 103");
        assert_eq!(labels[3], "Enter a specific series ID");
    }

    #[test]
    fn test_auto_prompter() {
        let mut prompter = AutoPrompter;

        assert_eq!(prompter.series_name("Show"), "Show");
        assert_eq!(
            prompter.choose_series(&candidates()),
            Some(SeriesChoice::Candidate(0))
        );
        assert_eq!(prompter.choose_series(&[]), None);
        assert!(prompter.confirm_rename("a", "b"));
    }
}
