//! Greedy multi-episode resolution.
//!
//! A compound title such as "Firefighters at School + Daniel's Doll" is split
//! into words. Every contiguous word span is scored against every catalog
//! episode, and the best non-overlapping pairs are consumed one at a time.

use super::{MatchCandidate, TokenMatcher};
use crate::catalog::CatalogEpisode;
use std::cmp::Ordering;
use std::collections::HashSet;
use std::ops::Range;
use tracing::{debug, trace};

/// Unexplained alphanumeric characters tolerated next to a single match
pub const TRAILING_NOISE_MAX_CHARS: usize = 10;

/// Extra words a span may hold beyond the longest catalog title
const SPAN_SLACK_WORDS: usize = 2;

/// A word of the embedded title with its byte range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Word<'a> {
    text: &'a str,
    start: usize,
    end: usize,
}

fn split_words(title: &str) -> Vec<Word<'_>> {
    let mut words = Vec::new();
    let mut start = None;

    for (i, c) in title.char_indices() {
        if c.is_whitespace() || c == '+' {
            if let Some(s) = start.take() {
                words.push(Word {
                    text: &title[s..i],
                    start: s,
                    end: i,
                });
            }
        } else if start.is_none() {
            start = Some(i);
        }
    }

    if let Some(s) = start {
        words.push(Word {
            text: &title[s..],
            start: s,
            end: title.len(),
        });
    }

    words
}

struct SpanScore {
    words: Range<usize>,
    candidate: MatchCandidate,
}

fn compare_spans(a: &SpanScore, b: &SpanScore) -> Ordering {
    b.candidate
        .score
        .total_cmp(&a.candidate.score)
        .then_with(|| b.words.len().cmp(&a.words.len()))
        .then_with(|| a.words.start.cmp(&b.words.start))
        .then_with(|| a.candidate.episode.number.cmp(&b.candidate.episode.number))
}

/// Accepted candidates for `title`, ordered by episode number.
///
/// Returns an empty vector when nothing matches, or when a lone match leaves
/// too much of the title unexplained.
pub fn select_candidates(
    matcher: &TokenMatcher,
    title: &str,
    episodes: &[CatalogEpisode],
) -> Vec<MatchCandidate> {
    let words = split_words(title);
    if words.is_empty() || episodes.is_empty() {
        return Vec::new();
    }

    let longest_title = episodes
        .iter()
        .map(|e| split_words(&e.title).len())
        .max()
        .unwrap_or(0);
    let max_span = (longest_title + SPAN_SLACK_WORDS).min(words.len());

    let mut scored = Vec::new();
    for start in 0..words.len() {
        for len in 1..=max_span.min(words.len() - start) {
            let span = start..start + len;
            let byte_span = words[span.start].start..words[span.end - 1].end;
            let text = &title[byte_span.clone()];

            for episode in episodes {
                let score = matcher.score(text, episode);
                if matcher.is_match(score) {
                    scored.push(SpanScore {
                        words: span.clone(),
                        candidate: MatchCandidate {
                            episode: episode.clone(),
                            score,
                            consumed_title_span: byte_span.clone(),
                        },
                    });
                }
            }
        }
    }

    scored.sort_by(compare_spans);
    trace!("{} span candidates above threshold", scored.len());

    let mut consumed = vec![false; words.len()];
    let mut selected_keys = HashSet::new();
    let mut selected: Vec<(Range<usize>, MatchCandidate)> = Vec::new();

    for span in scored {
        if selected.len() == episodes.len() {
            break;
        }
        if consumed[span.words.clone()].iter().any(|&c| c) {
            continue;
        }
        if !selected_keys.insert(span.candidate.episode.key()) {
            continue;
        }

        for flag in &mut consumed[span.words.clone()] {
            *flag = true;
        }
        debug!(
            "Span {:?} -> S{:02}E{:02} ({:.2})",
            &title[span.candidate.consumed_title_span.clone()],
            span.candidate.episode.season,
            span.candidate.episode.number,
            span.candidate.score
        );
        selected.push((span.words, span.candidate));
    }

    if selected.len() == 1 {
        let leftover: usize = words
            .iter()
            .zip(&consumed)
            .filter(|(_, used)| !**used)
            .map(|(w, _)| {
                matcher
                    .tokens(w.text)
                    .iter()
                    .map(|t| t.chars().count())
                    .sum::<usize>()
            })
            .sum();

        if leftover > TRAILING_NOISE_MAX_CHARS {
            debug!(
                "Rejecting single match, {} unexplained characters remain",
                leftover
            );
            return Vec::new();
        }
    }

    let mut candidates: Vec<MatchCandidate> = selected.into_iter().map(|(_, c)| c).collect();
    candidates.sort_by_key(|c| c.episode.number);
    candidates
}

/// Catalog episodes that together explain `title`, ordered by number
pub fn resolve_titles(
    matcher: &TokenMatcher,
    title: &str,
    episodes: &[CatalogEpisode],
) -> Vec<CatalogEpisode> {
    select_candidates(matcher, title, episodes)
        .into_iter()
        .map(|c| c.episode)
        .collect()
}
