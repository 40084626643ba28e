//! Candidate scoring rules.
//!
//! Exact and prefix hits get a fixed score per level. Everything else is
//! scored by similarity: edit distance for codes when the query looks like a
//! code, sequence ratio otherwise, with a bonus for fields that start with
//! the query.

use crate::catalog::{Level, Searchable, TariffEntry};
use crate::search::config::SearchConfig;
use crate::spelling::{SequenceMatcher, levenshtein_similarity};

/// Clamp a score into `[0, 1]`.
pub fn clamp_score(score: f64) -> f64 {
    score.clamp(0.0, 1.0)
}

/// Fixed score of an exact or prefix hit at `level`.
pub fn exact_score(level: Level, code_like: bool, config: &SearchConfig) -> f64 {
    match level {
        Level::Section => config.section_exact_score,
        Level::Chapter => config.chapter_exact_score,
        Level::Heading | Level::Subheading => {
            if code_like {
                config.code_exact_score
            } else {
                config.text_exact_score
            }
        }
    }
}

/// Query prepared for scoring many entries.
pub struct QueryScorer<'a> {
    query: String,
    code_like: bool,
    matcher: SequenceMatcher,
    config: &'a SearchConfig,
}

impl<'a> QueryScorer<'a> {
    pub fn new(query: &str, code_like: bool, config: &'a SearchConfig) -> Self {
        let query = query.trim().to_lowercase();
        let matcher = SequenceMatcher::new(&query);
        QueryScorer {
            query,
            code_like,
            matcher,
            config,
        }
    }

    /// Similarity of one text field, prefix bonus included.
    pub fn text_score(&self, field: &str) -> f64 {
        let field = field.to_lowercase();
        let mut score = self.matcher.ratio(&field);
        if field.starts_with(&self.query) {
            score += self.config.prefix_bonus;
        }
        score
    }

    /// Similarity of a code field.
    pub fn code_score(&self, code: &str) -> f64 {
        if self.code_like {
            levenshtein_similarity(&code.to_lowercase(), &self.query)
        } else {
            self.text_score(code)
        }
    }

    /// Best similarity over the code and text fields of an entry, clamped.
    pub fn approximate_score(&self, entry: &TariffEntry) -> f64 {
        let code = entry.code().map(|c| self.code_score(c));
        let best = entry
            .text_fields()
            .into_iter()
            .filter(|f| !f.is_empty())
            .map(|f| self.text_score(f))
            .chain(code)
            .fold(0.0, f64::max);
        clamp_score(best)
    }
}

/// Whether `term` occurs in `text` at the start of a word, ignoring case.
///
/// Used for synonym terms, so "res" finds "res" and "reses" but not
/// "fresco".
pub fn contains_word_prefix(text: &str, term: &str) -> bool {
    let text = text.to_lowercase();
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return false;
    }

    text.match_indices(&term).any(|(pos, _)| {
        text[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}
