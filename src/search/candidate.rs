//! Scored candidates and the deduplicating result set.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{Level, Searchable, TariffEntry};
use crate::search::scorer::clamp_score;

/// One ranked hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    pub level: Level,
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub text: String,
    /// Group title shown above a subheading
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_context: Option<String>,
    pub score: f64,
    pub is_correction: bool,
    pub is_synonym_match: bool,
}

impl ScoredCandidate {
    /// Candidate for `entry`, with the score clamped to `[0, 1]`.
    pub fn new(entry: &TariffEntry, score: f64) -> Self {
        ScoredCandidate {
            level: entry.level(),
            id: entry.id(),
            code: entry.code().map(str::to_string),
            text: entry.display_text().to_string(),
            title_context: None,
            score: clamp_score(score),
            is_correction: false,
            is_synonym_match: false,
        }
    }

    pub fn with_correction(mut self, is_correction: bool) -> Self {
        self.is_correction = is_correction;
        self
    }

    pub fn as_synonym_match(mut self) -> Self {
        self.is_synonym_match = true;
        self
    }

    pub fn with_title_context(mut self, title_context: Option<String>) -> Self {
        self.title_context = title_context;
        self
    }

    /// Deduplication key.
    pub fn key(&self) -> (Level, u32) {
        (self.level, self.id)
    }
}

/// Candidates merged from several search paths.
///
/// Keeps one candidate per `(level, id)`, the highest-scoring one. Among
/// equal scores the earliest inserted wins, and ranking preserves insertion
/// order for ties.
#[derive(Debug, Default)]
pub struct CandidateSet {
    /// (insertion sequence, candidate)
    entries: Vec<(u64, ScoredCandidate)>,
    positions: AHashMap<(Level, u32), usize>,
    next_seq: u64,
}

impl CandidateSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a candidate; returns whether it was kept.
    pub fn insert(&mut self, candidate: ScoredCandidate) -> bool {
        let seq = self.next_seq;
        self.next_seq += 1;

        match self.positions.get(&candidate.key()) {
            Some(&pos) => {
                if candidate.score > self.entries[pos].1.score {
                    self.entries[pos] = (seq, candidate);
                    true
                } else {
                    false
                }
            }
            None => {
                self.positions.insert(candidate.key(), self.entries.len());
                self.entries.push((seq, candidate));
                true
            }
        }
    }

    pub fn extend<I: IntoIterator<Item = ScoredCandidate>>(&mut self, candidates: I) {
        for candidate in candidates {
            self.insert(candidate);
        }
    }

    pub fn contains(&self, key: &(Level, u32)) -> bool {
        self.positions.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Candidates by descending score, at most `limit` of them.
    pub fn into_ranked(self, limit: usize) -> Vec<ScoredCandidate> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.1.score.total_cmp(&a.1.score).then(a.0.cmp(&b.0)));
        entries
            .into_iter()
            .take(limit)
            .map(|(_, candidate)| candidate)
            .collect()
    }
}
