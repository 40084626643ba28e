//! Search scoring and fallback settings.

use serde::{Deserialize, Serialize};

/// Thresholds and weights used by the matcher and the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Score of a section whose name equals or starts with the query.
    pub section_exact_score: f64,
    /// Score of a chapter whose code or name equals or starts with the query.
    pub chapter_exact_score: f64,
    /// Score of an exact heading or subheading hit for a code-like query.
    pub code_exact_score: f64,
    /// Score of an exact heading or subheading hit for a textual query.
    pub text_exact_score: f64,
    /// Approximate candidates must score strictly above this.
    pub approximate_threshold: f64,
    /// Added when a text field starts with the query.
    pub prefix_bonus: f64,
    /// Multiplier applied to matches found through synonyms.
    pub synonym_factor: f64,
    /// Suggestions are computed when fewer candidates than this were found.
    pub suggestion_trigger: usize,
    /// Closest-match cutoff for the code suggestion pool.
    pub code_suggestion_cutoff: f64,
    /// Size of the code suggestion pool.
    pub code_suggestion_pool: usize,
    /// Suggestions must have a similarity strictly above this.
    pub suggestion_threshold: f64,
    /// Fixed score of a code suggestion.
    pub code_suggestion_score: f64,
    /// Multiplier applied to description suggestion similarities.
    pub description_suggestion_factor: f64,
    /// Maximum number of ranked candidates returned.
    pub max_candidates: usize,
    /// Maximum code suggestions on a results page.
    pub max_code_suggestions: usize,
    /// Maximum description suggestions, both ranked and on a results page.
    pub max_description_suggestions: usize,
    /// Maximum synonym terms shown on a results page.
    pub max_synonym_terms: usize,
    /// Similarity scans over more texts than this run in parallel.
    pub parallel_threshold: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            section_exact_score: 1.0,
            chapter_exact_score: 0.95,
            code_exact_score: 0.90,
            text_exact_score: 0.85,
            approximate_threshold: 0.25,
            prefix_bonus: 0.10,
            synonym_factor: 0.75,
            suggestion_trigger: 3,
            code_suggestion_cutoff: 0.3,
            code_suggestion_pool: 8,
            suggestion_threshold: 0.35,
            code_suggestion_score: 0.65,
            description_suggestion_factor: 0.8,
            max_candidates: 12,
            max_code_suggestions: 5,
            max_description_suggestions: 8,
            max_synonym_terms: 5,
            parallel_threshold: 2048,
        }
    }
}
