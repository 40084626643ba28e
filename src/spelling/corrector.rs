//! Query spelling corrector.
//!
//! Each letter run of a query is checked against two ordered sources: the
//! domain vocabulary built from catalog text, then the general-language
//! [`SpellingDictionary`]. Everything around the letter runs (spaces, digits,
//! punctuation) is kept byte for byte.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::catalog::CatalogSource;
use crate::error::CorrectionError;
use crate::spelling::dictionary::{BuiltinDictionary, SpellingDictionary};
use crate::spelling::sequence::scored_close_matches;
use crate::spelling::vocabulary::{VocabularyCache, VocabularyIndex};

lazy_static! {
    static ref LETTER_RUN: Regex = Regex::new(r"\p{L}+").unwrap();
}

/// Configuration for the spelling corrector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectorConfig {
    /// Minimum ratio for a vocabulary word to be considered at all.
    pub cutoff: f64,
    /// Maximum number of vocabulary candidates considered per token.
    pub max_candidates: usize,
    /// Minimum ratio for the best vocabulary candidate to be accepted.
    pub accept_threshold: f64,
    /// Letter runs shorter than this are never corrected.
    pub min_token_len: usize,
    /// Letter runs longer than this are rejected as malformed input.
    pub max_token_len: usize,
}

impl Default for CorrectorConfig {
    fn default() -> Self {
        CorrectorConfig {
            cutoff: 0.6,
            max_candidates: 5,
            accept_threshold: 0.65,
            min_token_len: 3,
            max_token_len: 40,
        }
    }
}

/// Where a word correction came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorrectionSource {
    Vocabulary,
    Dictionary,
}

/// One corrected word.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordCorrection {
    pub original: String,
    pub corrected: String,
    pub source: CorrectionSource,
}

/// Result of correcting a whole query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Correction {
    pub original: String,
    pub corrected: String,
    pub corrections: Vec<WordCorrection>,
}

impl Correction {
    /// A correction that changes nothing.
    pub fn unchanged(text: &str) -> Self {
        Correction {
            original: text.to_string(),
            corrected: text.to_string(),
            corrections: Vec::new(),
        }
    }

    /// Whether any word was replaced.
    pub fn is_changed(&self) -> bool {
        self.corrected != self.original
    }
}

/// Spelling corrector with a lazily built domain vocabulary.
#[derive(Debug)]
pub struct SpellingCorrector {
    dictionary: SpellingDictionary,
    vocabulary: VocabularyCache,
    config: CorrectorConfig,
}

impl SpellingCorrector {
    /// Create a new spelling corrector with the built-in Spanish dictionary.
    pub fn new() -> Self {
        Self::with_config(BuiltinDictionary::spanish(), CorrectorConfig::default())
    }

    /// Create a new spelling corrector with custom dictionary.
    pub fn with_dictionary(dictionary: SpellingDictionary) -> Self {
        Self::with_config(dictionary, CorrectorConfig::default())
    }

    /// Create a new spelling corrector with custom configuration.
    pub fn with_config(dictionary: SpellingDictionary, config: CorrectorConfig) -> Self {
        SpellingCorrector {
            dictionary,
            vocabulary: VocabularyCache::new(),
            config,
        }
    }

    pub fn config(&self) -> &CorrectorConfig {
        &self.config
    }

    /// The vocabulary cache; see [`VocabularyCache::invalidate`].
    pub fn vocabulary(&self) -> &VocabularyCache {
        &self.vocabulary
    }

    /// Correction for a single word, or `None` if it should stay as typed.
    ///
    /// The returned word is lowercase; callers restore capitalization.
    pub fn correct_token(&self, token: &str, vocabulary: &VocabularyIndex) -> Option<WordCorrection> {
        let lower = token.to_lowercase();
        if lower.chars().count() < self.config.min_token_len || vocabulary.contains(&lower) {
            return None;
        }

        let candidates = scored_close_matches(
            &lower,
            vocabulary.tokens().iter().map(String::as_str),
            self.config.max_candidates,
            self.config.cutoff,
        );
        // Sorted by ratio, so the first candidate is the best one
        if let Some((ratio, best)) = candidates.into_iter().next()
            && ratio >= self.config.accept_threshold
        {
            return Some(WordCorrection {
                original: token.to_string(),
                corrected: best,
                source: CorrectionSource::Vocabulary,
            });
        }

        self.dictionary
            .correction(&lower)
            .filter(|suggestion| *suggestion != lower)
            .map(|suggestion| WordCorrection {
                original: token.to_string(),
                corrected: suggestion,
                source: CorrectionSource::Dictionary,
            })
    }

    /// Correct every letter run of `text` against a given vocabulary.
    pub fn correct_with(
        &self,
        text: &str,
        vocabulary: &VocabularyIndex,
    ) -> Result<Correction, CorrectionError> {
        let mut corrected = String::with_capacity(text.len());
        let mut corrections = Vec::new();
        let mut last = 0;

        for run in LETTER_RUN.find_iter(text) {
            let word = run.as_str();
            if word.chars().count() > self.config.max_token_len {
                return Err(CorrectionError::Token(format!(
                    "'{word}' is longer than {} letters",
                    self.config.max_token_len
                )));
            }

            corrected.push_str(&text[last..run.start()]);
            match self.correct_token(word, vocabulary) {
                Some(mut correction) => {
                    correction.corrected = match_capitalization(word, &correction.corrected);
                    corrected.push_str(&correction.corrected);
                    corrections.push(correction);
                }
                None => corrected.push_str(word),
            }
            last = run.end();
        }
        corrected.push_str(&text[last..]);

        Ok(Correction {
            original: text.to_string(),
            corrected,
            corrections,
        })
    }

    /// Correct `text` against the catalog vocabulary, building it if needed.
    pub fn correct_text(
        &self,
        text: &str,
        catalog: &dyn CatalogSource,
    ) -> Result<Correction, CorrectionError> {
        let vocabulary = self.vocabulary.get_or_build(catalog)?;
        self.correct_with(text, &vocabulary)
    }

    /// Best-effort correction: any failure yields the original text.
    pub fn correct_or_original(&self, text: &str, catalog: &dyn CatalogSource) -> Correction {
        match self.correct_text(text, catalog) {
            Ok(correction) => correction,
            Err(e) => {
                log::warn!("Spelling correction skipped for '{text}': {e}");
                Correction::unchanged(text)
            }
        }
    }
}

impl Default for SpellingCorrector {
    fn default() -> Self {
        Self::new()
    }
}

/// Uppercase the first letter of `corrected` if `original` starts uppercase.
fn match_capitalization(original: &str, corrected: &str) -> String {
    let starts_upper = original.chars().next().is_some_and(char::is_uppercase);
    let mut chars = corrected.chars();
    match chars.next() {
        Some(first) if starts_upper => first.to_uppercase().chain(chars).collect(),
        _ => corrected.to_string(),
    }
}
