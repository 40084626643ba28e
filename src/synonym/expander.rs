//! Bidirectional synonym expansion.

use std::sync::Arc;

use ahash::AHashSet;
use unicode_segmentation::UnicodeSegmentation;

use crate::synonym::thesaurus::{Thesaurus, normalize_term};

/// Expands query terms through a [`Thesaurus`].
///
/// Expansion is bidirectional: a term that only appears as a related term
/// still reaches its key and the key's other related terms.
#[derive(Debug, Clone)]
pub struct SynonymExpander {
    thesaurus: Arc<Thesaurus>,
}

impl SynonymExpander {
    pub fn new(thesaurus: Arc<Thesaurus>) -> Self {
        SynonymExpander { thesaurus }
    }

    /// Expander over the built-in Spanish table.
    pub fn spanish() -> Self {
        Self::new(Thesaurus::spanish())
    }

    pub fn thesaurus(&self) -> &Thesaurus {
        &self.thesaurus
    }

    /// Related terms of `term` when it is a key; empty otherwise.
    pub fn direct(&self, term: &str) -> Vec<String> {
        self.thesaurus
            .get(&normalize_term(term))
            .map(<[String]>::to_vec)
            .unwrap_or_default()
    }

    /// `term` plus every term related to it in either direction.
    ///
    /// The first element is always the normalized term itself, followed by
    /// its direct related terms and then the reverse matches in table order.
    ///
    /// A blank term normalizes to the empty string, which is not a search
    /// term, so it expands to an empty vec instead of `[""]`. Every
    /// non-blank term expands to at least itself.
    pub fn expand(&self, term: &str) -> Vec<String> {
        let term = normalize_term(term);
        if term.is_empty() {
            return Vec::new();
        }

        let mut expansion = Expansion::default();
        expansion.push(&term);

        if let Some(related) = self.thesaurus.get(&term) {
            expansion.extend(related);
        }

        for (key, related) in self.thesaurus.iter() {
            if related.iter().any(|r| *r == term) {
                expansion.push(key);
                expansion.extend(related);
            }
        }

        expansion.terms
    }

    /// Word-level expansion of a whole query.
    ///
    /// The query's own words come first, then the expansions of each word.
    pub fn expand_query(&self, query: &str) -> Vec<String> {
        let words: Vec<String> = query.unicode_words().map(normalize_term).collect();

        let mut expansion = Expansion::default();
        expansion.extend(&words);
        for word in &words {
            expansion.extend(&self.expand(word));
        }
        expansion.terms
    }
}

impl Default for SynonymExpander {
    fn default() -> Self {
        Self::spanish()
    }
}

/// Insertion-ordered set of terms.
#[derive(Default)]
struct Expansion {
    terms: Vec<String>,
    seen: AHashSet<String>,
}

impl Expansion {
    fn push(&mut self, term: &str) {
        if self.seen.insert(term.to_string()) {
            self.terms.push(term.to_string());
        }
    }

    fn extend(&mut self, terms: &[String]) {
        for term in terms {
            self.push(term);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contains(terms: &[String], term: &str) -> bool {
        terms.iter().any(|t| t == term)
    }

    #[test]
    fn test_expand_direct_and_reverse() {
        let expander = SynonymExpander::spanish();

        let terms = expander.expand("  Caballo ");
        assert_eq!(terms[0], "caballo");
        assert!(contains(&terms, "equino"));
        assert!(contains(&terms, "yegua"));

        // "caballos" is never a key, only a related term
        let terms = expander.expand("caballos");
        assert!(contains(&terms, "caballos"));
        assert!(contains(&terms, "caballo"));
        assert!(contains(&terms, "equino"));
    }

    #[test]
    fn test_expand_unknown_term_is_reflexive() {
        let expander = SynonymExpander::spanish();
        assert_eq!(expander.expand("computadora"), vec!["computadora".to_string()]);
        assert!(expander.direct("computadora").is_empty());
    }

    #[test]
    fn test_blank_term_expands_to_nothing() {
        let expander = SynonymExpander::spanish();
        assert!(expander.expand("").is_empty());
        assert!(expander.expand("   ").is_empty());
        assert!(expander.expand_query("  ").is_empty());
    }

    #[test]
    fn test_expansion_has_no_duplicates() {
        let expander = SynonymExpander::spanish();
        let terms = expander.expand("pescado");
        let unique: AHashSet<&String> = terms.iter().collect();
        assert_eq!(unique.len(), terms.len());
    }

    #[test]
    fn test_symmetry_over_table_pairs() {
        let expander = SynonymExpander::spanish();
        for (term, related) in expander.thesaurus().iter() {
            for other in related {
                assert!(contains(&expander.expand(term), other), "{term} -> {other}");
                assert!(contains(&expander.expand(other), term), "{other} -> {term}");
            }
        }
    }

    #[test]
    fn test_expand_query_is_word_level() {
        let expander = SynonymExpander::spanish();
        let terms = expander.expand_query("Trucha fresca");

        assert_eq!(terms[0], "trucha");
        assert_eq!(terms[1], "fresca");
        assert!(contains(&terms, "salmón"));
        assert!(contains(&terms, "pescado"));
        // Multi-word keys are not matched as phrases
        let terms = expander.expand_query("ganado vacuno");
        assert!(!contains(&terms, "vaca"));
    }
}
