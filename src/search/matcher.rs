//! Approximate matcher: merges exact, approximate, synonym and suggested
//! candidates into one ranked list.

use std::sync::Arc;

use ahash::AHashSet;
use rayon::prelude::*;
use unicode_segmentation::UnicodeSegmentation;

use crate::catalog::{CatalogSource, Level, Searchable, TariffEntry, looks_code_like};
use crate::error::Result;
use crate::search::candidate::{CandidateSet, ScoredCandidate};
use crate::search::config::SearchConfig;
use crate::search::scorer::{QueryScorer, contains_word_prefix, exact_score};
use crate::spelling::{SequenceMatcher, get_close_matches, sequence_ratio};
use crate::synonym::SynonymExpander;

/// Levels searched for code suggestions, in pool order.
const CODE_SUGGESTION_LEVELS: [Level; 3] = [Level::Heading, Level::Subheading, Level::Chapter];

/// Levels searched for description suggestions, in pool order.
const DESCRIPTION_SUGGESTION_LEVELS: [Level; 4] =
    [Level::Heading, Level::Subheading, Level::Chapter, Level::Section];

/// Ranks catalog entries against a free-text or code query.
pub struct ApproximateMatcher {
    catalog: Arc<dyn CatalogSource>,
    expander: SynonymExpander,
    config: SearchConfig,
}

impl ApproximateMatcher {
    pub fn new(catalog: Arc<dyn CatalogSource>, expander: SynonymExpander, config: SearchConfig) -> Self {
        ApproximateMatcher {
            catalog,
            expander,
            config,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn expander(&self) -> &SynonymExpander {
        &self.expander
    }

    /// Ranked, deduplicated candidates for `query` across all levels.
    ///
    /// An empty query returns nothing without touching the catalog.
    pub fn rank(&self, query: &str) -> Result<Vec<ScoredCandidate>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let code_like = looks_code_like(query);
        let mut set = CandidateSet::new();

        let exact = self.exact_matches(query, code_like)?;
        let exact_keys: AHashSet<(Level, u32)> = exact.iter().map(ScoredCandidate::key).collect();
        set.extend(exact);

        set.extend(self.approximate_matches(query, code_like, &exact_keys)?);

        let threshold = self.config.approximate_threshold;
        set.extend(
            self.synonym_matches(query, &Level::ALL)?
                .into_iter()
                .filter(|c| c.score > threshold),
        );

        if set.len() < self.config.suggestion_trigger {
            if code_like {
                set.extend(self.code_suggestions(query)?);
            } else if set.is_empty() {
                set.extend(self.description_suggestions(query)?);
            }
        }

        log::debug!("Ranked {} candidates for '{}'", set.len(), query);
        Ok(set.into_ranked(self.config.max_candidates))
    }

    /// Exact and prefix hits on every level, with their fixed scores.
    pub fn exact_matches(&self, query: &str, code_like: bool) -> Result<Vec<ScoredCandidate>> {
        let mut candidates = Vec::new();
        for level in Level::ALL {
            let score = exact_score(level, code_like, &self.config);
            for entry in self.exact_entries(level, query)? {
                let is_correction = query != entry.primary_field();
                candidates.push(self.candidate(&entry, score)?.with_correction(is_correction));
            }
        }
        Ok(candidates)
    }

    fn exact_entries(&self, level: Level, query: &str) -> Result<Vec<TariffEntry>> {
        let query_lower = query.to_lowercase();
        let mut hits = Vec::new();

        if level != Level::Section {
            hits.extend(self.catalog.find_by_code_exact(level, query)?);
            hits.extend(self.catalog.find_by_code_prefix(level, query)?);
        }
        // Chapters match on code or name only; a section may also match on
        // its description
        hits.extend(
            self.catalog
                .find_by_text_exact(level, query)?
                .into_iter()
                .filter(|e| {
                    level != Level::Chapter || e.display_text().trim().to_lowercase() == query_lower
                }),
        );
        // Prefix matches only count on the main text (name or description)
        hits.extend(
            self.catalog
                .find_by_text_prefix(level, query)?
                .into_iter()
                .filter(|e| e.display_text().to_lowercase().starts_with(&query_lower)),
        );

        let mut seen = AHashSet::new();
        hits.retain(|e| seen.insert(e.id()));
        Ok(hits)
    }

    /// Substring hits not already matched exactly, scored by similarity.
    pub fn approximate_matches(
        &self,
        query: &str,
        code_like: bool,
        exclude: &AHashSet<(Level, u32)>,
    ) -> Result<Vec<ScoredCandidate>> {
        let mut candidates = Vec::new();
        for level in Level::ALL {
            // Sections have no code, so never score them as one
            let scorer = QueryScorer::new(query, code_like && level != Level::Section, &self.config);
            for entry in self.catalog.find_containing(level, query)? {
                if exclude.contains(&entry.key()) {
                    continue;
                }
                let score = scorer.approximate_score(&entry);
                if score > self.config.approximate_threshold {
                    candidates.push(self.candidate(&entry, score)?);
                }
            }
        }
        Ok(candidates)
    }

    /// Expanded terms of `query`, without the query's own words.
    pub fn synonym_terms(&self, query: &str) -> Vec<String> {
        let query_lower = query.trim().to_lowercase();
        let words: AHashSet<String> = query_lower.unicode_words().map(str::to_string).collect();

        self.expander
            .expand_query(query)
            .into_iter()
            .filter(|term| *term != query_lower && !words.contains(term))
            .collect()
    }

    /// Entries of `levels` that contain a synonym term at a word start.
    ///
    /// Scored with the approximate formula times the synonym factor; no
    /// threshold is applied here.
    pub fn synonym_matches(&self, query: &str, levels: &[Level]) -> Result<Vec<ScoredCandidate>> {
        let mut set = CandidateSet::new();
        for term in self.synonym_terms(query) {
            let code_like = looks_code_like(&term);
            for &level in levels {
                let scorer = QueryScorer::new(&term, code_like && level != Level::Section, &self.config);
                for entry in self.catalog.find_containing(level, &term)? {
                    let hit = entry
                        .text_fields()
                        .iter()
                        .any(|field| contains_word_prefix(field, &term));
                    if !hit {
                        continue;
                    }
                    let score = scorer.approximate_score(&entry) * self.config.synonym_factor;
                    set.insert(self.candidate(&entry, score)?.as_synonym_match());
                }
            }
        }
        Ok(set.into_ranked(usize::MAX))
    }

    /// Entries whose code is close to `query`.
    ///
    /// Takes the closest codes of chapters, headings and subheadings and
    /// keeps those whose similarity to the query exceeds the suggestion
    /// threshold. All get the same fixed score.
    pub fn code_suggestions(&self, query: &str) -> Result<Vec<ScoredCandidate>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }

        let mut pool: Vec<(Level, u32, String)> = Vec::new();
        for level in CODE_SUGGESTION_LEVELS {
            pool.extend(
                self.catalog
                    .all_codes(level)?
                    .into_iter()
                    .map(|(id, code)| (level, id, code)),
            );
        }

        let closest = get_close_matches(
            query,
            pool.iter().map(|(_, _, code)| code.as_str()),
            self.config.code_suggestion_pool,
            self.config.code_suggestion_cutoff,
        );

        let query_lower = query.to_lowercase();
        let mut seen_codes = AHashSet::new();
        let mut set = CandidateSet::new();
        for code in closest {
            if !seen_codes.insert(code.clone()) {
                continue;
            }
            if sequence_ratio(&query_lower, &code.to_lowercase()) <= self.config.suggestion_threshold {
                continue;
            }
            // First entry in pool order carrying that code
            let Some((level, id, _)) = pool.iter().find(|(_, _, c)| *c == code) else {
                continue;
            };
            if let Some(entry) = self.catalog.get(*level, *id)? {
                set.insert(
                    self.candidate(&entry, self.config.code_suggestion_score)?
                        .with_correction(true),
                );
            }
        }
        Ok(set.into_ranked(usize::MAX))
    }

    /// Entries whose name or description is similar to `query` as a whole.
    pub fn description_suggestions(&self, query: &str) -> Result<Vec<ScoredCandidate>> {
        let query_lower = query.trim().to_lowercase();
        if query_lower.is_empty() {
            return Ok(Vec::new());
        }

        let mut entries = Vec::new();
        for level in DESCRIPTION_SUGGESTION_LEVELS {
            entries.extend(self.catalog.entries(level)?);
        }

        let texts: Vec<(usize, String)> = entries
            .iter()
            .enumerate()
            .flat_map(|(idx, entry)| {
                entry
                    .text_fields()
                    .into_iter()
                    .filter(|t| !t.is_empty())
                    .map(move |t| (idx, t.to_lowercase()))
                    .collect::<Vec<_>>()
            })
            .collect();

        let threshold = self.config.suggestion_threshold;
        let similarity = |(idx, text): &(usize, String)| {
            let score = SequenceMatcher::new(text).ratio(&query_lower);
            (score > threshold).then_some((*idx, score))
        };
        let mut scored: Vec<(usize, f64)> = if texts.len() > self.config.parallel_threshold {
            texts.par_iter().filter_map(similarity).collect()
        } else {
            texts.iter().filter_map(similarity).collect()
        };
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut set = CandidateSet::new();
        for (idx, score) in scored {
            if set.len() >= self.config.max_description_suggestions {
                break;
            }
            let candidate = self
                .candidate(&entries[idx], score * self.config.description_suggestion_factor)?
                .with_correction(true);
            set.insert(candidate);
        }
        Ok(set.into_ranked(usize::MAX))
    }

    /// Candidate for an entry, with the title context of subheadings.
    fn candidate(&self, entry: &TariffEntry, score: f64) -> Result<ScoredCandidate> {
        let title_context = match entry.as_subheading() {
            Some(sub) => self.catalog.title_context(sub)?,
            None => None,
        };
        Ok(ScoredCandidate::new(entry, score).with_title_context(title_context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSnapshot, Chapter, Heading, InMemoryCatalog, Section, Subheading};

    fn matcher() -> ApproximateMatcher {
        let catalog = InMemoryCatalog::from_snapshot(CatalogSnapshot {
            sections: vec![Section {
                id: 1,
                name: "Animales vivos y productos del reino animal".to_string(),
                description: None,
            }],
            chapters: vec![
                Chapter {
                    id: 1,
                    section_id: 1,
                    code: "01".to_string(),
                    name: "Animales vivos".to_string(),
                    description: None,
                },
                Chapter {
                    id: 3,
                    section_id: 1,
                    code: "03".to_string(),
                    name: "Pescados y crustáceos".to_string(),
                    description: None,
                },
            ],
            headings: vec![
                Heading {
                    id: 1,
                    chapter_id: 1,
                    code: "01.01".to_string(),
                    description: "Equinos vivos".to_string(),
                },
                Heading {
                    id: 2,
                    chapter_id: 3,
                    code: "03.02".to_string(),
                    description: "Pescado fresco o refrigerado".to_string(),
                },
            ],
            subheadings: vec![
                Subheading::new(1, 1, "- Reproductores:", "- Reproductores:"),
                Subheading::new(2, 1, "0101.21.00.00", "De raza pura"),
                Subheading::new(3, 1, "0101.29.00.00", "Los demás"),
                Subheading::new(4, 2, "0302.11.00.00", "Truchas"),
            ],
        })
        .unwrap();
        ApproximateMatcher::new(
            Arc::new(catalog),
            SynonymExpander::spanish(),
            SearchConfig::default(),
        )
    }

    #[test]
    fn test_empty_query() {
        assert!(matcher().rank("   ").unwrap().is_empty());
    }

    #[test]
    fn test_exact_code_ranks_first() {
        let ranked = matcher().rank("0101.21.00.00").unwrap();
        let first = &ranked[0];
        assert_eq!(first.key(), (Level::Subheading, 2));
        assert_eq!(first.score, 0.90);
        assert!(!first.is_correction);
        assert_eq!(first.title_context.as_deref(), Some("- Reproductores:"));
    }

    #[test]
    fn test_section_prefix_hit() {
        let ranked = matcher().rank("animales").unwrap();
        let section = ranked.iter().find(|c| c.level == Level::Section).unwrap();
        assert_eq!(section.score, 1.0);
        // Case differs from the stored name
        assert!(section.is_correction);
    }

    #[test]
    fn test_ranking_invariants() {
        let matcher = matcher();
        for query in ["0101", "pescado", "vivos", "caballo", "9", "trucha fresca"] {
            let ranked = matcher.rank(query).unwrap();
            assert!(ranked.len() <= 12);
            assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score), "{query}");
            assert!(ranked.iter().all(|c| (0.0..=1.0).contains(&c.score)), "{query}");
            let keys: AHashSet<(Level, u32)> = ranked.iter().map(ScoredCandidate::key).collect();
            assert_eq!(keys.len(), ranked.len(), "{query}");
        }
    }

    #[test]
    fn test_synonym_matches_are_tagged_and_discounted() {
        let matcher = matcher();
        assert!(matcher.synonym_terms("caballo").contains(&"equino".to_string()));

        let hits = matcher
            .synonym_matches("caballo", &[Level::Heading, Level::Subheading])
            .unwrap();
        assert_eq!(hits[0].key(), (Level::Heading, 1));
        assert!(hits.iter().all(|c| c.is_synonym_match && c.score <= 0.75));
    }

    #[test]
    fn test_code_suggestions() {
        let suggestions = matcher().code_suggestions("0101.22").unwrap();
        assert!(!suggestions.is_empty());
        assert!(suggestions.len() <= 8);
        for candidate in &suggestions {
            assert_eq!(candidate.score, 0.65);
            assert!(candidate.is_correction);
            let code = candidate.code.as_deref().unwrap();
            assert!(sequence_ratio("0101.22", code) > 0.35);
        }
    }

    #[test]
    fn test_description_suggestions() {
        let suggestions = matcher().description_suggestions("pescado fresko").unwrap();
        // "pescados y crustáceos" edges out "pescado fresco o refrigerado"
        assert_eq!(suggestions[0].key(), (Level::Chapter, 3));
        let heading = suggestions
            .iter()
            .find(|c| c.key() == (Level::Heading, 2))
            .unwrap();
        assert!(suggestions[0].score > heading.score);
        assert!(suggestions.iter().all(|c| c.is_correction && c.score <= 0.8));
    }

    #[test]
    fn test_chapter_description_is_not_an_exact_hit() {
        let catalog = InMemoryCatalog::from_snapshot(CatalogSnapshot {
            chapters: vec![Chapter {
                id: 5,
                section_id: 1,
                code: "05".to_string(),
                name: "Peces".to_string(),
                description: Some("Peces vivos y frescos".to_string()),
            }],
            ..Default::default()
        })
        .unwrap();
        let matcher = ApproximateMatcher::new(
            Arc::new(catalog),
            SynonymExpander::spanish(),
            SearchConfig::default(),
        );

        let by_description = matcher.exact_matches("peces vivos y frescos", false).unwrap();
        assert!(by_description.iter().all(|c| c.level != Level::Chapter));

        let by_name = matcher.exact_matches("peces", false).unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].key(), (Level::Chapter, 5));
    }
}
