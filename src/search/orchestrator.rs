//! Search orchestration.
//!
//! A query goes through progressively looser tiers and stops at the first
//! one that produces something:
//!
//! 1. a single exact heading or subheading match redirects to it;
//! 2. a single exact chapter, then section, match redirects to it;
//! 3. substring hits on headings and subheadings;
//! 4. hits through synonyms of the query terms;
//! 5. hits for the spell-corrected query;
//! 6. code and description suggestions.
//!
//! Every redirect and every results page leaves one audit event.

use std::sync::Arc;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

use crate::audit::{ActionKind, AuditEvent, AuditSink, OutcomeKind};
use crate::catalog::{
    CatalogSource, Level, Searchable, TariffEntry, is_code_shaped, is_descriptive_code,
    looks_code_like, mentions_code,
};
use crate::error::Result;
use crate::search::candidate::{CandidateSet, ScoredCandidate};
use crate::search::config::SearchConfig;
use crate::search::matcher::ApproximateMatcher;
use crate::search::scorer::QueryScorer;
use crate::spelling::{SpellingCorrector, WordCorrection};

/// Levels searched for direct, synonym and corrected hits.
const DIRECT_LEVELS: [Level; 2] = [Level::Heading, Level::Subheading];

/// Where a search ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SearchOutcome {
    /// Blank query; nothing was searched.
    Empty,
    /// A single entity matched; navigate to it.
    Redirect(Resolution),
    /// Several or no entities matched.
    Results(ResultsPage),
}

/// Target of a redirect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Resolution {
    /// Level of the page to open.
    pub level: Level,
    pub id: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub text: String,
    /// Row to highlight on the opened page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub highlight: Option<u32>,
    /// Entity the query actually matched. Differs from the target when a
    /// title row was matched.
    pub matched_level: Level,
    pub matched_id: u32,
}

/// Results page content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsPage {
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corrected_query: Option<String>,
    #[serde(default)]
    pub corrections: Vec<WordCorrection>,
    pub matches: Vec<ScoredCandidate>,
    #[serde(default)]
    pub synonym_terms: Vec<String>,
    #[serde(default)]
    pub code_suggestions: Vec<ScoredCandidate>,
    #[serde(default)]
    pub description_suggestions: Vec<ScoredCandidate>,
    pub outcome: OutcomeKind,
}

impl ResultsPage {
    fn new(query: &str) -> Self {
        ResultsPage {
            query: query.to_string(),
            corrected_query: None,
            corrections: Vec::new(),
            matches: Vec::new(),
            synonym_terms: Vec::new(),
            code_suggestions: Vec::new(),
            description_suggestions: Vec::new(),
            outcome: OutcomeKind::NoResult,
        }
    }

    /// Matches plus suggestions.
    pub fn result_count(&self) -> usize {
        self.matches.len() + self.code_suggestions.len() + self.description_suggestions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.result_count() == 0
    }
}

/// Entry point of a search.
pub struct SearchOrchestrator {
    catalog: Arc<dyn CatalogSource>,
    matcher: ApproximateMatcher,
    corrector: SpellingCorrector,
    audit: Arc<dyn AuditSink>,
    config: SearchConfig,
}

impl SearchOrchestrator {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        matcher: ApproximateMatcher,
        corrector: SpellingCorrector,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        let config = matcher.config().clone();
        SearchOrchestrator {
            catalog,
            matcher,
            corrector,
            audit,
            config,
        }
    }

    pub fn matcher(&self) -> &ApproximateMatcher {
        &self.matcher
    }

    pub fn corrector(&self) -> &SpellingCorrector {
        &self.corrector
    }

    pub fn catalog(&self) -> &Arc<dyn CatalogSource> {
        &self.catalog
    }

    /// Run a search on behalf of `user`.
    ///
    /// Only catalog faults are returned as errors. Correction and audit
    /// failures are logged and the search continues.
    pub fn search(&self, user: &str, query: &str) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(SearchOutcome::Empty);
        }

        if let Some(entry) = self.resolve_exact(query)? {
            let resolution = self.resolution(&entry)?;
            log::debug!(
                "Query '{}' resolved to {} {}",
                query,
                entry.level().as_str(),
                entry.id()
            );
            self.record(
                AuditEvent::new(user, query, ActionKind::Search, entry.level().into())
                    .with_code(entry.code())
                    .with_description(entry.display_text())
                    .with_entity(entry.id())
                    .with_result_count(1),
            );
            return Ok(SearchOutcome::Redirect(resolution));
        }

        let page = self.results_page(query)?;
        log::debug!(
            "Query '{}' produced {} results ({})",
            query,
            page.result_count(),
            page.outcome.as_str()
        );
        self.record(
            AuditEvent::new(user, query, ActionKind::Search, page.outcome)
                .with_description(page.corrected_query.as_deref().unwrap_or(query))
                .with_result_count(page.result_count()),
        );
        Ok(SearchOutcome::Results(page))
    }

    /// Ranked candidates for type-ahead completion. Nothing is audited.
    pub fn complete(&self, query: &str) -> Result<Vec<ScoredCandidate>> {
        self.matcher.rank(query)
    }

    /// The single entity an exact query designates, if any.
    fn resolve_exact(&self, query: &str) -> Result<Option<TariffEntry>> {
        let mut specific = Vec::new();
        for level in DIRECT_LEVELS {
            specific.extend(self.exact_hits(level, query)?);
        }
        let chapters = self.exact_hits(Level::Chapter, query)?;
        let sections = self.exact_hits(Level::Section, query)?;

        if !specific.is_empty() {
            if specific.len() == 1 && chapters.is_empty() && sections.is_empty() {
                return Ok(specific.pop());
            }
            log::debug!("Ambiguous exact match for '{}': {} entries", query, specific.len());
            return Ok(None);
        }

        for tier in [chapters, sections] {
            match tier.len() {
                0 => continue,
                1 => return Ok(tier.into_iter().next()),
                n => {
                    log::debug!("Ambiguous exact match for '{}': {} entries", query, n);
                    return Ok(None);
                }
            }
        }
        Ok(None)
    }

    /// Entries of `level` whose code equals the query, raw or normalized,
    /// or whose main text equals it ignoring case.
    fn exact_hits(&self, level: Level, query: &str) -> Result<Vec<TariffEntry>> {
        let mut hits = self.catalog.find_by_code_exact(level, query)?;
        let needle = query.to_lowercase();
        hits.extend(
            self.catalog
                .find_by_text_exact(level, query)?
                .into_iter()
                .filter(|e| e.display_text().trim().to_lowercase() == needle),
        );

        let mut seen = AHashSet::new();
        hits.retain(|e| seen.insert(e.id()));
        Ok(hits)
    }

    /// Navigation target for a matched entity.
    ///
    /// A title row is not a page of its own: navigate to the nearest real
    /// subheading above it, or to its heading with the row highlighted.
    fn resolution(&self, entry: &TariffEntry) -> Result<Resolution> {
        let matched_level = entry.level();
        let matched_id = entry.id();

        if let Some(sub) = entry.as_subheading()
            && is_descriptive_code(&sub.code)
        {
            let siblings = self.catalog.subheadings_of(sub.heading_id)?;
            let previous = siblings
                .iter()
                .rev()
                .filter(|s| s.id < sub.id)
                .find(|s| !is_descriptive_code(&s.code));

            if let Some(target) = previous {
                return Ok(Resolution {
                    level: Level::Subheading,
                    id: target.id,
                    code: Some(target.code.clone()),
                    text: target.description.clone(),
                    highlight: None,
                    matched_level,
                    matched_id,
                });
            }

            if let Some(heading) = self.catalog.get(Level::Heading, sub.heading_id)? {
                return Ok(Resolution {
                    level: Level::Heading,
                    id: heading.id(),
                    code: heading.code().map(str::to_string),
                    text: heading.display_text().to_string(),
                    highlight: Some(sub.id),
                    matched_level,
                    matched_id,
                });
            }
            log::warn!("Subheading {} points to missing heading {}", sub.id, sub.heading_id);
        }

        Ok(Resolution {
            level: matched_level,
            id: matched_id,
            code: entry.code().map(str::to_string),
            text: entry.display_text().to_string(),
            highlight: None,
            matched_level,
            matched_id,
        })
    }

    fn results_page(&self, query: &str) -> Result<ResultsPage> {
        let mut page = ResultsPage::new(query);

        page.matches = self.direct_hits(query)?;
        if !page.matches.is_empty() {
            log::debug!("Direct hits for '{}'", query);
            return Ok(self.finish(page));
        }

        let synonym_hits = self.matcher.synonym_matches(query, &DIRECT_LEVELS)?;
        if !synonym_hits.is_empty() {
            log::debug!("Synonym hits for '{}'", query);
            page.matches = synonym_hits;
            page.synonym_terms = self
                .matcher
                .synonym_terms(query)
                .into_iter()
                .take(self.config.max_synonym_terms)
                .collect();
            return Ok(self.finish(page));
        }

        let correction = self.corrector.correct_or_original(query, self.catalog.as_ref());
        if correction.is_changed() {
            let corrected_hits: Vec<ScoredCandidate> = self
                .direct_hits(&correction.corrected)?
                .into_iter()
                .map(|c| c.with_correction(true))
                .collect();
            if !corrected_hits.is_empty() {
                log::debug!("Corrected '{}' to '{}'", query, correction.corrected);
                page.matches = corrected_hits;
                page.corrected_query = Some(correction.corrected);
                page.corrections = correction.corrections;
                return Ok(self.finish(page));
            }
        }

        // Any digit makes this a code query, even with words around it
        let code_query = mentions_code(query);
        if code_query {
            page.code_suggestions = self.matcher.code_suggestions(query)?;
            page.code_suggestions.truncate(self.config.max_code_suggestions);
        }
        if !code_query || page.code_suggestions.is_empty() {
            page.description_suggestions = self.matcher.description_suggestions(query)?;
            page.description_suggestions
                .truncate(self.config.max_description_suggestions);
        }
        log::debug!(
            "Suggestions for '{}': {} codes, {} descriptions",
            query,
            page.code_suggestions.len(),
            page.description_suggestions.len()
        );
        Ok(self.finish(page))
    }

    /// Heading and subheading entries containing the query, best first.
    fn direct_hits(&self, query: &str) -> Result<Vec<ScoredCandidate>> {
        let scorer = QueryScorer::new(query, looks_code_like(query), &self.config);
        let mut set = CandidateSet::new();
        for level in DIRECT_LEVELS {
            let mut entries = self.catalog.find_containing(level, query)?;
            if is_code_shaped(query) {
                entries.extend(self.catalog.find_by_code_prefix(level, query)?);
            }
            for entry in entries {
                let score = scorer.approximate_score(&entry);
                let title_context = match entry.as_subheading() {
                    Some(sub) => self.catalog.title_context(sub)?,
                    None => None,
                };
                set.insert(ScoredCandidate::new(&entry, score).with_title_context(title_context));
            }
        }
        Ok(set.into_ranked(usize::MAX))
    }

    fn finish(&self, mut page: ResultsPage) -> ResultsPage {
        page.outcome = if page.is_empty() {
            OutcomeKind::NoResult
        } else {
            OutcomeKind::Multiple
        };
        page
    }

    fn record(&self, event: AuditEvent) {
        if let Err(e) = self.audit.record(&event) {
            log::warn!("Failed to record audit event for '{}': {}", event.query, e);
        }
    }
}
