//! End-to-end search scenarios over the fixture catalog.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use arancel::audit::{ActionKind, AuditSink, JsonlAuditSink, MemoryAuditSink, OutcomeKind};
use arancel::catalog::{CatalogSource, InMemoryCatalog, Level, Subheading, TariffEntry};
use arancel::config::ArancelConfig;
use arancel::error::Result;
use arancel::search::{
    ApproximateMatcher, ResultsPage, SearchConfig, SearchOrchestrator, SearchOutcome,
};
use arancel::spelling::{SpellingCorrector, sequence_ratio};
use arancel::synonym::SynonymExpander;
use tempfile::TempDir;

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/catalog.json")
}

/// Catalog wrapper counting every data access.
struct CountingCatalog {
    inner: InMemoryCatalog,
    calls: AtomicUsize,
}

impl CatalogSource for CountingCatalog {
    fn entries(&self, level: Level) -> Result<Vec<TariffEntry>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.entries(level)
    }

    fn subheadings_of(&self, heading_id: u32) -> Result<Vec<Subheading>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.subheadings_of(heading_id)
    }
}

struct Fixture {
    orchestrator: SearchOrchestrator,
    catalog: Arc<CountingCatalog>,
    audit: Arc<MemoryAuditSink>,
}

fn fixture() -> Fixture {
    let catalog = Arc::new(CountingCatalog {
        inner: InMemoryCatalog::load(fixture_path()).unwrap(),
        calls: AtomicUsize::new(0),
    });
    let audit = Arc::new(MemoryAuditSink::new());
    let matcher = ApproximateMatcher::new(
        catalog.clone(),
        SynonymExpander::spanish(),
        SearchConfig::default(),
    );
    let orchestrator = SearchOrchestrator::new(
        catalog.clone(),
        matcher,
        SpellingCorrector::new(),
        audit.clone(),
    );
    Fixture {
        orchestrator,
        catalog,
        audit,
    }
}

fn results(outcome: SearchOutcome) -> ResultsPage {
    match outcome {
        SearchOutcome::Results(page) => page,
        other => panic!("expected a results page, got {other:?}"),
    }
}

#[test]
fn test_exact_code_redirects_and_audits() -> Result<()> {
    let fixture = fixture();

    let outcome = fixture.orchestrator.search("ana", "0101.21.00.00")?;
    let SearchOutcome::Redirect(target) = outcome else {
        panic!("expected a redirect");
    };
    assert_eq!(target.level, Level::Subheading);
    assert_eq!(target.id, 2);
    assert_eq!(target.code.as_deref(), Some("0101.21.00.00"));

    let events = fixture.audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, OutcomeKind::Subheading);
    assert_eq!(events[0].action, ActionKind::Search);
    assert_eq!(events[0].user, "ana");
    Ok(())
}

#[test]
fn test_empty_query_touches_nothing() -> Result<()> {
    let fixture = fixture();

    assert_eq!(fixture.orchestrator.search("ana", "")?, SearchOutcome::Empty);
    assert_eq!(fixture.orchestrator.search("ana", "   ")?, SearchOutcome::Empty);
    assert!(fixture.orchestrator.complete("")?.is_empty());

    assert_eq!(fixture.catalog.calls.load(Ordering::SeqCst), 0);
    assert!(fixture.audit.is_empty());
    Ok(())
}

#[test]
fn test_synonym_results() -> Result<()> {
    let fixture = fixture();

    let page = results(fixture.orchestrator.search("ana", "caballo")?);
    assert!(!page.matches.is_empty());
    assert!(!page.synonym_terms.is_empty());
    assert!(page.synonym_terms.len() <= 5);
    assert!(page.synonym_terms.iter().all(|t| t != "caballo"));
    for candidate in &page.matches {
        assert!(candidate.is_synonym_match);
        assert!(candidate.score <= 0.75);
    }
    assert_eq!(page.matches[0].level, Level::Heading);
    assert_eq!(page.matches[0].id, 1);
    assert_eq!(page.outcome, OutcomeKind::Multiple);
    Ok(())
}

#[test]
fn test_misspelled_query_is_corrected() -> Result<()> {
    let fixture = fixture();

    let page = results(fixture.orchestrator.search("ana", "pescaddo")?);
    assert_eq!(page.corrected_query.as_deref(), Some("pescado"));
    assert!(
        page.corrections
            .iter()
            .any(|c| c.original == "pescaddo" && c.corrected == "pescado")
    );
    assert!(page.matches.iter().any(|c| c.level == Level::Heading && c.id == 3));
    assert!(page.matches.iter().all(|c| c.is_correction));

    let events = fixture.audit.events();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].outcome, OutcomeKind::Multiple);
    assert_eq!(events[0].result_count, page.result_count());
    Ok(())
}

#[test]
fn test_unknown_code_gets_code_suggestions() -> Result<()> {
    let fixture = fixture();

    let page = results(fixture.orchestrator.search("ana", "999999")?);
    assert!(page.matches.is_empty());
    assert!(!page.code_suggestions.is_empty());
    assert!(page.code_suggestions.len() <= 8);
    for candidate in &page.code_suggestions {
        let code = candidate.code.as_deref().unwrap();
        assert!(sequence_ratio("999999", code) > 0.35, "{code}");
        assert_eq!(candidate.score, 0.65);
        assert!(candidate.is_correction);
    }
    Ok(())
}

#[test]
fn test_direct_substring_results() -> Result<()> {
    let fixture = fixture();

    let page = results(fixture.orchestrator.search("ana", "raza pura")?);
    let keys: Vec<(Level, u32)> = page.matches.iter().map(|c| (c.level, c.id)).collect();
    assert!(keys.contains(&(Level::Subheading, 2)));
    assert!(keys.contains(&(Level::Subheading, 5)));
    assert!(page.corrected_query.is_none());
    assert!(page.synonym_terms.is_empty());

    let sementales = page.matches.iter().find(|c| c.id == 2).unwrap();
    assert_eq!(
        sementales.title_context.as_deref(),
        Some("- Reproductores de raza pura:")
    );
    Ok(())
}

#[test]
fn test_nothing_found() -> Result<()> {
    let fixture = fixture();

    let page = results(fixture.orchestrator.search("ana", "zzzz")?);
    assert_eq!(page.result_count(), 0);
    assert_eq!(page.outcome, OutcomeKind::NoResult);
    assert_eq!(fixture.audit.events()[0].outcome, OutcomeKind::NoResult);
    Ok(())
}

#[test]
fn test_ranked_candidates_are_unique_sorted_and_bounded() -> Result<()> {
    let fixture = fixture();

    for query in ["vivos", "0101", "pescado", "caballo", "café", "9", "semillas de cilantro"] {
        let ranked = fixture.orchestrator.complete(query)?;
        assert!(ranked.len() <= 12, "{query}");
        assert!(
            ranked.windows(2).all(|w| w[0].score >= w[1].score),
            "{query}"
        );
        assert!(
            ranked.iter().all(|c| (0.0..=1.0).contains(&c.score)),
            "{query}"
        );
        let mut keys: Vec<(Level, u32)> = ranked.iter().map(|c| c.key()).collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ranked.len(), "{query}");
    }
    Ok(())
}

#[test]
fn test_audit_trail_through_config() -> Result<()> {
    let dir = TempDir::new().unwrap();
    let audit_path = dir.path().join("audit.jsonl");
    let config = ArancelConfig {
        catalog_path: fixture_path(),
        audit_path: Some(audit_path.clone()),
        ..Default::default()
    };

    let orchestrator = config.orchestrator()?;
    orchestrator.search("ana", "0101.21.00.00")?;
    orchestrator.search("luis", "zzzz")?;

    let events = JsonlAuditSink::load(&audit_path)?;
    assert_eq!(events.len(), 2);
    assert_eq!(events[0].outcome, OutcomeKind::Subheading);
    assert_eq!(events[0].entity_id, Some(2));
    assert_eq!(events[1].outcome, OutcomeKind::NoResult);
    assert_eq!(config.audit_sink().history()?.len(), 2);
    Ok(())
}
