//! # Arancel
//!
//! Search and classification assistance over a customs tariff nomenclature
//! (section → chapter → heading → subheading).
//!
//! ## Features
//!
//! - Exact, prefix and substring matching on codes and descriptions
//! - Code normalization (`0101.21.00.00` and `0101210000` are the same code)
//! - Bidirectional synonym expansion
//! - Spelling correction against the catalog vocabulary
//! - Similarity ranking with edit distance and sequence ratio
//! - Code and description suggestions when nothing matches
//! - Import permit pre-validation and an audit trail
//!
//! ## Example
//!
//! ```no_run
//! use arancel::config::ArancelConfig;
//! use arancel::search::SearchOutcome;
//!
//! let orchestrator = ArancelConfig::default().orchestrator()?;
//! match orchestrator.search("ana", "caballo")? {
//!     SearchOutcome::Redirect(target) => println!("{} {}", target.level, target.id),
//!     SearchOutcome::Results(page) => println!("{} results", page.result_count()),
//!     SearchOutcome::Empty => {}
//! }
//! # Ok::<(), arancel::error::ArancelError>(())
//! ```

pub mod audit;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod error;
pub mod permits;
pub mod search;
pub mod spelling;
pub mod stats;
pub mod synonym;

pub mod prelude {
    pub use crate::audit::{AuditEvent, AuditSink, HistoryFilter, JsonlAuditSink, MemoryAuditSink};
    pub use crate::catalog::{CatalogSource, InMemoryCatalog, Level, Searchable, TariffEntry};
    pub use crate::config::ArancelConfig;
    pub use crate::error::{ArancelError, Result};
    pub use crate::search::{ApproximateMatcher, ScoredCandidate, SearchOrchestrator, SearchOutcome};
    pub use crate::spelling::SpellingCorrector;
    pub use crate::synonym::SynonymExpander;
}

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
