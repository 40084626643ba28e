//! Tariff search: scoring, candidate ranking and the search state machine.
//!
//! [`ApproximateMatcher::rank`] produces one ranked list for type-ahead use.
//! [`SearchOrchestrator::search`] decides between a redirect to a single
//! entity and a results page, falling back from direct hits to synonyms,
//! spelling correction and finally suggestions.

pub mod candidate;
pub mod config;
pub mod matcher;
pub mod orchestrator;
pub mod scorer;

// Re-export commonly used types
pub use candidate::*;
pub use config::*;
pub use matcher::*;
pub use orchestrator::*;
pub use scorer::*;
