//! Synonym expansion for product queries.
//!
//! Users search for "caballo" while the nomenclature says "equinos", or for
//! "res" while it says "bovinos". The [`Thesaurus`] maps canonical terms to
//! related terms, and the [`SynonymExpander`] looks them up in both
//! directions.

pub mod expander;
pub mod thesaurus;

// Re-export commonly used types
pub use expander::*;
pub use thesaurus::*;
