//! Spelling correction for tariff queries.
//!
//! This module provides the string similarity measures used across the
//! search core (edit distance and sequence ratio), the domain vocabulary
//! cache, a general-language frequency dictionary, and the corrector that
//! combines them.

pub mod corrector;
pub mod dictionary;
pub mod levenshtein;
pub mod sequence;
pub mod vocabulary;

// Re-export commonly used types
pub use corrector::*;
pub use dictionary::*;
pub use levenshtein::*;
pub use sequence::*;
pub use vocabulary::*;
