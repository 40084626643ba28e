//! Tariff catalog data access.
//!
//! This module holds the read-only projection of the tariff hierarchy
//! (section → chapter → heading → subheading) that every search component
//! consumes, the code normalization rules, the [`CatalogSource`] query
//! contract and an in-memory implementation backed by a JSON snapshot.

pub mod code;
pub mod entry;
pub mod memory;
pub mod source;

// Re-export commonly used types
pub use code::*;
pub use entry::*;
pub use memory::*;
pub use source::*;
