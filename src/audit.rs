//! Audit trail of searches, detail views and permit pre-validations.
//!
//! Events are written through the [`AuditSink`] trait; the crate ships an
//! in-memory sink, an append-only JSON-lines sink and a null sink.

pub mod event;
pub mod filter;
pub mod sink;

// Re-export commonly used types
pub use event::*;
pub use filter::*;
pub use sink::*;
