//! Error types for the arancel library.
//!
//! All fallible catalog, configuration and audit operations return
//! [`ArancelError`]. Spelling correction has its own [`CorrectionError`]
//! because the search path never lets it escape: the orchestrator logs it
//! and continues with the uncorrected query.
//!
//! # Examples
//!
//! ```
//! use arancel::error::{ArancelError, Result};
//!
//! fn lookup() -> Result<()> {
//!     Err(ArancelError::not_found("0101.21.00.00"))
//! }
//!
//! match lookup() {
//!     Ok(_) => println!("found"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for arancel operations.
#[derive(Error, Debug)]
pub enum ArancelError {
    /// I/O errors (catalog snapshots, audit logs, config files)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Catalog data access failures. These are the only faults that
    /// propagate out of a search.
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// A tariff code that does not follow the digits-and-dots format
    #[error("Invalid tariff code: {0}")]
    InvalidCode(String),

    /// Entity not present in the catalog
    #[error("Not found: {0}")]
    NotFound(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Audit sink write or read failures
    #[error("Audit error: {0}")]
    Audit(String),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with ArancelError.
pub type Result<T> = std::result::Result<T, ArancelError>;

impl ArancelError {
    /// Create a new catalog error.
    pub fn catalog<S: Into<String>>(msg: S) -> Self {
        ArancelError::Catalog(msg.into())
    }

    /// Create a new invalid code error.
    pub fn invalid_code<S: Into<String>>(msg: S) -> Self {
        ArancelError::InvalidCode(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ArancelError::NotFound(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ArancelError::Config(msg.into())
    }

    /// Create a new audit error.
    pub fn audit<S: Into<String>>(msg: S) -> Self {
        ArancelError::Audit(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ArancelError::Other(msg.into())
    }
}

/// Faults raised while correcting a query.
///
/// Never surfaced to a searcher; see
/// [`SpellingCorrector::correct_or_original`](crate::spelling::SpellingCorrector::correct_or_original).
#[derive(Error, Debug)]
pub enum CorrectionError {
    /// The vocabulary could not be read from the catalog
    #[error("vocabulary unavailable: {0}")]
    Catalog(#[from] ArancelError),

    /// A token the corrector refuses to process
    #[error("malformed token: {0}")]
    Token(String),
}
