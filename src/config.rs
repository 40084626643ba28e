//! Application configuration.
//!
//! Everything is optional except the catalog snapshot path. A missing
//! synonyms or dictionary file falls back to the built-in Spanish data, a
//! missing audit path disables the audit trail.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::audit::{AuditSink, JsonlAuditSink, NullAuditSink};
use crate::catalog::InMemoryCatalog;
use crate::error::{ArancelError, Result};
use crate::search::{ApproximateMatcher, SearchConfig, SearchOrchestrator};
use crate::spelling::{BuiltinDictionary, CorrectorConfig, SpellingCorrector, SpellingDictionary};
use crate::synonym::{SynonymExpander, Thesaurus};

/// Default catalog snapshot location.
pub const DEFAULT_CATALOG_PATH: &str = "catalog.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArancelConfig {
    /// JSON catalog snapshot.
    pub catalog_path: PathBuf,
    /// JSON thesaurus (`{"term": ["related", ...]}`).
    pub synonyms_path: Option<PathBuf>,
    /// Word frequency list, one `word frequency` pair per line.
    pub dictionary_path: Option<PathBuf>,
    /// JSON-lines audit log.
    pub audit_path: Option<PathBuf>,
    pub search: SearchConfig,
    pub corrector: CorrectorConfig,
}

impl Default for ArancelConfig {
    fn default() -> Self {
        ArancelConfig {
            catalog_path: PathBuf::from(DEFAULT_CATALOG_PATH),
            synonyms_path: None,
            dictionary_path: None,
            audit_path: None,
            search: SearchConfig::default(),
            corrector: CorrectorConfig::default(),
        }
    }
}

impl ArancelConfig {
    /// Load a configuration file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ArancelError::config(format!("Failed to open config '{}': {}", path.display(), e))
        })?;
        serde_json::from_reader(BufReader::new(file))
            .map_err(|e| ArancelError::config(format!("Invalid config '{}': {}", path.display(), e)))
    }

    /// Write the configuration as pretty JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load_catalog(&self) -> Result<InMemoryCatalog> {
        InMemoryCatalog::load(&self.catalog_path)
    }

    pub fn thesaurus(&self) -> Result<Arc<Thesaurus>> {
        match &self.synonyms_path {
            Some(path) => Ok(Arc::new(Thesaurus::load_from_file(path)?)),
            None => Ok(Thesaurus::spanish()),
        }
    }

    pub fn dictionary(&self) -> Result<SpellingDictionary> {
        let dictionary = match &self.dictionary_path {
            Some(path) => SpellingDictionary::load_from_frequency_file(path)?,
            None => BuiltinDictionary::spanish(),
        };
        log::debug!("Spelling dictionary holds {} words", dictionary.word_count());
        Ok(dictionary)
    }

    pub fn audit_sink(&self) -> Arc<dyn AuditSink> {
        match &self.audit_path {
            Some(path) => Arc::new(JsonlAuditSink::new(path)),
            None => Arc::new(NullAuditSink),
        }
    }

    pub fn corrector(&self) -> Result<SpellingCorrector> {
        Ok(SpellingCorrector::with_config(
            self.dictionary()?,
            self.corrector.clone(),
        ))
    }

    /// Wire a search orchestrator over the configured catalog and sinks.
    pub fn orchestrator(&self) -> Result<SearchOrchestrator> {
        let catalog = Arc::new(self.load_catalog()?);
        let matcher = ApproximateMatcher::new(
            catalog.clone(),
            SynonymExpander::new(self.thesaurus()?),
            self.search.clone(),
        );
        Ok(SearchOrchestrator::new(
            catalog,
            matcher,
            self.corrector()?,
            self.audit_sink(),
        ))
    }
}
