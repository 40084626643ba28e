//! Domain vocabulary extracted from catalog text.

use std::sync::Arc;

use ahash::AHashSet;
use lazy_static::lazy_static;
use parking_lot::RwLock;
use regex::Regex;

use crate::catalog::{CatalogSource, Level};
use crate::error::Result;

lazy_static! {
    /// Runs of at least three lowercase letters, Spanish accents included.
    static ref VOCABULARY_TOKEN: Regex = Regex::new(r"\b[a-záéíóúüñ]{3,}\b").unwrap();
}

/// Lowercase tokens of every catalog text field.
#[derive(Debug, Clone, Default)]
pub struct VocabularyIndex {
    tokens: AHashSet<String>,
    /// Same tokens, sorted, so closest-match lookups are deterministic
    sorted: Vec<String>,
    texts: Vec<String>,
}

impl VocabularyIndex {
    /// Build the index from raw text.
    pub fn from_texts(texts: Vec<String>) -> Self {
        let mut tokens = AHashSet::new();
        for text in &texts {
            let lowered = text.to_lowercase();
            for m in VOCABULARY_TOKEN.find_iter(&lowered) {
                tokens.insert(m.as_str().to_string());
            }
        }

        let mut sorted: Vec<String> = tokens.iter().cloned().collect();
        sorted.sort();

        VocabularyIndex {
            tokens,
            sorted,
            texts,
        }
    }

    /// Build the index from every text field of every level of a catalog.
    pub fn build(catalog: &dyn CatalogSource) -> Result<Self> {
        let mut texts = Vec::new();
        for level in Level::ALL {
            texts.extend(catalog.all_texts(level)?);
        }
        Ok(Self::from_texts(texts))
    }

    /// Whether `word` (any case) is a known token.
    pub fn contains(&self, word: &str) -> bool {
        self.tokens.contains(&word.to_lowercase())
    }

    /// Tokens in lexicographic order.
    pub fn tokens(&self) -> &[String] {
        &self.sorted
    }

    /// Raw texts the index was built from.
    pub fn texts(&self) -> &[String] {
        &self.texts
    }

    pub fn len(&self) -> usize {
        self.sorted.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sorted.is_empty()
    }
}

/// Lazily built, shared [`VocabularyIndex`].
///
/// The index is not refreshed when the catalog changes; callers that modify
/// catalog text must call [`invalidate`](VocabularyCache::invalidate).
/// Concurrent first callers may each build the index; the last one stored
/// wins and all builds are equivalent.
#[derive(Debug, Default)]
pub struct VocabularyCache {
    index: RwLock<Option<Arc<VocabularyIndex>>>,
}

impl VocabularyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The cached index, building it on first use.
    pub fn get_or_build(&self, catalog: &dyn CatalogSource) -> Result<Arc<VocabularyIndex>> {
        if let Some(index) = self.index.read().as_ref() {
            return Ok(Arc::clone(index));
        }
        self.build(catalog)
    }

    /// Rebuild the index unconditionally and cache it.
    pub fn build(&self, catalog: &dyn CatalogSource) -> Result<Arc<VocabularyIndex>> {
        let index = Arc::new(VocabularyIndex::build(catalog)?);
        log::info!(
            "Built vocabulary: {} tokens from {} texts",
            index.len(),
            index.texts().len()
        );
        *self.index.write() = Some(Arc::clone(&index));
        Ok(index)
    }

    /// Drop the cached index; the next lookup rebuilds it.
    pub fn invalidate(&self) {
        *self.index.write() = None;
    }

    pub fn is_built(&self) -> bool {
        self.index.read().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{CatalogSnapshot, Chapter, Heading, InMemoryCatalog, Section, Subheading};

    fn catalog() -> InMemoryCatalog {
        InMemoryCatalog::from_snapshot(CatalogSnapshot {
            sections: vec![Section {
                id: 1,
                name: "Animales vivos".to_string(),
                description: None,
            }],
            chapters: vec![Chapter {
                id: 1,
                section_id: 1,
                code: "03".to_string(),
                name: "Pescados y crustáceos".to_string(),
                description: None,
            }],
            headings: vec![Heading {
                id: 1,
                chapter_id: 1,
                code: "03.02".to_string(),
                description: "Pescado fresco o refrigerado".to_string(),
            }],
            subheadings: vec![Subheading::new(1, 1, "0302.11.00.00", "Truchas, de río")],
        })
        .unwrap()
    }

    #[test]
    fn test_token_extraction() {
        let index = VocabularyIndex::from_texts(vec![
            "Caballos, asnos y mulos; vivos.".to_string(),
            "Los demás: de 10 kg o más".to_string(),
            "Niño".to_string(),
        ]);

        assert!(index.contains("caballos"));
        assert!(index.contains("ASNOS"));
        assert!(index.contains("demás"));
        assert!(index.contains("niño"));
        assert!(index.contains("más"));
        // Too short
        assert!(!index.contains("de"));
        assert!(!index.contains("kg"));
        assert!(index.tokens().windows(2).all(|w| w[0] < w[1]));
        assert_eq!(index.texts().len(), 3);
    }

    #[test]
    fn test_build_from_catalog() {
        let index = VocabularyIndex::build(&catalog()).unwrap();
        assert!(index.contains("pescado"));
        assert!(index.contains("crustáceos"));
        assert!(index.contains("truchas"));
        assert!(index.contains("animales"));
    }

    #[test]
    fn test_cache_lifecycle() {
        let catalog = catalog();
        let cache = VocabularyCache::new();
        assert!(!cache.is_built());

        let first = cache.get_or_build(&catalog).unwrap();
        assert!(cache.is_built());
        let second = cache.get_or_build(&catalog).unwrap();
        assert!(Arc::ptr_eq(&first, &second));

        cache.invalidate();
        assert!(!cache.is_built());
        let rebuilt = cache.get_or_build(&catalog).unwrap();
        assert!(!Arc::ptr_eq(&first, &rebuilt));
        assert_eq!(first.len(), rebuilt.len());
    }
}
