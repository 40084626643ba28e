//! Catalog query contract consumed by the search core.
//!
//! Persistence lives elsewhere; the search components only need the read
//! operations below. Every method returns [`Result`] because a catalog that
//! cannot be reached is the one fault a search is allowed to propagate.

use crate::catalog::code::{code_key, is_descriptive_code};
use crate::catalog::entry::{Level, Searchable, Subheading, TariffEntry};
use crate::error::Result;

/// Read-only access to the tariff hierarchy.
///
/// Only [`entries`](CatalogSource::entries) and
/// [`subheadings_of`](CatalogSource::subheadings_of) are required; the
/// lookups have scan-based defaults that indexed stores can override.
pub trait CatalogSource: Send + Sync {
    /// Every entry of a level, in id order.
    fn entries(&self, level: Level) -> Result<Vec<TariffEntry>>;

    /// Subheadings belonging to a heading, in id order.
    fn subheadings_of(&self, heading_id: u32) -> Result<Vec<Subheading>>;

    /// Fetch one entry by id.
    fn get(&self, level: Level, id: u32) -> Result<Option<TariffEntry>> {
        Ok(self.entries(level)?.into_iter().find(|e| e.id() == id))
    }

    /// Entries whose code equals `code`, raw or normalized.
    fn find_by_code_exact(&self, level: Level, code: &str) -> Result<Vec<TariffEntry>> {
        let key = code_key(code);
        if key.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .entries(level)?
            .into_iter()
            .filter(|e| e.code().is_some_and(|c| code_key(c) == key))
            .collect())
    }

    /// Entries whose code starts with `prefix`, raw or normalized.
    fn find_by_code_prefix(&self, level: Level, prefix: &str) -> Result<Vec<TariffEntry>> {
        let raw = prefix.trim().to_lowercase();
        let key = code_key(prefix);
        if key.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .entries(level)?
            .into_iter()
            .filter(|e| {
                e.code().is_some_and(|c| {
                    c.trim().to_lowercase().starts_with(&raw) || code_key(c).starts_with(&key)
                })
            })
            .collect())
    }

    /// Entries with a text field equal to `text`, ignoring case.
    fn find_by_text_exact(&self, level: Level, text: &str) -> Result<Vec<TariffEntry>> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .entries(level)?
            .into_iter()
            .filter(|e| e.text_fields().iter().any(|f| f.trim().to_lowercase() == needle))
            .collect())
    }

    /// Entries with a text field starting with `prefix`, ignoring case.
    fn find_by_text_prefix(&self, level: Level, prefix: &str) -> Result<Vec<TariffEntry>> {
        let needle = prefix.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .entries(level)?
            .into_iter()
            .filter(|e| e.text_fields().iter().any(|f| f.to_lowercase().starts_with(&needle)))
            .collect())
    }

    /// Entries with a text field containing `fragment`, ignoring case.
    fn find_by_text_contains(&self, level: Level, fragment: &str) -> Result<Vec<TariffEntry>> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .entries(level)?
            .into_iter()
            .filter(|e| e.text_fields().iter().any(|f| f.to_lowercase().contains(&needle)))
            .collect())
    }

    /// Entries whose code or any text field contains `fragment`.
    fn find_containing(&self, level: Level, fragment: &str) -> Result<Vec<TariffEntry>> {
        let needle = fragment.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }
        Ok(self
            .entries(level)?
            .into_iter()
            .filter(|e| {
                e.code().is_some_and(|c| c.to_lowercase().contains(&needle))
                    || e.text_fields().iter().any(|f| f.to_lowercase().contains(&needle))
            })
            .collect())
    }

    /// `(id, code)` of every entry of a level that has a code.
    fn all_codes(&self, level: Level) -> Result<Vec<(u32, String)>> {
        Ok(self
            .entries(level)?
            .iter()
            .filter_map(|e| e.code().map(|c| (e.id(), c.to_string())))
            .collect())
    }

    /// Every text field of every entry of a level.
    fn all_texts(&self, level: Level) -> Result<Vec<String>> {
        Ok(self
            .entries(level)?
            .iter()
            .flat_map(|e| e.text_fields().into_iter().map(str::to_string).collect::<Vec<_>>())
            .collect())
    }

    /// Description of the nearest title row above a subheading.
    ///
    /// Walks the subheadings of the same heading with a smaller id, newest
    /// first, and returns the description of the first descriptive-coded one.
    fn title_context(&self, subheading: &Subheading) -> Result<Option<String>> {
        let siblings = self.subheadings_of(subheading.heading_id)?;
        Ok(siblings
            .iter()
            .rev()
            .filter(|s| s.id < subheading.id)
            .find(|s| is_descriptive_code(&s.code))
            .map(|s| s.description.clone()))
    }
}
