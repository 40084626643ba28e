//! In-memory catalog backed by a JSON snapshot.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::code::{code_key, is_descriptive_code};
use crate::catalog::entry::{Chapter, Heading, Level, Searchable, Section, Subheading, TariffEntry};
use crate::catalog::source::CatalogSource;
use crate::error::{ArancelError, Result};

/// Serialized form of the whole nomenclature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    #[serde(default)]
    pub headings: Vec<Heading>,
    #[serde(default)]
    pub subheadings: Vec<Subheading>,
}

impl CatalogSnapshot {
    /// Load a snapshot from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ArancelError::catalog(format!(
                "Failed to open catalog snapshot '{}': {}",
                path.display(),
                e
            ))
        })?;
        let snapshot = serde_json::from_reader(BufReader::new(file))?;
        Ok(snapshot)
    }

    /// Write the snapshot as pretty JSON.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self)?;
        Ok(())
    }
}

/// Catalog held entirely in memory with code and id indexes.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCatalog {
    snapshot: CatalogSnapshot,
    /// (level, code key) -> positions in the level's vector
    code_index: AHashMap<(Level, String), Vec<usize>>,
    /// (level, id) -> position in the level's vector
    id_index: AHashMap<(Level, u32), usize>,
    /// heading id -> subheading positions, ascending id
    children: AHashMap<u32, Vec<usize>>,
}

impl InMemoryCatalog {
    /// Build the indexes over a snapshot.
    ///
    /// Fails on duplicate ids within a level. Duplicate numeric codes are
    /// reported as warnings; descriptive pseudo-codes may repeat freely.
    pub fn from_snapshot(mut snapshot: CatalogSnapshot) -> Result<Self> {
        snapshot.sections.sort_by_key(|s| s.id);
        snapshot.chapters.sort_by_key(|c| c.id);
        snapshot.headings.sort_by_key(|h| h.id);
        snapshot.subheadings.sort_by_key(|s| s.id);

        let mut catalog = InMemoryCatalog {
            snapshot,
            ..Default::default()
        };
        catalog.rebuild_indexes()?;
        Ok(catalog)
    }

    /// Load and index a JSON snapshot file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::from_snapshot(CatalogSnapshot::load_from_file(path)?)
    }

    fn rebuild_indexes(&mut self) -> Result<()> {
        self.code_index.clear();
        self.id_index.clear();
        self.children.clear();

        for level in Level::ALL {
            let entries = self.level_entries(level);
            for (pos, entry) in entries.iter().enumerate() {
                if self.id_index.insert((level, entry.id()), pos).is_some() {
                    return Err(ArancelError::catalog(format!(
                        "duplicate {} id {}",
                        level.as_str(),
                        entry.id()
                    )));
                }

                if let Some(code) = entry.code() {
                    let key = code_key(code);
                    if key.is_empty() {
                        continue;
                    }
                    let slot = self.code_index.entry((level, key)).or_default();
                    if !slot.is_empty() && !is_descriptive_code(code) {
                        log::warn!("duplicate {} code '{}'", level.as_str(), code);
                    }
                    slot.push(pos);
                }
            }
        }

        for (pos, sub) in self.snapshot.subheadings.iter().enumerate() {
            self.children.entry(sub.heading_id).or_default().push(pos);
        }

        Ok(())
    }

    fn level_entries(&self, level: Level) -> Vec<TariffEntry> {
        match level {
            Level::Section => self.snapshot.sections.iter().cloned().map(Into::into).collect(),
            Level::Chapter => self.snapshot.chapters.iter().cloned().map(Into::into).collect(),
            Level::Heading => self.snapshot.headings.iter().cloned().map(Into::into).collect(),
            Level::Subheading => self
                .snapshot
                .subheadings
                .iter()
                .cloned()
                .map(Into::into)
                .collect(),
        }
    }

    fn entry_at(&self, level: Level, pos: usize) -> Option<TariffEntry> {
        match level {
            Level::Section => self.snapshot.sections.get(pos).cloned().map(Into::into),
            Level::Chapter => self.snapshot.chapters.get(pos).cloned().map(Into::into),
            Level::Heading => self.snapshot.headings.get(pos).cloned().map(Into::into),
            Level::Subheading => self.snapshot.subheadings.get(pos).cloned().map(Into::into),
        }
    }

    /// The underlying snapshot.
    pub fn snapshot(&self) -> &CatalogSnapshot {
        &self.snapshot
    }

    /// Number of entries at a level.
    pub fn len(&self, level: Level) -> usize {
        match level {
            Level::Section => self.snapshot.sections.len(),
            Level::Chapter => self.snapshot.chapters.len(),
            Level::Heading => self.snapshot.headings.len(),
            Level::Subheading => self.snapshot.subheadings.len(),
        }
    }

    /// Whether the catalog holds no entries at all.
    pub fn is_empty(&self) -> bool {
        Level::ALL.iter().all(|level| self.len(*level) == 0)
    }

    /// Subheadings whose code collides with a heading code.
    ///
    /// Such rows are imports of the heading line itself and are removed by
    /// the catalog cleanup job; this only reports them.
    pub fn find_heading_shadows(&self) -> Vec<&Subheading> {
        let heading_codes: ahash::AHashSet<String> = self
            .snapshot
            .headings
            .iter()
            .map(|h| code_key(&h.code))
            .filter(|key| !key.is_empty())
            .collect();

        self.snapshot
            .subheadings
            .iter()
            .filter(|s| heading_codes.contains(&code_key(&s.code)))
            .collect()
    }
}

impl CatalogSource for InMemoryCatalog {
    fn entries(&self, level: Level) -> Result<Vec<TariffEntry>> {
        Ok(self.level_entries(level))
    }

    fn subheadings_of(&self, heading_id: u32) -> Result<Vec<Subheading>> {
        Ok(self
            .children
            .get(&heading_id)
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&pos| self.snapshot.subheadings.get(pos).cloned())
                    .collect()
            })
            .unwrap_or_default())
    }

    fn get(&self, level: Level, id: u32) -> Result<Option<TariffEntry>> {
        Ok(self
            .id_index
            .get(&(level, id))
            .and_then(|&pos| self.entry_at(level, pos)))
    }

    fn find_by_code_exact(&self, level: Level, code: &str) -> Result<Vec<TariffEntry>> {
        Ok(self
            .code_index
            .get(&(level, code_key(code)))
            .map(|positions| {
                positions
                    .iter()
                    .filter_map(|&pos| self.entry_at(level, pos))
                    .collect()
            })
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn sample() -> CatalogSnapshot {
        CatalogSnapshot {
            sections: vec![Section {
                id: 1,
                name: "Animales vivos y productos del reino animal".to_string(),
                description: None,
            }],
            chapters: vec![Chapter {
                id: 1,
                section_id: 1,
                code: "01".to_string(),
                name: "Animales vivos".to_string(),
                description: None,
            }],
            headings: vec![Heading {
                id: 1,
                chapter_id: 1,
                code: "01.01".to_string(),
                description: "Caballos, asnos, mulos y burdéganos, vivos.".to_string(),
            }],
            subheadings: vec![
                Subheading::new(3, 1, "0101.21.00.00", "Reproductores de raza pura"),
                Subheading::new(2, 1, "- Caballos:", "- Caballos:"),
                Subheading::new(4, 1, "01.01", "Caballos, asnos, mulos y burdéganos, vivos."),
            ],
        }
    }

    #[test]
    fn test_exact_code_lookup_uses_normalized_form() {
        let catalog = InMemoryCatalog::from_snapshot(sample()).unwrap();

        let hits = catalog
            .find_by_code_exact(Level::Subheading, "0101210000")
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id(), 3);

        let hits = catalog
            .find_by_code_exact(Level::Subheading, "0101.21.00.00")
            .unwrap();
        assert_eq!(hits.len(), 1);

        assert!(
            catalog
                .find_by_code_exact(Level::Subheading, "0101.22")
                .unwrap()
                .is_empty()
        );
    }

    #[test]
    fn test_subheadings_are_ordered_by_id() {
        let catalog = InMemoryCatalog::from_snapshot(sample()).unwrap();
        let ids: Vec<u32> = catalog
            .subheadings_of(1)
            .unwrap()
            .iter()
            .map(|s| s.id)
            .collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_title_context() {
        let catalog = InMemoryCatalog::from_snapshot(sample()).unwrap();
        let sub = Subheading::new(3, 1, "0101.21.00.00", "Reproductores de raza pura");
        assert_eq!(
            catalog.title_context(&sub).unwrap().as_deref(),
            Some("- Caballos:")
        );
    }

    #[test]
    fn test_duplicate_id_is_rejected() {
        let mut snapshot = sample();
        snapshot
            .subheadings
            .push(Subheading::new(3, 1, "0101.29.00.00", "Los demás"));
        assert!(InMemoryCatalog::from_snapshot(snapshot).is_err());
    }

    #[test]
    fn test_heading_shadows() {
        let catalog = InMemoryCatalog::from_snapshot(sample()).unwrap();
        let shadows = catalog.find_heading_shadows();
        assert_eq!(shadows.len(), 1);
        assert_eq!(shadows[0].id, 4);
    }

    #[test]
    fn test_heading_shadows_compare_normalized_codes() {
        let mut snapshot = sample();
        snapshot
            .subheadings
            .push(Subheading::new(5, 1, "0101", "Caballos vivos"));
        snapshot
            .subheadings
            .push(Subheading::new(6, 1, "01 01", "Caballos vivos"));
        let catalog = InMemoryCatalog::from_snapshot(snapshot).unwrap();

        let ids: Vec<u32> = catalog.find_heading_shadows().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![4, 5, 6]);
    }

    #[test]
    fn test_text_lookups() {
        let catalog = InMemoryCatalog::from_snapshot(sample()).unwrap();

        let exact = catalog
            .find_by_text_exact(Level::Chapter, "ANIMALES VIVOS")
            .unwrap();
        assert_eq!(exact.len(), 1);

        let prefix = catalog.find_by_text_prefix(Level::Section, "animales").unwrap();
        assert_eq!(prefix.len(), 1);

        let contains = catalog
            .find_containing(Level::Subheading, "raza")
            .unwrap();
        assert_eq!(contains.len(), 1);
        assert_eq!(contains[0].id(), 3);
    }

    #[test]
    fn test_snapshot_file_round_trip() {
        let file = NamedTempFile::new().unwrap();
        sample().save_to_file(file.path()).unwrap();

        let catalog = InMemoryCatalog::load(file.path()).unwrap();
        assert_eq!(catalog.len(Level::Subheading), 3);
        assert_eq!(catalog.len(Level::Chapter), 1);
        assert!(!catalog.is_empty());
    }
}
