//! Catalog statistics: entry counts and duty rates per chapter.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::catalog::{CatalogSource, Level, TariffEntry};
use crate::error::Result;

/// Number of entries per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogCounts {
    pub sections: usize,
    pub chapters: usize,
    pub headings: usize,
    pub subheadings: usize,
}

impl CatalogCounts {
    pub fn collect(catalog: &dyn CatalogSource) -> Result<Self> {
        Ok(CatalogCounts {
            sections: catalog.entries(Level::Section)?.len(),
            chapters: catalog.entries(Level::Chapter)?.len(),
            headings: catalog.entries(Level::Heading)?.len(),
            subheadings: catalog.entries(Level::Subheading)?.len(),
        })
    }

    pub fn total(&self) -> usize {
        self.sections + self.chapters + self.headings + self.subheadings
    }
}

/// General duty (GA) figures of one chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateStatistics {
    pub chapter_id: u32,
    pub chapter_code: String,
    pub chapter_name: String,
    pub average_ga: f64,
    pub max_ga: f64,
    pub min_ga: f64,
    /// Subheadings with a GA value.
    pub count: usize,
}

impl RateStatistics {
    /// Per-chapter GA statistics, ordered by chapter code.
    ///
    /// Only subheadings with a GA value count; chapters without any are
    /// left out.
    pub fn collect(catalog: &dyn CatalogSource) -> Result<Vec<RateStatistics>> {
        let chapter_of_heading: AHashMap<u32, u32> = catalog
            .entries(Level::Heading)?
            .into_iter()
            .filter_map(|entry| match entry {
                TariffEntry::Heading(h) => Some((h.id, h.chapter_id)),
                _ => None,
            })
            .collect();

        let mut rates: AHashMap<u32, Vec<f64>> = AHashMap::new();
        for entry in catalog.entries(Level::Subheading)? {
            let TariffEntry::Subheading(sub) = entry else {
                continue;
            };
            let (Some(ga), Some(&chapter_id)) = (sub.ga, chapter_of_heading.get(&sub.heading_id))
            else {
                continue;
            };
            rates.entry(chapter_id).or_default().push(ga);
        }

        let mut stats: Vec<RateStatistics> = catalog
            .entries(Level::Chapter)?
            .into_iter()
            .filter_map(|entry| {
                let TariffEntry::Chapter(chapter) = entry else {
                    return None;
                };
                let values = rates.get(&chapter.id)?;
                let sum: f64 = values.iter().sum();
                Some(RateStatistics {
                    chapter_id: chapter.id,
                    chapter_code: chapter.code,
                    chapter_name: chapter.name,
                    average_ga: sum / values.len() as f64,
                    max_ga: values.iter().copied().fold(f64::MIN, f64::max),
                    min_ga: values.iter().copied().fold(f64::MAX, f64::min),
                    count: values.len(),
                })
            })
            .collect();
        stats.sort_by(|a, b| a.chapter_code.cmp(&b.chapter_code));
        Ok(stats)
    }
}
