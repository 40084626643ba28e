//! Tariff hierarchy records.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::code::is_descriptive_code;

/// Hierarchy level, from most general to most specific.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Section,
    Chapter,
    Heading,
    Subheading,
}

impl Level {
    /// All levels in hierarchy order.
    pub const ALL: [Level; 4] = [
        Level::Section,
        Level::Chapter,
        Level::Heading,
        Level::Subheading,
    ];

    /// Stable identifier used in logs, audit records and JSON output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Section => "section",
            Level::Chapter => "chapter",
            Level::Heading => "heading",
            Level::Subheading => "subheading",
        }
    }

    /// Label shown to users of the nomenclature.
    pub fn label(&self) -> &'static str {
        match self {
            Level::Section => "Sección",
            Level::Chapter => "Capítulo",
            Level::Heading => "Partida",
            Level::Subheading => "Subpartida",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Section of the nomenclature. Sections have a name but no code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: u32,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Two-digit chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: u32,
    pub section_id: u32,
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Four-digit heading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Heading {
    pub id: u32,
    pub chapter_id: u32,
    pub code: String,
    pub description: String,
}

/// Processing state of an import requirement.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementStatus {
    Pendiente,
    EnProceso,
    Completado,
    #[default]
    NoAplica,
}

/// One import requirement (permit, license or quota) of a subheading.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub entity: Option<String>,
    #[serde(default)]
    pub status: RequirementStatus,
}

/// National subheading: the level that carries duties and import requirements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subheading {
    pub id: u32,
    pub heading_id: u32,
    pub code: String,
    pub description: String,
    /// General ad-valorem duty (GA %)
    #[serde(default)]
    pub ga: Option<f64>,
    #[serde(default)]
    pub ice_iehd: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub border_clearance: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub issuing_authority: Option<String>,
    #[serde(default)]
    pub legal_provision: Option<String>,
    #[serde(default)]
    pub permit: Requirement,
    #[serde(default)]
    pub license: Requirement,
    #[serde(default)]
    pub quota: Requirement,
    #[serde(default)]
    pub validation_instructions: Option<String>,
    #[serde(default)]
    pub valid_from: Option<NaiveDate>,
    #[serde(default)]
    pub valid_to: Option<NaiveDate>,
}

impl Subheading {
    /// Minimal subheading with no duties or requirements.
    pub fn new(id: u32, heading_id: u32, code: &str, description: &str) -> Self {
        Subheading {
            id,
            heading_id,
            code: code.to_string(),
            description: description.to_string(),
            ga: None,
            ice_iehd: None,
            unit: None,
            border_clearance: None,
            document_type: None,
            issuing_authority: None,
            legal_provision: None,
            permit: Requirement::default(),
            license: Requirement::default(),
            quota: Requirement::default(),
            validation_instructions: None,
            valid_from: None,
            valid_to: None,
        }
    }

    /// Whether the row is a title placeholder rather than a real subheading.
    pub fn is_descriptive(&self) -> bool {
        is_descriptive_code(&self.code)
    }

    /// Whether the subheading is in force on `today`.
    ///
    /// A missing bound is open in that direction; with no bounds at all
    /// the subheading is not considered in force.
    pub fn is_in_force(&self, today: NaiveDate) -> bool {
        match (self.valid_from, self.valid_to) {
            (Some(from), Some(to)) => from <= today && today <= to,
            (Some(from), None) => from <= today,
            (None, Some(to)) => today <= to,
            (None, None) => false,
        }
    }
}

/// Capability shared by every hierarchy level.
pub trait Searchable {
    fn level(&self) -> Level;

    fn id(&self) -> u32;

    /// Tariff code, if the level has one.
    fn code(&self) -> Option<&str>;

    /// Free-text fields compared against queries.
    fn text_fields(&self) -> Vec<&str>;

    /// Main human-readable text.
    fn display_text(&self) -> &str;

    /// Field a query is compared to when judging whether an exact hit was
    /// typed verbatim: the code, or the name for code-less levels.
    fn primary_field(&self) -> &str {
        self.code().unwrap_or_else(|| self.display_text())
    }
}

impl Searchable for Section {
    fn level(&self) -> Level {
        Level::Section
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn code(&self) -> Option<&str> {
        None
    }

    fn text_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        if let Some(description) = self.description.as_deref() {
            fields.push(description);
        }
        fields
    }

    fn display_text(&self) -> &str {
        &self.name
    }
}

impl Searchable for Chapter {
    fn level(&self) -> Level {
        Level::Chapter
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn code(&self) -> Option<&str> {
        Some(&self.code)
    }

    fn text_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.name.as_str()];
        if let Some(description) = self.description.as_deref() {
            fields.push(description);
        }
        fields
    }

    fn display_text(&self) -> &str {
        &self.name
    }
}

impl Searchable for Heading {
    fn level(&self) -> Level {
        Level::Heading
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn code(&self) -> Option<&str> {
        Some(&self.code)
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.description.as_str()]
    }

    fn display_text(&self) -> &str {
        &self.description
    }
}

impl Searchable for Subheading {
    fn level(&self) -> Level {
        Level::Subheading
    }

    fn id(&self) -> u32 {
        self.id
    }

    fn code(&self) -> Option<&str> {
        Some(&self.code)
    }

    fn text_fields(&self) -> Vec<&str> {
        vec![self.description.as_str()]
    }

    fn display_text(&self) -> &str {
        &self.description
    }
}

/// Any record of the hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum TariffEntry {
    Section(Section),
    Chapter(Chapter),
    Heading(Heading),
    Subheading(Subheading),
}

impl TariffEntry {
    fn inner(&self) -> &dyn Searchable {
        match self {
            TariffEntry::Section(s) => s,
            TariffEntry::Chapter(c) => c,
            TariffEntry::Heading(h) => h,
            TariffEntry::Subheading(s) => s,
        }
    }

    /// Deduplication key.
    pub fn key(&self) -> (Level, u32) {
        (self.level(), self.id())
    }

    pub fn as_subheading(&self) -> Option<&Subheading> {
        match self {
            TariffEntry::Subheading(s) => Some(s),
            _ => None,
        }
    }
}

impl Searchable for TariffEntry {
    fn level(&self) -> Level {
        self.inner().level()
    }

    fn id(&self) -> u32 {
        self.inner().id()
    }

    fn code(&self) -> Option<&str> {
        self.inner().code()
    }

    fn text_fields(&self) -> Vec<&str> {
        self.inner().text_fields()
    }

    fn display_text(&self) -> &str {
        self.inner().display_text()
    }
}

impl From<Section> for TariffEntry {
    fn from(value: Section) -> Self {
        TariffEntry::Section(value)
    }
}

impl From<Chapter> for TariffEntry {
    fn from(value: Chapter) -> Self {
        TariffEntry::Chapter(value)
    }
}

impl From<Heading> for TariffEntry {
    fn from(value: Heading) -> Self {
        TariffEntry::Heading(value)
    }
}

impl From<Subheading> for TariffEntry {
    fn from(value: Subheading) -> Self {
        TariffEntry::Subheading(value)
    }
}
