//! Audit event records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Level;

/// What the user did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    Search,
    DetailView,
    Prevalidation,
}

impl ActionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionKind::Search => "search",
            ActionKind::DetailView => "detail_view",
            ActionKind::Prevalidation => "prevalidation",
        }
    }
}

/// What the action ended on: one entity level, a results page, or nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Section,
    Chapter,
    Heading,
    Subheading,
    Multiple,
    #[serde(rename = "none")]
    NoResult,
}

impl OutcomeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutcomeKind::Section => "section",
            OutcomeKind::Chapter => "chapter",
            OutcomeKind::Heading => "heading",
            OutcomeKind::Subheading => "subheading",
            OutcomeKind::Multiple => "multiple",
            OutcomeKind::NoResult => "none",
        }
    }

    /// Parse the serialized name of an outcome.
    pub fn parse(value: &str) -> Option<Self> {
        let outcome = match value.trim().to_lowercase().as_str() {
            "section" => OutcomeKind::Section,
            "chapter" => OutcomeKind::Chapter,
            "heading" => OutcomeKind::Heading,
            "subheading" => OutcomeKind::Subheading,
            "multiple" => OutcomeKind::Multiple,
            "none" => OutcomeKind::NoResult,
            _ => return None,
        };
        Some(outcome)
    }
}

impl From<Level> for OutcomeKind {
    fn from(level: Level) -> Self {
        match level {
            Level::Section => OutcomeKind::Section,
            Level::Chapter => OutcomeKind::Chapter,
            Level::Heading => OutcomeKind::Heading,
            Level::Subheading => OutcomeKind::Subheading,
        }
    }
}

/// Maximum length, in characters, of a recorded description.
pub const MAX_DESCRIPTION_CHARS: usize = 500;

/// One audit trail record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub user: String,
    pub query: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default)]
    pub description: String,
    pub action: ActionKind,
    pub outcome: OutcomeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<u32>,
    #[serde(default)]
    pub result_count: usize,
}

impl AuditEvent {
    /// New event stamped with a fresh id and the current time.
    pub fn new(user: &str, query: &str, action: ActionKind, outcome: OutcomeKind) -> Self {
        AuditEvent {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            user: user.to_string(),
            query: query.to_string(),
            code: None,
            description: String::new(),
            action,
            outcome,
            entity_id: None,
            result_count: 0,
        }
    }

    pub fn with_code(mut self, code: Option<&str>) -> Self {
        self.code = code.filter(|c| !c.is_empty()).map(str::to_string);
        self
    }

    /// Set the description, cut to [`MAX_DESCRIPTION_CHARS`].
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.chars().take(MAX_DESCRIPTION_CHARS).collect();
        self
    }

    pub fn with_entity(mut self, entity_id: u32) -> Self {
        self.entity_id = Some(entity_id);
        self
    }

    pub fn with_result_count(mut self, result_count: usize) -> Self {
        self.result_count = result_count;
        self
    }

    pub fn with_timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = timestamp;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_level() {
        assert_eq!(OutcomeKind::from(Level::Subheading), OutcomeKind::Subheading);
        assert_eq!(OutcomeKind::from(Level::Section).as_str(), "section");
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&OutcomeKind::NoResult).unwrap();
        assert_eq!(json, "\"none\"");
        let json = serde_json::to_string(&ActionKind::DetailView).unwrap();
        assert_eq!(json, "\"detail_view\"");
        assert_eq!(OutcomeKind::parse(" Multiple "), Some(OutcomeKind::Multiple));
        assert_eq!(OutcomeKind::parse("partida"), None);
    }

    #[test]
    fn test_event_builders() {
        let long = "x".repeat(600);
        let event = AuditEvent::new("ana", "caballo", ActionKind::Search, OutcomeKind::Multiple)
            .with_code(Some(""))
            .with_description(&long)
            .with_result_count(3);

        assert!(event.code.is_none());
        assert_eq!(event.description.chars().count(), MAX_DESCRIPTION_CHARS);
        assert_eq!(event.result_count, 3);
        assert!(event.entity_id.is_none());
    }

    #[test]
    fn test_event_json_roundtrip() {
        let event = AuditEvent::new("ana", "0101", ActionKind::Search, OutcomeKind::Heading)
            .with_code(Some("01.01"))
            .with_entity(7);
        let json = serde_json::to_string(&event).unwrap();
        let back: AuditEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(back, event);
    }
}
