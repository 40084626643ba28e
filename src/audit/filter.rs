//! Audit history filtering.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::audit::event::{AuditEvent, OutcomeKind};

/// Criteria for browsing the audit trail. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HistoryFilter {
    /// First day included (UTC).
    pub from: Option<NaiveDate>,
    /// Last day included (UTC).
    pub to: Option<NaiveDate>,
    pub outcome: Option<OutcomeKind>,
    /// Case-insensitive fragment of the query or the user name.
    pub keyword: Option<String>,
    /// Exact user name.
    pub user: Option<String>,
}

impl HistoryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from(mut self, date: NaiveDate) -> Self {
        self.from = Some(date);
        self
    }

    pub fn to(mut self, date: NaiveDate) -> Self {
        self.to = Some(date);
        self
    }

    pub fn outcome(mut self, outcome: OutcomeKind) -> Self {
        self.outcome = Some(outcome);
        self
    }

    pub fn keyword<S: Into<String>>(mut self, keyword: S) -> Self {
        self.keyword = Some(keyword.into());
        self
    }

    pub fn user<S: Into<String>>(mut self, user: S) -> Self {
        self.user = Some(user.into());
        self
    }

    pub fn matches(&self, event: &AuditEvent) -> bool {
        let day = event.timestamp.date_naive();
        if self.from.is_some_and(|from| day < from) || self.to.is_some_and(|to| day > to) {
            return false;
        }
        if self.outcome.is_some_and(|outcome| event.outcome != outcome) {
            return false;
        }
        if let Some(user) = &self.user
            && event.user != *user
        {
            return false;
        }
        if let Some(keyword) = &self.keyword {
            let keyword = keyword.trim().to_lowercase();
            if !keyword.is_empty()
                && !event.query.to_lowercase().contains(&keyword)
                && !event.user.to_lowercase().contains(&keyword)
            {
                return false;
            }
        }
        true
    }

    /// Matching events, newest first.
    pub fn apply(&self, events: Vec<AuditEvent>) -> Vec<AuditEvent> {
        let mut matching: Vec<AuditEvent> = events.into_iter().filter(|e| self.matches(e)).collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching
    }
}
