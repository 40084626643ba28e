//! Import permit pre-validation.
//!
//! Answers "what do I need to import this?" for one subheading code and
//! leaves a `prevalidation` event in the audit trail.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::audit::{ActionKind, AuditEvent, AuditSink, OutcomeKind};
use crate::catalog::{CatalogSource, Level, Requirement, Subheading};
use crate::error::{ArancelError, Result};

/// Import requirements of one subheading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermitRequirements {
    pub subheading_id: u32,
    pub code: String,
    pub description: String,
    pub permit: Requirement,
    pub license: Requirement,
    pub quota: Requirement,
    pub validation_instructions: Option<String>,
    pub document_type: Option<String>,
    pub issuing_authority: Option<String>,
    pub legal_provision: Option<String>,
    pub in_force: bool,
}

impl PermitRequirements {
    fn from_subheading(subheading: Subheading, today: NaiveDate) -> Self {
        let in_force = subheading.is_in_force(today);
        PermitRequirements {
            subheading_id: subheading.id,
            code: subheading.code,
            description: subheading.description,
            permit: subheading.permit,
            license: subheading.license,
            quota: subheading.quota,
            validation_instructions: subheading.validation_instructions,
            document_type: subheading.document_type,
            issuing_authority: subheading.issuing_authority,
            legal_provision: subheading.legal_provision,
            in_force,
        }
    }

    /// Whether a permit, a license or a quota is required.
    pub fn requires_any(&self) -> bool {
        self.permit.required || self.license.required || self.quota.required
    }
}

/// Looks up permit requirements by subheading code.
pub struct PermitLookup {
    catalog: Arc<dyn CatalogSource>,
    audit: Arc<dyn AuditSink>,
}

impl PermitLookup {
    pub fn new(catalog: Arc<dyn CatalogSource>, audit: Arc<dyn AuditSink>) -> Self {
        PermitLookup { catalog, audit }
    }

    /// Requirements for `code` as of today (UTC).
    pub fn lookup(&self, user: &str, code: &str) -> Result<PermitRequirements> {
        self.lookup_on(user, code, Utc::now().date_naive())
    }

    /// Requirements for `code`, with validity evaluated on `today`.
    ///
    /// The code may be typed raw or normalized. Returns
    /// [`ArancelError::NotFound`] when no subheading carries it.
    pub fn lookup_on(&self, user: &str, code: &str, today: NaiveDate) -> Result<PermitRequirements> {
        let code = code.trim();
        let subheading = self
            .catalog
            .find_by_code_exact(Level::Subheading, code)?
            .into_iter()
            .find_map(|entry| entry.as_subheading().cloned())
            .ok_or_else(|| ArancelError::not_found(format!("subheading '{code}'")))?;

        let event = AuditEvent::new(user, code, ActionKind::Prevalidation, OutcomeKind::Subheading)
            .with_code(Some(&subheading.code))
            .with_description(&subheading.description)
            .with_entity(subheading.id)
            .with_result_count(1);
        if let Err(e) = self.audit.record(&event) {
            log::warn!("Failed to record prevalidation of '{code}': {e}");
        }

        Ok(PermitRequirements::from_subheading(subheading, today))
    }
}
