//! Record types persisted by the documentation store.
//!
//! Tables:
//! - systems: Registered AI systems (tenant-scoped)
//! - versions: Documentation versions with workflow status
//! - sections: One structured documentation unit per (version, section key)
//! - exports: Append-only records of generated bundles

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Workflow status of a documentation version.
///
/// `Approved` is terminal: no transition leaves it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum VersionStatus {
    Draft,
    Review,
    Approved,
}

impl VersionStatus {
    /// Whether the status admits no outgoing transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, VersionStatus::Approved)
    }

    /// Whether section content may still be mutated.
    ///
    /// Approval freezes content by workflow gating only; the store does not
    /// enforce row-level immutability. Callers mutating sections must check
    /// this before writing.
    pub fn is_editable(&self) -> bool {
        !self.is_terminal()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            VersionStatus::Draft => "draft",
            VersionStatus::Review => "review",
            VersionStatus::Approved => "approved",
        }
    }
}

impl std::fmt::Display for VersionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered AI system whose documentation is being maintained.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemRecord {
    pub system_id: Uuid,
    pub org_id: Uuid,
    /// Trade name of the AI system.
    pub name: String,
    /// Legal entity providing the system.
    pub provider: String,
    /// Risk classification (e.g. "high", "limited").
    pub risk_class: String,
    pub created_at: DateTime<Utc>,
}

impl SystemRecord {
    pub fn new(org_id: Uuid, name: String, provider: String, risk_class: String) -> Self {
        Self {
            system_id: Uuid::new_v4(),
            org_id,
            name,
            provider,
            risk_class,
            created_at: Utc::now(),
        }
    }
}

/// A documentation version. Mutable until approved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionRecord {
    pub version_id: Uuid,
    pub org_id: Uuid,
    pub system_id: Uuid,

    /// Unique within the owning system.
    pub label: String,

    pub status: VersionStatus,

    /// Intended release date of the documented system version.
    pub release_date: Option<NaiveDate>,

    /// Content hash of the last export. Set by the export assembler,
    /// never by editing.
    pub snapshot_hash: Option<String>,

    pub created_by: String,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl VersionRecord {
    /// Create a new draft version.
    pub fn new(org_id: Uuid, system_id: Uuid, label: String, created_by: String) -> Self {
        let now = Utc::now();
        Self {
            version_id: Uuid::new_v4(),
            org_id,
            system_id,
            label,
            status: VersionStatus::Draft,
            release_date: None,
            snapshot_hash: None,
            created_by,
            approved_by: None,
            approved_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One structured documentation unit within a version, keyed by section key.
///
/// Auto-created empty on first access for a version; never duplicated for
/// the same (version, key) pair; deleted only by cascading version deletion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionRecord {
    pub section_id: Uuid,
    pub version_id: Uuid,

    /// Registry key, e.g. `ANNEX4.RISK_MANAGEMENT`.
    pub section_key: String,

    /// Structured field map. Field presence drives completeness scoring.
    pub content: serde_json::Value,

    /// Evidence identifiers attached to this section. Order irrelevant.
    pub evidence_refs: BTreeSet<String>,

    /// Cached completeness score; recomputed on content writes.
    pub completeness_score: Option<f64>,

    /// Whether any field was drafted with text-generation assistance.
    pub llm_assisted: bool,

    pub last_edited_by: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl SectionRecord {
    /// An empty section for a registered key, as materialized on first access.
    pub fn empty(version_id: Uuid, section_key: &str) -> Self {
        Self {
            section_id: Uuid::new_v4(),
            version_id,
            section_key: section_key.to_string(),
            content: serde_json::json!({}),
            evidence_refs: BTreeSet::new(),
            completeness_score: None,
            llm_assisted: false,
            last_edited_by: None,
            updated_at: Utc::now(),
        }
    }
}

/// Summary of one evidence item as supplied by the evidence collaborator.
///
/// The engine includes these in manifests and export bundles verbatim and
/// in the order provided; it never re-sorts the index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EvidenceEntry {
    pub id: String,
    pub title: String,
    /// Evidence kind (e.g. "test_report", "dataset_card").
    #[serde(rename = "type")]
    pub kind: String,
    /// Checksum of the underlying binary object.
    pub checksum: String,
}

/// Kind of export bundle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ExportType {
    Full,
    Diff,
}

impl ExportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportType::Full => "full",
            ExportType::Diff => "diff",
        }
    }
}

/// Append-only record of one generated export bundle.
///
/// Created exactly once per successful export request and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportRecord {
    pub export_id: Uuid,
    pub org_id: Uuid,
    pub version_id: Uuid,
    pub export_type: ExportType,

    /// SHA-256 of the canonical manifest. 64 lowercase hex chars.
    pub snapshot_hash: String,

    /// Opaque locator returned by the object store.
    pub storage_uri: String,

    /// Bundle size in bytes.
    pub file_size: u64,

    pub include_diff: bool,
    pub compare_version_id: Option<Uuid>,

    /// Overall weighted completeness at export time.
    pub completeness_score: f64,

    pub created_by: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A discrete "this happened" fact handed to the audit sink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuditFact {
    pub fact_id: Uuid,
    pub org_id: Uuid,
    /// Principal that performed the action.
    pub actor: String,
    /// Dotted action name, e.g. "export.created".
    pub action: String,
    /// Entity kind the fact is about ("version", "export").
    pub entity_kind: String,
    pub entity_id: Uuid,
    /// Structured detail payload.
    pub detail: serde_json::Value,
    pub recorded_at: DateTime<Utc>,
}

impl AuditFact {
    pub fn new(
        org_id: Uuid,
        actor: String,
        action: String,
        entity_kind: String,
        entity_id: Uuid,
        detail: serde_json::Value,
    ) -> Self {
        Self {
            fact_id: Uuid::new_v4(),
            org_id,
            actor,
            action,
            entity_kind,
            entity_id,
            detail,
            recorded_at: Utc::now(),
        }
    }
}
