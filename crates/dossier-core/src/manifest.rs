//! Manifest building: the deterministic snapshot of a version's content.
//!
//! The manifest exists in two projections built from one shared core:
//! [`ManifestCore`] is the hashable projection — identity and content
//! fields only — and [`Manifest`] is the display projection that adds
//! the workflow status and a generation timestamp. Only the core ever
//! feeds the hasher, so two manifests built at different wall-clock
//! times from identical data hash identically.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::digest::SnapshotHash;
use crate::domain::error::Result;
use dossier_state::{EvidenceEntry, SectionRecord, SystemRecord, VersionRecord, VersionStatus};

/// Identity of the documented AI system.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemIdentity {
    pub system_id: Uuid,
    pub name: String,
    pub provider: String,
    pub risk_class: String,
}

/// Identity of the documentation version.
///
/// Workflow status is deliberately absent: approving a version must not
/// change its content fingerprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionIdentity {
    pub version_id: Uuid,
    pub label: String,
    pub release_date: Option<NaiveDate>,
}

/// One section as captured in a manifest.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestSection {
    pub section_key: String,
    pub content: serde_json::Value,
    /// Sorted for determinism; the underlying refs are an unordered set.
    pub evidence_refs: Vec<String>,
    pub llm_assisted: bool,
}

/// The hashable projection: everything the snapshot hash covers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ManifestCore {
    pub schema_version: String,
    pub system: SystemIdentity,
    pub version: VersionIdentity,
    /// Ordered by section key, lexicographic.
    pub sections: Vec<ManifestSection>,
    /// In the order supplied by the evidence collaborator.
    pub evidence_index: Vec<EvidenceEntry>,
}

/// The display projection shipped in export bundles.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Manifest {
    #[serde(flatten)]
    pub core: ManifestCore,
    pub status: VersionStatus,
    /// Informational only; excluded from the hash input.
    pub generated_at: DateTime<Utc>,
}

/// Manifest schema revision, bumped when the canonical shape changes.
pub const MANIFEST_SCHEMA_VERSION: &str = "1.0";

/// Assemble a manifest from fully-loaded state.
///
/// Sections are re-sorted by key regardless of storage order; the evidence
/// index is passed through untouched. Deterministic modulo `generated_at`.
pub fn build_manifest(
    system: &SystemRecord,
    version: &VersionRecord,
    sections: &[SectionRecord],
    evidence_index: &[EvidenceEntry],
) -> Manifest {
    let mut manifest_sections: Vec<ManifestSection> = sections
        .iter()
        .map(|s| ManifestSection {
            section_key: s.section_key.clone(),
            content: s.content.clone(),
            evidence_refs: s.evidence_refs.iter().cloned().collect(),
            llm_assisted: s.llm_assisted,
        })
        .collect();
    manifest_sections.sort_by(|a, b| a.section_key.cmp(&b.section_key));

    Manifest {
        core: ManifestCore {
            schema_version: MANIFEST_SCHEMA_VERSION.to_string(),
            system: SystemIdentity {
                system_id: system.system_id,
                name: system.name.clone(),
                provider: system.provider.clone(),
                risk_class: system.risk_class.clone(),
            },
            version: VersionIdentity {
                version_id: version.version_id,
                label: version.label.clone(),
                release_date: version.release_date,
            },
            sections: manifest_sections,
            evidence_index: evidence_index.to_vec(),
        },
        status: version.status,
        generated_at: Utc::now(),
    }
}

impl Manifest {
    /// Hash the core projection through the canonicalizer.
    pub fn snapshot_hash(&self) -> Result<SnapshotHash> {
        SnapshotHash::compute(&serde_json::to_value(&self.core)?)
    }
}
