//! Export assembler: orchestrates manifest building, completeness scoring,
//! hashing, and optional diffing into one stored bundle plus one immutable
//! export record.
//!
//! All computation between the initial load and the final persist is pure;
//! the load and the storage writes are the only await points. Failure
//! anywhere before the persist aborts with no export record and no blob.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::bundle::{build_bundle, diff_report, DiffReportArtifact};
use crate::completeness::completeness_report;
use crate::diff::diff_versions;
use crate::domain::error::{DossierError, Result};
use crate::manifest::build_manifest;
use crate::obs;
use crate::schema;
use dossier_state::{
    AuditFact, AuditSink, DocumentStore, ExportRecord, ExportType, ObjectStore, SectionRecord,
    VersionRecord, VersionStatus,
};

/// Which workflow statuses an export may be generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportPolicy {
    /// Only approved versions can be exported.
    ApprovedOnly,
    /// Any status; drafts export with their current content.
    #[default]
    AnyStatus,
}

/// One export request, as received from the (already authenticated) caller.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub org_id: Uuid,
    pub version_id: Uuid,
    pub requested_by: String,
    pub include_diff: bool,
    pub compare_version_id: Option<Uuid>,
}

/// The export engine, generic over its storage collaborators.
pub struct ExportEngine {
    docs: Arc<dyn DocumentStore>,
    objects: Arc<dyn ObjectStore>,
    audit: Arc<dyn AuditSink>,
    policy: ExportPolicy,
}

impl ExportEngine {
    pub fn new(
        docs: Arc<dyn DocumentStore>,
        objects: Arc<dyn ObjectStore>,
        audit: Arc<dyn AuditSink>,
    ) -> Self {
        Self {
            docs,
            objects,
            audit,
            policy: ExportPolicy::default(),
        }
    }

    /// Override the export gating policy.
    pub fn with_policy(mut self, policy: ExportPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Generate one export bundle and record for a version.
    ///
    /// Exactly one [`ExportRecord`] is created per successful call; a
    /// failure in any earlier step leaves no record and no stored blob.
    /// Re-running with unchanged content re-uploads to the same locator
    /// and yields the identical snapshot hash — the hash is the
    /// idempotency key.
    #[tracing::instrument(name = "dossier.export", skip_all, fields(version_id = %request.version_id))]
    pub async fn generate_export(&self, request: ExportRequest) -> Result<ExportRecord> {
        obs::emit_export_started(request.version_id, &request.requested_by, request.include_diff);

        // Load + precondition checks. Tenant misses are plain not-found.
        let version = self
            .docs
            .version(request.org_id, request.version_id)
            .await?
            .ok_or(DossierError::VersionNotFound(request.version_id))?;

        if self.policy == ExportPolicy::ApprovedOnly && version.status != VersionStatus::Approved {
            return Err(DossierError::ExportNotAllowed {
                version_id: version.version_id,
                status: version.status,
            });
        }

        let compare_version = if request.include_diff {
            let compare_id = request
                .compare_version_id
                .ok_or(DossierError::MissingCompareVersion)?;
            let compare = self
                .docs
                .version(request.org_id, compare_id)
                .await?
                .ok_or(DossierError::CompareVersionNotFound(compare_id))?;
            Some(compare)
        } else {
            None
        };

        let system = self
            .docs
            .system(request.org_id, version.system_id)
            .await?
            .ok_or(DossierError::SystemNotFound(version.system_id))?;

        let stored_sections = self.docs.sections(version.version_id).await?;
        let sections = registered_sections(version.version_id, stored_sections);
        let evidence = self.docs.evidence_index(version.version_id).await?;

        // Pure computation: scores, manifest, hash, optional diff.
        let report = completeness_report(&sections);
        let section_list: Vec<SectionRecord> = sections.into_values().collect();
        let manifest = build_manifest(&system, &version, &section_list, &evidence);
        let snapshot_hash = manifest.snapshot_hash()?;

        let diff_artifact: Option<DiffReportArtifact> = match &compare_version {
            Some(compare) => {
                let compare_stored = self.docs.sections(compare.version_id).await?;
                let compare_sections: Vec<SectionRecord> =
                    registered_sections(compare.version_id, compare_stored)
                        .into_values()
                        .collect();
                let diff = diff_versions(compare, &compare_sections, &version, &section_list);
                Some(diff_report(compare, &version, &diff))
            }
            None => None,
        };

        let bundle = build_bundle(&manifest, &report, diff_artifact.as_ref(), &snapshot_hash)?;
        let bytes = bundle.to_bytes()?;

        // Persist: blob first, then the append-only record.
        let storage_uri = self
            .objects
            .put(&bytes)
            .await
            .map_err(|e| DossierError::Storage(e.to_string()))?;

        let now = Utc::now();
        let record = ExportRecord {
            export_id: Uuid::new_v4(),
            org_id: request.org_id,
            version_id: version.version_id,
            export_type: if request.include_diff {
                ExportType::Diff
            } else {
                ExportType::Full
            },
            snapshot_hash: snapshot_hash.as_str().to_string(),
            storage_uri: storage_uri.clone(),
            file_size: bytes.len() as u64,
            include_diff: request.include_diff,
            compare_version_id: compare_version.as_ref().map(|v| v.version_id),
            completeness_score: report.overall_score,
            created_by: request.requested_by.clone(),
            created_at: now,
            updated_at: now,
        };
        self.docs.insert_export(record.clone()).await?;
        self.docs
            .set_snapshot_hash(version.version_id, snapshot_hash.as_str())
            .await?;

        self.audit
            .record(AuditFact::new(
                request.org_id,
                request.requested_by.clone(),
                "export.created".to_string(),
                "export".to_string(),
                record.export_id,
                serde_json::json!({
                    "version_id": version.version_id,
                    "export_type": record.export_type.as_str(),
                    "snapshot_hash": record.snapshot_hash,
                    "storage_uri": record.storage_uri,
                    "file_size": record.file_size,
                }),
            ))
            .await?;

        obs::emit_export_completed(
            record.export_id,
            snapshot_hash.short(),
            record.file_size,
            record.completeness_score,
        );

        Ok(record)
    }

    /// Apply a workflow transition to a stored version, persisting the
    /// updated row and sinking the audit fact.
    pub async fn transition_version(
        &self,
        org_id: Uuid,
        version_id: Uuid,
        to: VersionStatus,
        actor: &str,
    ) -> Result<VersionRecord> {
        let version = self
            .docs
            .version(org_id, version_id)
            .await?
            .ok_or(DossierError::VersionNotFound(version_id))?;

        let (updated, fact) = crate::workflow::apply_transition(&version, to, actor, Utc::now())?;
        self.docs.update_version(updated.clone()).await?;
        self.audit.record(fact).await?;
        obs::emit_version_transition(version_id, version.status.as_str(), to.as_str());
        Ok(updated)
    }
}

/// Materialize one section per registered key, auto-creating empties.
///
/// Stored rows win; registered keys without a row get an empty record.
/// Unregistered stray rows are kept — the completeness engine scores them
/// as weight 0 and the manifest carries them for fidelity.
pub fn registered_sections(
    version_id: Uuid,
    stored: Vec<SectionRecord>,
) -> BTreeMap<String, SectionRecord> {
    let mut map: BTreeMap<String, SectionRecord> = stored
        .into_iter()
        .map(|s| (s.section_key.clone(), s))
        .collect();
    for key in schema::section_keys() {
        map.entry(key.to_string())
            .or_insert_with(|| SectionRecord::empty(version_id, key));
    }
    map
}
