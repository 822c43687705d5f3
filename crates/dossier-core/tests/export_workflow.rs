//! End-to-end export scenarios against the in-memory fakes.

use std::sync::Arc;

use dossier_core::{
    DossierError, ExportBundle, ExportEngine, ExportPolicy, ExportRequest, COMPLETENESS_FILE,
    DIFF_FILE, DOCUMENT_FILE, EVIDENCE_CSV_FILE, EVIDENCE_JSON_FILE, MANIFEST_FILE,
};
use dossier_state::fakes::{FailingObjectStore, MemoryAuditSink, MemoryDocumentStore, MemoryObjectStore};
use dossier_state::{
    DocumentStore, EvidenceEntry, ExportType, SectionRecord, SystemRecord, VersionRecord,
    VersionStatus,
};
use serde_json::json;
use uuid::Uuid;

struct Fixture {
    docs: Arc<MemoryDocumentStore>,
    objects: Arc<MemoryObjectStore>,
    audit: Arc<MemoryAuditSink>,
    engine: ExportEngine,
    org_id: Uuid,
    version_id: Uuid,
}

async fn fixture() -> Fixture {
    let docs = Arc::new(MemoryDocumentStore::new());
    let objects = Arc::new(MemoryObjectStore::new());
    let audit = Arc::new(MemoryAuditSink::new());
    let engine = ExportEngine::new(docs.clone(), objects.clone(), audit.clone());

    let org_id = Uuid::new_v4();
    let system = SystemRecord::new(
        org_id,
        "acme-scoring".to_string(),
        "Acme GmbH".to_string(),
        "high".to_string(),
    );
    let system_id = system.system_id;
    docs.insert_system(system);

    let version = VersionRecord::new(org_id, system_id, "v1.0".to_string(), "alice".to_string());
    let version_id = version.version_id;
    docs.insert_version(version).unwrap();

    let mut general = SectionRecord::empty(version_id, "ANNEX4.GENERAL");
    general.content = json!({
        "system_name": "acme-scoring",
        "provider": "Acme GmbH",
        "intended_purpose": "credit risk scoring",
        "deployment_context": "retail banking",
    });
    general.evidence_refs.insert("ev-1".to_string());
    docs.upsert_section(general).await.unwrap();

    docs.set_evidence(
        version_id,
        vec![EvidenceEntry {
            id: "ev-1".to_string(),
            title: "Dataset card".to_string(),
            kind: "dataset_card".to_string(),
            checksum: "aa".repeat(32),
        }],
    );

    Fixture {
        docs,
        objects,
        audit,
        engine,
        org_id,
        version_id,
    }
}

fn full_request(f: &Fixture) -> ExportRequest {
    ExportRequest {
        org_id: f.org_id,
        version_id: f.version_id,
        requested_by: "alice".to_string(),
        include_diff: false,
        compare_version_id: None,
    }
}

#[tokio::test]
async fn export_produces_complete_bundle() {
    let f = fixture().await;
    let record = f.engine.generate_export(full_request(&f)).await.unwrap();

    assert_eq!(record.export_type, ExportType::Full);
    assert_eq!(record.snapshot_hash.len(), 64);
    assert!(record.file_size > 0);

    let bytes = f.objects.bytes(&record.storage_uri).unwrap();
    assert_eq!(bytes.len() as u64, record.file_size);

    let bundle = ExportBundle::from_bytes(&bytes).unwrap();
    assert_eq!(bundle.snapshot_hash, record.snapshot_hash);
    for name in [
        DOCUMENT_FILE,
        MANIFEST_FILE,
        EVIDENCE_JSON_FILE,
        EVIDENCE_CSV_FILE,
        COMPLETENESS_FILE,
    ] {
        assert!(bundle.file(name).is_some(), "bundle missing {name}");
    }
    assert!(bundle.file(DIFF_FILE).is_none());

    let manifest_body = &bundle.file(MANIFEST_FILE).unwrap().body;
    assert!(manifest_body.contains(&record.snapshot_hash));

    let csv = &bundle.file(EVIDENCE_CSV_FILE).unwrap().body;
    assert!(csv.starts_with("identifier,title,type,checksum\n"));
    assert!(csv.contains("ev-1"));
}

#[tokio::test]
async fn repeated_export_reuses_hash_but_not_identity() {
    let f = fixture().await;
    let first = f.engine.generate_export(full_request(&f)).await.unwrap();
    let second = f.engine.generate_export(full_request(&f)).await.unwrap();

    assert_eq!(first.snapshot_hash, second.snapshot_hash);
    assert_ne!(first.export_id, second.export_id);

    // The content-addressed store collapses identical bundles to one blob,
    // but both records stand on their own.
    let exports = f.docs.exports_for_version(f.version_id).await.unwrap();
    assert_eq!(exports.len(), 2);
}

#[tokio::test]
async fn content_edit_between_exports_changes_the_hash() {
    let f = fixture().await;
    let first = f.engine.generate_export(full_request(&f)).await.unwrap();

    let mut risk = SectionRecord::empty(f.version_id, "ANNEX4.RISK_MANAGEMENT");
    risk.content = json!({ "risk_identification": "hazard analysis" });
    f.docs.upsert_section(risk).await.unwrap();

    let second = f.engine.generate_export(full_request(&f)).await.unwrap();
    assert_ne!(first.snapshot_hash, second.snapshot_hash);
    assert!(second.completeness_score > first.completeness_score);
}

#[tokio::test]
async fn snapshot_hash_is_written_back_to_the_version() {
    let f = fixture().await;
    let record = f.engine.generate_export(full_request(&f)).await.unwrap();
    let version = f
        .docs
        .version(f.org_id, f.version_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(version.snapshot_hash.as_deref(), Some(record.snapshot_hash.as_str()));
}

#[tokio::test]
async fn diff_without_compare_version_fails_before_any_write() {
    let f = fixture().await;
    let err = f
        .engine
        .generate_export(ExportRequest {
            include_diff: true,
            compare_version_id: None,
            ..full_request(&f)
        })
        .await
        .unwrap_err();

    assert!(matches!(err, DossierError::MissingCompareVersion));
    assert!(f.objects.is_empty(), "no blob may be written on failure");
    assert!(f
        .docs
        .exports_for_version(f.version_id)
        .await
        .unwrap()
        .is_empty());
    assert!(f.audit.facts().is_empty());
}

#[tokio::test]
async fn diff_export_reports_changes_between_versions() {
    let f = fixture().await;

    // Second version of the same system with an edited general section.
    let base = f
        .docs
        .version(f.org_id, f.version_id)
        .await
        .unwrap()
        .unwrap();
    let compare = VersionRecord::new(
        f.org_id,
        base.system_id,
        "v0.9".to_string(),
        "alice".to_string(),
    );
    let compare_id = compare.version_id;
    f.docs.insert_version(compare).unwrap();
    let mut old_general = SectionRecord::empty(compare_id, "ANNEX4.GENERAL");
    old_general.content = json!({
        "system_name": "acme-scoring",
        "provider": "Acme Legacy AG",
    });
    f.docs.upsert_section(old_general).await.unwrap();

    let record = f
        .engine
        .generate_export(ExportRequest {
            include_diff: true,
            compare_version_id: Some(compare_id),
            ..full_request(&f)
        })
        .await
        .unwrap();

    assert_eq!(record.export_type, ExportType::Diff);
    assert_eq!(record.compare_version_id, Some(compare_id));

    let bundle =
        ExportBundle::from_bytes(&f.objects.bytes(&record.storage_uri).unwrap()).unwrap();
    let diff_body = &bundle.file(DIFF_FILE).unwrap().body;
    let diff: serde_json::Value = serde_json::from_str(diff_body).unwrap();

    assert_eq!(diff["from_label"], "v0.9");
    assert_eq!(diff["to_label"], "v1.0");
    // provider modified, intended_purpose + deployment_context added, label modified.
    assert!(diff["modified"].as_u64().unwrap() >= 2);
    assert!(diff["added"].as_u64().unwrap() >= 2);
}

#[tokio::test]
async fn unknown_compare_version_is_a_named_not_found() {
    let f = fixture().await;
    let bogus = Uuid::new_v4();
    let err = f
        .engine
        .generate_export(ExportRequest {
            include_diff: true,
            compare_version_id: Some(bogus),
            ..full_request(&f)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DossierError::CompareVersionNotFound(id) if id == bogus));
    assert!(f.objects.is_empty());
}

#[tokio::test]
async fn cross_tenant_lookup_reads_as_not_found() {
    let f = fixture().await;
    let other_org = Uuid::new_v4();
    let err = f
        .engine
        .generate_export(ExportRequest {
            org_id: other_org,
            ..full_request(&f)
        })
        .await
        .unwrap_err();
    assert!(matches!(err, DossierError::VersionNotFound(_)));
}

#[tokio::test]
async fn approved_only_policy_gates_draft_exports() {
    let f = fixture().await;
    let engine = ExportEngine::new(f.docs.clone(), f.objects.clone(), f.audit.clone())
        .with_policy(ExportPolicy::ApprovedOnly);

    let err = engine.generate_export(full_request(&f)).await.unwrap_err();
    assert!(matches!(
        err,
        DossierError::ExportNotAllowed {
            status: VersionStatus::Draft,
            ..
        }
    ));

    // Walk the version through the workflow, then the same export succeeds.
    f.engine
        .transition_version(f.org_id, f.version_id, VersionStatus::Review, "alice")
        .await
        .unwrap();
    f.engine
        .transition_version(f.org_id, f.version_id, VersionStatus::Approved, "bob")
        .await
        .unwrap();
    let record = engine.generate_export(full_request(&f)).await.unwrap();
    assert_eq!(record.snapshot_hash.len(), 64);
}

#[tokio::test]
async fn approving_between_exports_keeps_the_hash() {
    let f = fixture().await;
    let before = f.engine.generate_export(full_request(&f)).await.unwrap();

    f.engine
        .transition_version(f.org_id, f.version_id, VersionStatus::Review, "alice")
        .await
        .unwrap();
    f.engine
        .transition_version(f.org_id, f.version_id, VersionStatus::Approved, "bob")
        .await
        .unwrap();

    let after = f.engine.generate_export(full_request(&f)).await.unwrap();
    assert_eq!(before.snapshot_hash, after.snapshot_hash);
}

#[tokio::test]
async fn invalid_transition_is_rejected_with_both_statuses() {
    let f = fixture().await;
    let err = f
        .engine
        .transition_version(f.org_id, f.version_id, VersionStatus::Approved, "mallory")
        .await
        .unwrap_err();
    match err {
        DossierError::InvalidTransition { from, to } => {
            assert_eq!(from, VersionStatus::Draft);
            assert_eq!(to, VersionStatus::Approved);
        }
        other => panic!("expected InvalidTransition, got {other:?}"),
    }
}

#[tokio::test]
async fn export_and_transition_record_audit_facts() {
    let f = fixture().await;
    f.engine
        .transition_version(f.org_id, f.version_id, VersionStatus::Review, "alice")
        .await
        .unwrap();
    let record = f.engine.generate_export(full_request(&f)).await.unwrap();

    let facts = f.audit.facts();
    assert_eq!(facts.len(), 2);
    assert_eq!(facts[0].action, "version.status_changed");
    assert_eq!(facts[0].detail["to"], "review");
    assert_eq!(facts[1].action, "export.created");
    assert_eq!(facts[1].entity_id, record.export_id);
    assert_eq!(facts[1].detail["snapshot_hash"], record.snapshot_hash.as_str());
}

#[tokio::test]
async fn storage_failure_aborts_without_an_export_record() {
    let f = fixture().await;
    let engine = ExportEngine::new(
        f.docs.clone(),
        Arc::new(FailingObjectStore),
        f.audit.clone(),
    );

    let err = engine.generate_export(full_request(&f)).await.unwrap_err();
    assert!(matches!(err, DossierError::Storage(_)));
    assert!(f
        .docs
        .exports_for_version(f.version_id)
        .await
        .unwrap()
        .is_empty());
    assert!(f.audit.facts().is_empty());

    let version = f
        .docs
        .version(f.org_id, f.version_id)
        .await
        .unwrap()
        .unwrap();
    assert!(version.snapshot_hash.is_none());
}
