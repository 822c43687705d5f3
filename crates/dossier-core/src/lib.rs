//! Dossier Core Library
//!
//! Version lifecycle and reproducible export engine for AI system
//! technical documentation. Re-exports the public surface of every
//! engine component.

pub mod bundle;
pub mod completeness;
pub mod diff;
pub mod domain;
pub mod export;
pub mod manifest;
pub mod obs;
pub mod schema;
pub mod workflow;

pub use domain::{canonical_json, compute_digest, DossierError, Result, SnapshotHash};

pub use bundle::{
    build_bundle, diff_report, render_document_md, render_evidence_csv, write_bundle_dir,
    BundleFile, DiffChangeArtifact, DiffReportArtifact, ExportBundle, COMPLETENESS_FILE,
    DIFF_FILE, DOCUMENT_FILE, EVIDENCE_CSV_FILE, EVIDENCE_JSON_FILE, MANIFEST_FILE,
};
pub use completeness::{
    completeness_report, field_completion, overall_completeness, section_completeness,
    CompletenessReport, Gap, GapType, SectionReport,
};
pub use diff::{diff_versions, display_value, ChangeKind, FieldChange, VersionDiff};
pub use export::{registered_sections, ExportEngine, ExportPolicy, ExportRequest};
pub use manifest::{
    build_manifest, Manifest, ManifestCore, ManifestSection, SystemIdentity, VersionIdentity,
    MANIFEST_SCHEMA_VERSION,
};
pub use schema::{
    required_fields, schema, section_keys, total_weight, weight, SectionSchema, SECTION_SCHEMAS,
};
pub use workflow::{allowed_transitions, apply_transition, check_transition, is_valid_transition};

pub use dossier_state::{
    AuditFact, AuditSink, DocumentStore, EvidenceEntry, ExportRecord, ExportType, ObjectStore,
    SectionRecord, StorageError, SystemRecord, VersionRecord, VersionStatus,
};

pub use obs::init_tracing;

/// Dossier version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
