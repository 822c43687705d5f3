//! Storage trait definitions for Dossier
//!
//! These traits define the persistence boundary of the export engine:
//! - `DocumentStore`: tenant-scoped systems, versions, sections, evidence, exports
//! - `ObjectStore`: opaque blob storage (put / presigned get / delete)
//! - `AuditSink`: append-only destination for discrete audit facts
//!
//! All traits are async and backend-agnostic. In-memory fakes are provided
//! for testing via the `fakes` module; a filesystem-backed object store
//! lives in `object_store`.

use async_trait::async_trait;
use std::time::Duration;
use uuid::Uuid;

use crate::error::StorageError;
use crate::schema::{
    AuditFact, EvidenceEntry, ExportRecord, SectionRecord, SystemRecord, VersionRecord,
};

/// Result type for storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

// ---------------------------------------------------------------------------
// DocumentStore — tenant-scoped documentation state
// ---------------------------------------------------------------------------

/// Access to the documentation store.
///
/// Every lookup that crosses the tenant boundary takes `org_id` and returns
/// `Ok(None)` for rows that are absent *or* owned by another tenant — the
/// two cases are indistinguishable to the caller.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a system by id within the tenant.
    async fn system(&self, org_id: Uuid, system_id: Uuid) -> StorageResult<Option<SystemRecord>>;

    /// Fetch a version by id within the tenant.
    async fn version(&self, org_id: Uuid, version_id: Uuid)
        -> StorageResult<Option<VersionRecord>>;

    /// All stored sections of a version, in storage order.
    ///
    /// Callers must not rely on ordering; the manifest builder re-sorts by
    /// section key.
    async fn sections(&self, version_id: Uuid) -> StorageResult<Vec<SectionRecord>>;

    /// Evidence index for a version, in the order maintained by the
    /// evidence collaborator.
    async fn evidence_index(&self, version_id: Uuid) -> StorageResult<Vec<EvidenceEntry>>;

    /// Insert or replace a section row for its (version, section key) pair.
    async fn upsert_section(&self, section: SectionRecord) -> StorageResult<()>;

    /// Persist an updated version row (status, approval fields, dates).
    async fn update_version(&self, version: VersionRecord) -> StorageResult<()>;

    /// Record the content hash produced by an export.
    async fn set_snapshot_hash(&self, version_id: Uuid, hash: &str) -> StorageResult<()>;

    /// Append one immutable export record. Fails on duplicate export id.
    async fn insert_export(&self, export: ExportRecord) -> StorageResult<()>;

    /// All export records for a version, oldest first.
    async fn exports_for_version(&self, version_id: Uuid) -> StorageResult<Vec<ExportRecord>>;
}

// ---------------------------------------------------------------------------
// ObjectStore — opaque blob storage
// ---------------------------------------------------------------------------

/// Binary object storage addressed by opaque locator.
///
/// Guarantees:
/// - `put(data)` is idempotent for identical bytes (implementations are
///   content-addressed and deduplicate).
/// - `presigned_get` never exposes a locator that does not exist.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store bytes and return their locator.
    async fn put(&self, data: &[u8]) -> StorageResult<String>;

    /// Produce a time-limited download URL for a stored object.
    /// Returns `StorageError::NotFound` if the locator is unknown.
    async fn presigned_get(&self, locator: &str, ttl: Duration) -> StorageResult<String>;

    /// Delete an object. No-op if absent.
    async fn delete(&self, locator: &str) -> StorageResult<()>;
}

// ---------------------------------------------------------------------------
// AuditSink — append-only fact recording
// ---------------------------------------------------------------------------

/// Destination for discrete "this happened" facts.
///
/// The engine only emits; persistence, retention, and querying live behind
/// this trait.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Append one fact.
    async fn record(&self, fact: AuditFact) -> StorageResult<()>;
}
