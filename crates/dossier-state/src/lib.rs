//! Dossier-State: Persistence Boundary for Dossier
//!
//! This crate defines the storage seams the export engine depends on.
//! It owns the record schema and the async traits; real backends live
//! behind them and are out of scope for the engine itself.
//!
//! ## Key Components
//!
//! - `DocumentStore`: tenant-scoped systems, versions, sections, evidence, exports
//! - `ObjectStore`: opaque blob storage (`put` / `presigned_get` / `delete`)
//! - `AuditSink`: append-only destination for audit facts
//! - `FsObjectStore`: content-addressed filesystem implementation of `ObjectStore`

mod error;
pub mod fakes;
mod object_store;
mod schema;
pub mod storage_traits;

pub use error::StorageError;
pub use object_store::FsObjectStore;
pub use schema::{
    AuditFact, EvidenceEntry, ExportRecord, ExportType, SectionRecord, SystemRecord,
    VersionRecord, VersionStatus,
};
pub use storage_traits::{AuditSink, DocumentStore, ObjectStore, StorageResult};
