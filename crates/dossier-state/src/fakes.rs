//! In-memory fakes for storage traits (testing only)
//!
//! Provides `MemoryDocumentStore`, `MemoryObjectStore`, and `MemoryAuditSink`
//! that satisfy the trait contracts without any external dependencies.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::error::StorageError;
use crate::schema::*;
use crate::storage_traits::*;

// ---------------------------------------------------------------------------
// MemoryDocumentStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct DocState {
    systems: HashMap<Uuid, SystemRecord>,
    versions: HashMap<Uuid, VersionRecord>,
    sections: HashMap<Uuid, Vec<SectionRecord>>,
    evidence: HashMap<Uuid, Vec<EvidenceEntry>>,
    exports: Vec<ExportRecord>,
}

/// In-memory documentation store backed by `HashMap`s.
#[derive(Debug, Default)]
pub struct MemoryDocumentStore {
    state: Mutex<DocState>,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a system row.
    pub fn insert_system(&self, system: SystemRecord) {
        let mut state = self.state.lock().unwrap();
        state.systems.insert(system.system_id, system);
    }

    /// Seed a version row. Enforces label uniqueness within the owning system.
    pub fn insert_version(&self, version: VersionRecord) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        let taken = state.versions.values().any(|v| {
            v.system_id == version.system_id
                && v.label == version.label
                && v.version_id != version.version_id
        });
        if taken {
            return Err(StorageError::DuplicateLabel {
                system_id: version.system_id.to_string(),
                label: version.label.clone(),
            });
        }
        state.versions.insert(version.version_id, version);
        Ok(())
    }

    /// Seed the evidence index for a version, replacing any existing entries.
    pub fn set_evidence(&self, version_id: Uuid, entries: Vec<EvidenceEntry>) {
        let mut state = self.state.lock().unwrap();
        state.evidence.insert(version_id, entries);
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn system(&self, org_id: Uuid, system_id: Uuid) -> StorageResult<Option<SystemRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .systems
            .get(&system_id)
            .filter(|s| s.org_id == org_id)
            .cloned())
    }

    async fn version(
        &self,
        org_id: Uuid,
        version_id: Uuid,
    ) -> StorageResult<Option<VersionRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .versions
            .get(&version_id)
            .filter(|v| v.org_id == org_id)
            .cloned())
    }

    async fn sections(&self, version_id: Uuid) -> StorageResult<Vec<SectionRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state.sections.get(&version_id).cloned().unwrap_or_default())
    }

    async fn evidence_index(&self, version_id: Uuid) -> StorageResult<Vec<EvidenceEntry>> {
        let state = self.state.lock().unwrap();
        Ok(state.evidence.get(&version_id).cloned().unwrap_or_default())
    }

    async fn upsert_section(&self, section: SectionRecord) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        let rows = state.sections.entry(section.version_id).or_default();
        match rows
            .iter_mut()
            .find(|s| s.section_key == section.section_key)
        {
            Some(existing) => *existing = section,
            None => rows.push(section),
        }
        Ok(())
    }

    async fn update_version(&self, version: VersionRecord) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        if !state.versions.contains_key(&version.version_id) {
            return Err(StorageError::VersionNotFound {
                version_id: version.version_id.to_string(),
            });
        }
        state.versions.insert(version.version_id, version);
        Ok(())
    }

    async fn set_snapshot_hash(&self, version_id: Uuid, hash: &str) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        let version =
            state
                .versions
                .get_mut(&version_id)
                .ok_or_else(|| StorageError::VersionNotFound {
                    version_id: version_id.to_string(),
                })?;
        version.snapshot_hash = Some(hash.to_string());
        version.updated_at = Utc::now();
        Ok(())
    }

    async fn insert_export(&self, export: ExportRecord) -> StorageResult<()> {
        let mut state = self.state.lock().unwrap();
        if state.exports.iter().any(|e| e.export_id == export.export_id) {
            return Err(StorageError::DuplicateExport {
                export_id: export.export_id.to_string(),
            });
        }
        state.exports.push(export);
        Ok(())
    }

    async fn exports_for_version(&self, version_id: Uuid) -> StorageResult<Vec<ExportRecord>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .exports
            .iter()
            .filter(|e| e.version_id == version_id)
            .cloned()
            .collect())
    }
}

// ---------------------------------------------------------------------------
// MemoryObjectStore
// ---------------------------------------------------------------------------

/// In-memory content-addressed object store.
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes for a locator, for test assertions.
    pub fn bytes(&self, locator: &str) -> Option<Vec<u8>> {
        let blobs = self.blobs.lock().unwrap();
        blobs.get(locator).cloned()
    }

    /// Number of stored blobs.
    pub fn len(&self) -> usize {
        self.blobs.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(&self, data: &[u8]) -> StorageResult<String> {
        let locator = hex::encode(Sha256::digest(data));
        let mut blobs = self.blobs.lock().unwrap();
        blobs.insert(locator.clone(), data.to_vec());
        Ok(locator)
    }

    async fn presigned_get(&self, locator: &str, ttl: Duration) -> StorageResult<String> {
        let blobs = self.blobs.lock().unwrap();
        if !blobs.contains_key(locator) {
            return Err(StorageError::NotFound {
                locator: locator.to_string(),
            });
        }
        Ok(format!("memory://{}?expires_in={}", locator, ttl.as_secs()))
    }

    async fn delete(&self, locator: &str) -> StorageResult<()> {
        let mut blobs = self.blobs.lock().unwrap();
        blobs.remove(locator);
        Ok(())
    }
}

/// Object store that fails every write. For abort-path testing.
#[derive(Debug, Default)]
pub struct FailingObjectStore;

#[async_trait]
impl ObjectStore for FailingObjectStore {
    async fn put(&self, _data: &[u8]) -> StorageResult<String> {
        Err(StorageError::WriteFailed(
            "injected object store failure".to_string(),
        ))
    }

    async fn presigned_get(&self, locator: &str, _ttl: Duration) -> StorageResult<String> {
        Err(StorageError::NotFound {
            locator: locator.to_string(),
        })
    }

    async fn delete(&self, _locator: &str) -> StorageResult<()> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// MemoryAuditSink
// ---------------------------------------------------------------------------

/// In-memory audit sink that retains every fact for inspection.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    facts: Mutex<Vec<AuditFact>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// All recorded facts, oldest first.
    pub fn facts(&self) -> Vec<AuditFact> {
        self.facts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, fact: AuditFact) -> StorageResult<()> {
        self.facts.lock().unwrap().push(fact);
        Ok(())
    }
}
