//! Error types for dossier-state

use thiserror::Error;

/// Errors that can occur in the storage boundary
#[derive(Error, Debug)]
pub enum StorageError {
    /// Object missing from the object store
    #[error("object not found: {locator}")]
    NotFound { locator: String },

    /// Version row missing (or outside the caller's tenant)
    #[error("version not found: {version_id}")]
    VersionNotFound { version_id: String },

    /// System row missing (or outside the caller's tenant)
    #[error("system not found: {system_id}")]
    SystemNotFound { system_id: String },

    /// Version label already taken within the owning system
    #[error("duplicate version label '{label}' for system {system_id}")]
    DuplicateLabel { system_id: String, label: String },

    /// Export records are append-only; rejects a second insert with the same id
    #[error("export already recorded: {export_id}")]
    DuplicateExport { export_id: String },

    /// Write to the backing store did not complete
    #[error("write failed: {0}")]
    WriteFailed(String),

    /// Serialization error
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Filesystem error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        StorageError::Serialization(err.to_string())
    }
}
