//! Domain-level error taxonomy for Dossier.

use dossier_state::{StorageError, VersionStatus};

/// Dossier domain errors.
///
/// Lookup failures are deliberately indistinguishable between "row absent"
/// and "row owned by another tenant" — both surface as the same not-found
/// variant so existence never leaks across tenants.
#[derive(Debug, thiserror::Error)]
pub enum DossierError {
    #[error("version not found: {0}")]
    VersionNotFound(uuid::Uuid),

    #[error("system not found: {0}")]
    SystemNotFound(uuid::Uuid),

    #[error("comparison version not found: {0}")]
    CompareVersionNotFound(uuid::Uuid),

    #[error("invalid transition: {from} -> {to}")]
    InvalidTransition {
        from: VersionStatus,
        to: VersionStatus,
    },

    #[error("diff export requested without a comparison version")]
    MissingCompareVersion,

    #[error("version {version_id} is {status}; export policy requires an approved version")]
    ExportNotAllowed {
        version_id: uuid::Uuid,
        status: VersionStatus,
    },

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("computation error: {0}")]
    Computation(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for Dossier domain operations.
pub type Result<T> = std::result::Result<T, DossierError>;

impl From<StorageError> for DossierError {
    fn from(err: StorageError) -> Self {
        DossierError::Storage(err.to_string())
    }
}
