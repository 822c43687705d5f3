//! Domain primitives: error taxonomy and canonical hashing.

pub mod digest;
pub mod error;

pub use digest::{canonical_json, compute_digest, SnapshotHash};
pub use error::{DossierError, Result};
