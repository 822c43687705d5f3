//! Version workflow rules engine.
//!
//! Pure decision functions over [`VersionStatus`]: the workflow never
//! touches storage. Callers persist the updated version and hand the
//! returned [`AuditFact`] to the audit sink.
//!
//! ```text
//! draft ──▶ review ──▶ approved (terminal)
//!   ▲          │
//!   └──────────┘  (send back)
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::error::{DossierError, Result};
use dossier_state::{AuditFact, VersionRecord, VersionStatus};

/// Statuses reachable from `from` in one transition.
pub fn allowed_transitions(from: VersionStatus) -> &'static [VersionStatus] {
    match from {
        VersionStatus::Draft => &[VersionStatus::Review],
        VersionStatus::Review => &[VersionStatus::Approved, VersionStatus::Draft],
        VersionStatus::Approved => &[],
    }
}

/// Whether `from → to` is an allowed transition.
pub fn is_valid_transition(from: VersionStatus, to: VersionStatus) -> bool {
    allowed_transitions(from).contains(&to)
}

/// Validate a transition, failing with [`DossierError::InvalidTransition`]
/// naming both statuses.
pub fn check_transition(from: VersionStatus, to: VersionStatus) -> Result<()> {
    if is_valid_transition(from, to) {
        Ok(())
    } else {
        Err(DossierError::InvalidTransition { from, to })
    }
}

/// Apply a validated transition to a version record.
///
/// Returns the updated record plus the audit fact describing the change;
/// the caller persists both. Approval stamps `approved_by`/`approved_at`;
/// a send-back from review clears them.
pub fn apply_transition(
    version: &VersionRecord,
    to: VersionStatus,
    actor: &str,
    at: DateTime<Utc>,
) -> Result<(VersionRecord, AuditFact)> {
    check_transition(version.status, to)?;

    let mut updated = version.clone();
    let from = updated.status;
    updated.status = to;
    updated.updated_at = at;
    match to {
        VersionStatus::Approved => {
            updated.approved_by = Some(actor.to_string());
            updated.approved_at = Some(at);
        }
        VersionStatus::Draft | VersionStatus::Review => {
            updated.approved_by = None;
            updated.approved_at = None;
        }
    }

    let fact = AuditFact {
        fact_id: Uuid::new_v4(),
        org_id: version.org_id,
        actor: actor.to_string(),
        action: "version.status_changed".to_string(),
        entity_kind: "version".to_string(),
        entity_id: version.version_id,
        detail: serde_json::json!({
            "from": from.as_str(),
            "to": to.as_str(),
            "label": updated.label,
        }),
        recorded_at: at,
    };

    Ok((updated, fact))
}
