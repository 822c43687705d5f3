//! Version diff engine.
//!
//! Compares two versions over a flattened view of version-level fields and
//! section content. Comparison happens on typed JSON values; stringification
//! is left to the diff report renderer so equivalent representations are
//! never spuriously flagged.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use dossier_state::{SectionRecord, VersionRecord};

/// Classification of a single field change.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }
}

/// One field-level delta between two versions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FieldChange {
    /// Flattened field path, e.g. `sections.ANNEX4.GENERAL.provider`.
    pub field: String,
    pub change: ChangeKind,
    /// Value in the `from` version (`Null` if absent).
    pub old_value: Value,
    /// Value in the `to` version (`Null` if absent).
    pub new_value: Value,
}

/// The result of diffing two versions, labeled `from` → `to`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionDiff {
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    /// Ordered by field path.
    pub changes: Vec<FieldChange>,
}

impl VersionDiff {
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// Flatten a version plus its sections into `field path → value`.
///
/// Version-level fields use bare names; section fields are prefixed with
/// `sections.<KEY>.`. Unset optional fields are absent from the map, so
/// setting one later surfaces as an `Added` change.
fn flatten(version: &VersionRecord, sections: &[SectionRecord]) -> BTreeMap<String, Value> {
    let mut flat = BTreeMap::new();
    flat.insert("label".to_string(), Value::String(version.label.clone()));
    flat.insert(
        "status".to_string(),
        Value::String(version.status.as_str().to_string()),
    );
    if let Some(date) = version.release_date {
        flat.insert(
            "release_date".to_string(),
            Value::String(date.to_string()),
        );
    }

    for section in sections {
        let prefix = format!("sections.{}", section.section_key);
        match section.content.as_object() {
            Some(fields) => {
                for (name, value) in fields {
                    flat.insert(format!("{prefix}.{name}"), value.clone());
                }
            }
            // Non-object content is compared as one opaque value.
            None => {
                flat.insert(prefix, section.content.clone());
            }
        }
    }
    flat
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Diff two versions' flattened field views.
///
/// A field present only in `to` counts as added, only in `from` as removed,
/// and present in both with different values as modified. Symmetric in
/// cost, directional in labeling.
pub fn diff_versions(
    from_version: &VersionRecord,
    from_sections: &[SectionRecord],
    to_version: &VersionRecord,
    to_sections: &[SectionRecord],
) -> VersionDiff {
    let from_flat = flatten(from_version, from_sections);
    let to_flat = flatten(to_version, to_sections);

    let mut changes = Vec::new();

    for (field, old_value) in &from_flat {
        match to_flat.get(field) {
            Some(new_value) if new_value != old_value => changes.push(FieldChange {
                field: field.clone(),
                change: ChangeKind::Modified,
                old_value: old_value.clone(),
                new_value: new_value.clone(),
            }),
            None => changes.push(FieldChange {
                field: field.clone(),
                change: ChangeKind::Removed,
                old_value: old_value.clone(),
                new_value: Value::Null,
            }),
            _ => {}
        }
    }
    for (field, new_value) in &to_flat {
        if !from_flat.contains_key(field) {
            changes.push(FieldChange {
                field: field.clone(),
                change: ChangeKind::Added,
                old_value: Value::Null,
                new_value: new_value.clone(),
            });
        }
    }
    changes.sort_by(|a, b| a.field.cmp(&b.field));

    let added = changes
        .iter()
        .filter(|c| c.change == ChangeKind::Added)
        .count();
    let removed = changes
        .iter()
        .filter(|c| c.change == ChangeKind::Removed)
        .count();
    let modified = changes
        .iter()
        .filter(|c| c.change == ChangeKind::Modified)
        .count();

    VersionDiff {
        added,
        removed,
        modified,
        changes,
    }
}

/// Render a value for human display in diff reports.
///
/// Strings are shown bare, absent values as the empty string; everything
/// else uses its compact JSON form.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
