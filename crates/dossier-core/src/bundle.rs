//! Export bundle artifacts: the files shipped inside one export package.
//!
//! The bundle is a deterministic JSON container of named text artifacts;
//! the object storage collaborator sees it as a single opaque blob whose
//! locator is derived from its content.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::completeness::CompletenessReport;
use crate::diff::{display_value, VersionDiff};
use crate::domain::digest::SnapshotHash;
use crate::domain::error::Result;
use crate::manifest::Manifest;
use dossier_state::{EvidenceEntry, VersionRecord};

/// Human-readable primary document.
pub const DOCUMENT_FILE: &str = "technical_documentation.md";
/// Machine-readable system manifest, including the snapshot hash.
pub const MANIFEST_FILE: &str = "system_manifest.json";
/// Evidence index, JSON serialization.
pub const EVIDENCE_JSON_FILE: &str = "evidence_index.json";
/// Evidence index, CSV serialization.
pub const EVIDENCE_CSV_FILE: &str = "evidence_index.csv";
/// Completeness scores and enumerated gaps.
pub const COMPLETENESS_FILE: &str = "completeness_report.json";
/// Optional structured change report against a comparison version.
pub const DIFF_FILE: &str = "diff_report.json";

/// One named artifact inside a bundle.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BundleFile {
    pub name: String,
    pub media_type: String,
    pub body: String,
}

/// The export package handed to the object store as one blob.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportBundle {
    pub schema_version: String,
    pub snapshot_hash: String,
    pub files: Vec<BundleFile>,
}

impl ExportBundle {
    /// Serialize for upload.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// Parse a previously stored bundle.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Look up an artifact by file name.
    pub fn file(&self, name: &str) -> Option<&BundleFile> {
        self.files.iter().find(|f| f.name == name)
    }
}

// ---------------------------------------------------------------------------
// Diff report artifact
// ---------------------------------------------------------------------------

/// One stringified change row in the diff report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffChangeArtifact {
    pub field: String,
    pub change: String,
    pub old_value: String,
    pub new_value: String,
}

/// Structured diff report persisted as `diff_report.json`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiffReportArtifact {
    pub from_version_id: Uuid,
    pub from_label: String,
    pub to_version_id: Uuid,
    pub to_label: String,
    pub added: usize,
    pub removed: usize,
    pub modified: usize,
    pub changes: Vec<DiffChangeArtifact>,
}

/// Render a typed [`VersionDiff`] into its display artifact.
pub fn diff_report(
    from: &VersionRecord,
    to: &VersionRecord,
    diff: &VersionDiff,
) -> DiffReportArtifact {
    DiffReportArtifact {
        from_version_id: from.version_id,
        from_label: from.label.clone(),
        to_version_id: to.version_id,
        to_label: to.label.clone(),
        added: diff.added,
        removed: diff.removed,
        modified: diff.modified,
        changes: diff
            .changes
            .iter()
            .map(|c| DiffChangeArtifact {
                field: c.field.clone(),
                change: c.change.as_str().to_string(),
                old_value: display_value(&c.old_value),
                new_value: display_value(&c.new_value),
            })
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Renderers
// ---------------------------------------------------------------------------

/// Quote a CSV field per RFC 4180 when it contains delimiters.
fn csv_field(raw: &str) -> String {
    if raw.contains(',') || raw.contains('"') || raw.contains('\n') {
        format!("\"{}\"", raw.replace('"', "\"\""))
    } else {
        raw.to_string()
    }
}

/// Render the evidence index as CSV with stable column order.
pub fn render_evidence_csv(entries: &[EvidenceEntry]) -> String {
    let mut out = String::from("identifier,title,type,checksum\n");
    for e in entries {
        out.push_str(&format!(
            "{},{},{},{}\n",
            csv_field(&e.id),
            csv_field(&e.title),
            csv_field(&e.kind),
            csv_field(&e.checksum)
        ));
    }
    out
}

/// Render the primary human-readable document as markdown.
pub fn render_document_md(manifest: &Manifest, report: &CompletenessReport) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "# Technical Documentation — {} {}\n\n",
        manifest.core.system.name, manifest.core.version.label
    ));
    out.push_str(&format!("- Provider: {}\n", manifest.core.system.provider));
    out.push_str(&format!(
        "- Risk class: {}\n",
        manifest.core.system.risk_class
    ));
    out.push_str(&format!("- Status: {}\n", manifest.status));
    if let Some(date) = manifest.core.version.release_date {
        out.push_str(&format!("- Release date: {date}\n"));
    }
    out.push_str(&format!("- Generated: {}\n", manifest.generated_at));
    out.push_str(&format!(
        "- Overall completeness: {:.2}%\n\n",
        report.overall_score
    ));

    for section in &manifest.core.sections {
        let section_report = report
            .sections
            .iter()
            .find(|s| s.section_key == section.section_key);
        let title = section_report
            .map(|s| s.title.as_str())
            .unwrap_or(section.section_key.as_str());

        out.push_str(&format!("## {title}\n\n"));
        if let Some(sr) = section_report {
            out.push_str(&format!(
                "Completeness: {:.2}% — evidence items: {}\n\n",
                sr.score, sr.evidence_count
            ));
        }
        if let Some(fields) = section.content.as_object() {
            for (name, value) in fields {
                out.push_str(&format!("- **{name}**: {}\n", display_value(value)));
            }
            if !fields.is_empty() {
                out.push('\n');
            }
        }
        if let Some(sr) = section_report {
            if !sr.gaps.is_empty() {
                out.push_str("Open gaps:\n");
                for gap in &sr.gaps {
                    out.push_str(&format!("- {gap}\n"));
                }
                out.push('\n');
            }
        }
    }

    if !manifest.core.evidence_index.is_empty() {
        out.push_str("## Evidence index\n\n");
        for e in &manifest.core.evidence_index {
            out.push_str(&format!("- {} — {} ({})\n", e.id, e.title, e.kind));
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Assembly
// ---------------------------------------------------------------------------

/// Bundle container schema revision.
pub const BUNDLE_SCHEMA_VERSION: &str = "1.0";

/// Assemble the full export bundle from computed artifacts.
pub fn build_bundle(
    manifest: &Manifest,
    report: &CompletenessReport,
    diff: Option<&DiffReportArtifact>,
    snapshot_hash: &SnapshotHash,
) -> Result<ExportBundle> {
    // The manifest file carries the hash so auditors can recompute and
    // compare without the surrounding export record.
    let mut manifest_value = serde_json::to_value(manifest)?;
    if let Some(obj) = manifest_value.as_object_mut() {
        obj.insert(
            "snapshot_hash".to_string(),
            serde_json::Value::String(snapshot_hash.as_str().to_string()),
        );
    }

    let mut files = vec![
        BundleFile {
            name: DOCUMENT_FILE.to_string(),
            media_type: "text/markdown".to_string(),
            body: render_document_md(manifest, report),
        },
        BundleFile {
            name: MANIFEST_FILE.to_string(),
            media_type: "application/json".to_string(),
            body: serde_json::to_string_pretty(&manifest_value)?,
        },
        BundleFile {
            name: EVIDENCE_JSON_FILE.to_string(),
            media_type: "application/json".to_string(),
            body: serde_json::to_string_pretty(&manifest.core.evidence_index)?,
        },
        BundleFile {
            name: EVIDENCE_CSV_FILE.to_string(),
            media_type: "text/csv".to_string(),
            body: render_evidence_csv(&manifest.core.evidence_index),
        },
        BundleFile {
            name: COMPLETENESS_FILE.to_string(),
            media_type: "application/json".to_string(),
            body: serde_json::to_string_pretty(report)?,
        },
    ];
    if let Some(diff) = diff {
        files.push(BundleFile {
            name: DIFF_FILE.to_string(),
            media_type: "application/json".to_string(),
            body: serde_json::to_string_pretty(diff)?,
        });
    }

    Ok(ExportBundle {
        schema_version: BUNDLE_SCHEMA_VERSION.to_string(),
        snapshot_hash: snapshot_hash.as_str().to_string(),
        files,
    })
}

/// Unpack a bundle into a directory, one file per artifact.
///
/// Intended for auditors and CI jobs that want the artifacts on disk.
pub fn write_bundle_dir(path: &Path, bundle: &ExportBundle) -> anyhow::Result<()> {
    std::fs::create_dir_all(path).with_context(|| format!("create {:?}", path))?;
    for file in &bundle.files {
        let target = path.join(&file.name);
        std::fs::write(&target, &file.body).with_context(|| format!("write {:?}", target))?;
    }
    Ok(())
}
