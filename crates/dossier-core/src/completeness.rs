//! Weighted completeness scoring over documentation sections.
//!
//! All functions here are pure: they read the schema registry and the
//! section content handed to them and return values. Keeping this
//! side-effect-free is what makes export hashing reproducible.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema;
use dossier_state::SectionRecord;

/// Round to two decimal places, the precision persisted and reported.
fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

/// Whether a field value counts as filled.
///
/// Absent keys, nulls, empty strings, and empty collections are unfilled.
/// `false` and `0` are deliberate values and count as filled.
fn is_filled(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(a)) => !a.is_empty(),
        Some(Value::Object(o)) => !o.is_empty(),
        Some(_) => true,
    }
}

/// Completeness of one section in percent, rounded to two decimals.
///
/// Ratio of filled required fields to total required fields. A section
/// with zero required fields (including unknown keys) scores 100.
pub fn section_completeness(section_key: &str, content: &Value) -> f64 {
    let required = schema::required_fields(section_key);
    if required.is_empty() {
        return 100.0;
    }
    let filled = required
        .iter()
        .filter(|field| is_filled(content.get(**field)))
        .count();
    round2(filled as f64 / required.len() as f64 * 100.0)
}

/// Per-field fill state of a section, keyed by required field name.
pub fn field_completion(section_key: &str, content: &Value) -> BTreeMap<String, bool> {
    schema::required_fields(section_key)
        .iter()
        .map(|field| ((*field).to_string(), is_filled(content.get(*field))))
        .collect()
}

/// Overall weighted completeness in percent, rounded to two decimals.
///
/// Weighted average over the *entire* registry: sections absent from the
/// map contribute zero to the numerator while their weight still counts
/// in the denominator, so a missing section pulls the average down.
/// A total registry weight of zero yields 0.
pub fn overall_completeness(contents: &BTreeMap<String, Value>) -> f64 {
    let total = schema::total_weight();
    if total == 0 {
        return 0.0;
    }
    let weighted: f64 = schema::SECTION_SCHEMAS
        .iter()
        .filter_map(|s| {
            contents
                .get(s.key)
                .map(|content| f64::from(s.weight) * section_completeness(s.key, content))
        })
        .sum();
    round2(weighted / f64::from(total))
}

// ---------------------------------------------------------------------------
// Completeness report
// ---------------------------------------------------------------------------

/// Kind of completeness gap.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum GapType {
    RequiredField,
    NoEvidence,
}

/// One enumerated gap in the aggregated gap list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Gap {
    pub section_key: String,
    pub gap_type: GapType,
    pub description: String,
}

/// Completeness breakdown for one section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SectionReport {
    pub section_key: String,
    pub title: String,
    pub score: f64,
    /// Required field name → filled.
    pub field_completion: BTreeMap<String, bool>,
    pub evidence_count: usize,
    /// Gap descriptions local to this section.
    pub gaps: Vec<String>,
}

/// Scores plus enumerated gaps for an entire version, one entry per
/// registered section, ordered by section key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompletenessReport {
    pub overall_score: f64,
    pub sections: Vec<SectionReport>,
    /// Flat aggregation of every section's gaps.
    pub gaps: Vec<Gap>,
}

/// Build the completeness report over a full section map.
///
/// `sections` is keyed by section key and is expected to hold one entry per
/// registered key (the export engine materializes empty sections first).
pub fn completeness_report(sections: &BTreeMap<String, SectionRecord>) -> CompletenessReport {
    let contents: BTreeMap<String, Value> = sections
        .iter()
        .map(|(key, record)| (key.clone(), record.content.clone()))
        .collect();
    let overall_score = overall_completeness(&contents);

    let mut section_reports = Vec::new();
    let mut all_gaps = Vec::new();

    let mut keys: Vec<&'static str> = schema::section_keys().collect();
    keys.sort_unstable();

    for key in keys {
        let title = schema::schema(key).map(|s| s.title).unwrap_or(key);
        let (content, evidence_count) = sections
            .get(key)
            .map(|r| (r.content.clone(), r.evidence_refs.len()))
            .unwrap_or((Value::Object(serde_json::Map::new()), 0));

        let completion = field_completion(key, &content);
        let mut gaps = Vec::new();

        for (field, filled) in &completion {
            if !filled {
                let description = format!("{title}: required field '{field}' is not filled");
                gaps.push(description.clone());
                all_gaps.push(Gap {
                    section_key: key.to_string(),
                    gap_type: GapType::RequiredField,
                    description,
                });
            }
        }
        if evidence_count == 0 {
            let description = format!("{title}: no supporting evidence attached");
            gaps.push(description.clone());
            all_gaps.push(Gap {
                section_key: key.to_string(),
                gap_type: GapType::NoEvidence,
                description,
            });
        }

        section_reports.push(SectionReport {
            section_key: key.to_string(),
            title: title.to_string(),
            score: section_completeness(key, &content),
            field_completion: completion,
            evidence_count,
            gaps,
        });
    }

    CompletenessReport {
        overall_score,
        sections: section_reports,
        gaps: all_gaps,
    }
}
