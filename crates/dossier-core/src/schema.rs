//! Static schema registry for Annex IV documentation sections.
//!
//! One immutable, process-wide table: section key → required fields and
//! relative weight. Weights are relative, not percentages — the
//! completeness engine always normalizes by the sum of all weights, so
//! they need not total 100.
//!
//! Unknown keys resolve to "no requirements, weight 0" rather than an error.

/// Schema of one documentation section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionSchema {
    /// Stable registry key, e.g. `ANNEX4.RISK_MANAGEMENT`.
    pub key: &'static str,
    /// Human-readable section title used in reports and documents.
    pub title: &'static str,
    /// Fields that must be filled for the section to be complete,
    /// in presentation order.
    pub required_fields: &'static [&'static str],
    /// Relative weight of the section in the overall score.
    pub weight: u32,
}

/// The fixed section table for Annex IV style technical files.
pub const SECTION_SCHEMAS: &[SectionSchema] = &[
    SectionSchema {
        key: "ANNEX4.GENERAL",
        title: "General description of the AI system",
        required_fields: &[
            "system_name",
            "provider",
            "intended_purpose",
            "deployment_context",
        ],
        weight: 5,
    },
    SectionSchema {
        key: "ANNEX4.SYSTEM_ELEMENTS",
        title: "Elements of the system and its architecture",
        required_fields: &[
            "architecture_overview",
            "hardware_requirements",
            "software_dependencies",
            "third_party_components",
        ],
        weight: 10,
    },
    SectionSchema {
        key: "ANNEX4.DEVELOPMENT_PROCESS",
        title: "Development process and methods",
        required_fields: &[
            "methodology",
            "design_choices",
            "training_procedure",
            "validation_procedure",
        ],
        weight: 10,
    },
    SectionSchema {
        key: "ANNEX4.TRAINING_DATA",
        title: "Training data and data governance",
        required_fields: &[
            "data_sources",
            "collection_methodology",
            "labelling_procedure",
            "data_cleaning",
            "representativeness",
        ],
        weight: 10,
    },
    SectionSchema {
        key: "ANNEX4.MONITORING",
        title: "Monitoring, functioning and control",
        required_fields: &[
            "logging_capabilities",
            "expected_lifetime",
            "maintenance_plan",
        ],
        weight: 8,
    },
    SectionSchema {
        key: "ANNEX4.PERFORMANCE_METRICS",
        title: "Appropriateness of performance metrics",
        required_fields: &[
            "accuracy_metrics",
            "robustness_metrics",
            "evaluation_results",
            "known_limitations",
        ],
        weight: 10,
    },
    SectionSchema {
        key: "ANNEX4.RISK_MANAGEMENT",
        title: "Risk management system",
        required_fields: &[
            "risk_identification",
            "risk_mitigation",
            "residual_risks",
            "testing_summary",
        ],
        weight: 12,
    },
    SectionSchema {
        key: "ANNEX4.HUMAN_OVERSIGHT",
        title: "Human oversight measures",
        required_fields: &[
            "oversight_mechanisms",
            "operator_training",
            "intervention_procedures",
        ],
        weight: 8,
    },
    SectionSchema {
        key: "ANNEX4.STANDARDS",
        title: "Harmonised standards and specifications applied",
        required_fields: &["harmonised_standards", "other_specifications"],
        weight: 5,
    },
    SectionSchema {
        key: "ANNEX4.DECLARATION_OF_CONFORMITY",
        title: "EU declaration of conformity",
        required_fields: &["declaration_reference", "signatory"],
        weight: 5,
    },
    SectionSchema {
        key: "ANNEX4.POST_MARKET_MONITORING",
        title: "Post-market monitoring plan",
        required_fields: &[
            "monitoring_plan",
            "feedback_channels",
            "incident_reporting",
        ],
        weight: 10,
    },
    SectionSchema {
        key: "ANNEX4.CHANGE_MANAGEMENT",
        title: "Changes through the lifecycle",
        required_fields: &["change_log", "substantial_modification_criteria"],
        weight: 0,
    },
];

/// Look up the schema for a section key.
pub fn schema(key: &str) -> Option<&'static SectionSchema> {
    SECTION_SCHEMAS.iter().find(|s| s.key == key)
}

/// Required fields for a section key. Unknown keys have no requirements.
pub fn required_fields(key: &str) -> &'static [&'static str] {
    schema(key).map(|s| s.required_fields).unwrap_or(&[])
}

/// Weight of a section key. Unknown keys weigh 0.
pub fn weight(key: &str) -> u32 {
    schema(key).map(|s| s.weight).unwrap_or(0)
}

/// All registered section keys, in table order (lexicographic by design).
pub fn section_keys() -> impl Iterator<Item = &'static str> {
    SECTION_SCHEMAS.iter().map(|s| s.key)
}

/// Sum of all registry weights — the completeness denominator.
pub fn total_weight() -> u32 {
    SECTION_SCHEMAS.iter().map(|s| s.weight).sum()
}
