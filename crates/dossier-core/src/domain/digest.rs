//! Canonical JSON normalization and snapshot hash computation.
//!
//! The canonical form is the hashing input for export manifests:
//! - Object keys sorted lexicographically at every nesting level
//! - Number normalization (integer-valued floats → integers; reject NaN/Infinity)
//! - Fully compact serialization (no insignificant whitespace)
//! - SHA-256 hex digest over the canonical bytes
//!
//! Auditors can recompute the digest independently from the manifest JSON
//! shipped in an export bundle.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::error::{DossierError, Result};

/// Recursively sort JSON object keys lexicographically.
fn sort_keys(value: &serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let mut sorted = serde_json::Map::new();
            let mut keys: Vec<_> = map.keys().collect();
            keys.sort();

            for key in keys {
                if let Some(v) = map.get(key) {
                    sorted.insert(key.to_string(), sort_keys(v));
                }
            }
            serde_json::Value::Object(sorted)
        }
        serde_json::Value::Array(arr) => {
            serde_json::Value::Array(arr.iter().map(sort_keys).collect())
        }
        other => other.clone(),
    }
}

/// Normalize numbers: integer-valued floats → integer repr; reject NaN/Infinity.
fn normalize_value(value: &serde_json::Value) -> Result<serde_json::Value> {
    match value {
        serde_json::Value::Object(map) => {
            let mut normalized = serde_json::Map::new();
            for (k, v) in map.iter() {
                normalized.insert(k.clone(), normalize_value(v)?);
            }
            Ok(serde_json::Value::Object(normalized))
        }
        serde_json::Value::Array(arr) => {
            let normalized = arr
                .iter()
                .map(normalize_value)
                .collect::<Result<Vec<_>>>()?;
            Ok(serde_json::Value::Array(normalized))
        }
        serde_json::Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                Ok(serde_json::Value::Number(n.clone()))
            } else if let Some(f) = n.as_f64() {
                if !f.is_finite() {
                    return Err(DossierError::Computation(
                        "NaN/Infinity not permitted in canonical JSON".to_string(),
                    ));
                }
                if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
                    Ok(serde_json::Value::Number(serde_json::Number::from(
                        f as i64,
                    )))
                } else {
                    Ok(serde_json::Value::Number(n.clone()))
                }
            } else {
                Ok(serde_json::Value::Number(n.clone()))
            }
        }
        other => Ok(other.clone()),
    }
}

/// Convert a JSON value to canonical form: normalize numbers → sort keys → compact JSON.
pub fn canonical_json(value: &serde_json::Value) -> Result<String> {
    let normalized = normalize_value(value)?;
    let sorted = sort_keys(&normalized);
    Ok(serde_json::to_string(&sorted)?)
}

/// SHA-256 hex digest of canonical JSON. Lowercase, 64 chars.
pub fn compute_digest(value: &serde_json::Value) -> Result<String> {
    let canonical = canonical_json(value)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

/// Content hash of a canonical manifest (SHA-256 hex string).
///
/// The inner field is private to guarantee the string is always valid
/// lowercase 64-char hex produced by `compute` or validated via
/// `TryFrom<String>`. Doubles as the export's content address and the
/// reproducibility fingerprint.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SnapshotHash(String);

impl SnapshotHash {
    /// Hash a JSON value through the canonicalizer.
    pub fn compute(value: &serde_json::Value) -> Result<Self> {
        Ok(SnapshotHash(compute_digest(value)?))
    }

    /// Return the full hex string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short form (first 12 hex chars).
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl TryFrom<String> for SnapshotHash {
    type Error = DossierError;

    fn try_from(s: String) -> Result<Self> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DossierError::Computation(format!(
                "not a valid snapshot hash: {s}"
            )));
        }
        Ok(SnapshotHash(s.to_ascii_lowercase()))
    }
}

impl std::fmt::Display for SnapshotHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_json_sorts_keys() {
        let input = serde_json::json!({
            "b": 1,
            "a": 2,
            "c": 3
        });
        let canonical = canonical_json(&input).expect("canonical_json");
        assert_eq!(canonical, r#"{"a":2,"b":1,"c":3}"#);
    }

    #[test]
    fn canonical_json_field_order_invariant() {
        let input1 = serde_json::json!({
            "a": 1,
            "b": 2,
            "c": 3
        });
        let input2 = serde_json::json!({
            "c": 3,
            "a": 1,
            "b": 2
        });
        let canonical1 = canonical_json(&input1).expect("canonical_json 1");
        let canonical2 = canonical_json(&input2).expect("canonical_json 2");
        assert_eq!(canonical1, canonical2);
    }

    #[test]
    fn canonical_json_nested_field_order_invariant() {
        let input1 = serde_json::json!({
            "outer": {
                "z": 1,
                "y": 2,
                "x": 3
            }
        });
        let input2 = serde_json::json!({
            "outer": {
                "x": 3,
                "y": 2,
                "z": 1
            }
        });
        let canonical1 = canonical_json(&input1).expect("canonical_json 1");
        let canonical2 = canonical_json(&input2).expect("canonical_json 2");
        assert_eq!(canonical1, canonical2);
    }

    #[test]
    fn canonical_json_is_compact() {
        let input = serde_json::json!({ "key": ["a", "b"], "n": 1 });
        let canonical = canonical_json(&input).expect("canonical_json");
        assert!(!canonical.contains(' '));
        assert!(!canonical.contains('\n'));
    }

    #[test]
    fn canonical_json_integer_float() {
        let input = serde_json::json!({ "value": 1.0 });
        let canonical = canonical_json(&input).expect("canonical_json");
        assert_eq!(canonical, r#"{"value":1}"#);
    }

    #[test]
    fn canonical_json_fractional_float() {
        let input = serde_json::json!({ "value": 5.26 });
        let canonical = canonical_json(&input).expect("canonical_json");
        assert_eq!(canonical, r#"{"value":5.26}"#);
    }

    #[test]
    fn canonical_json_array_order_preserved() {
        let input1 = serde_json::json!({ "array": [3, 1, 2] });
        let input2 = serde_json::json!({ "array": [1, 2, 3] });
        let canonical1 = canonical_json(&input1).expect("canonical_json 1");
        let canonical2 = canonical_json(&input2).expect("canonical_json 2");
        assert_ne!(canonical1, canonical2);
    }

    #[test]
    fn canonicalization_is_a_fixed_point() {
        let input = serde_json::json!({
            "z": { "b": 1.0, "a": [true, null] },
            "a": "text"
        });
        let first = canonical_json(&input).expect("first pass");
        let reparsed: serde_json::Value = serde_json::from_str(&first).expect("reparse");
        let second = canonical_json(&reparsed).expect("second pass");
        assert_eq!(first, second);
    }

    #[test]
    fn compute_digest_is_64_hex_chars() {
        let input = serde_json::json!({
            "name": "credit-scoring",
            "label": "v1.0"
        });
        let digest = compute_digest(&input).expect("compute_digest");
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c: char| c.is_ascii_hexdigit()));

        let digest2 = compute_digest(&input).expect("compute_digest");
        assert_eq!(digest, digest2);
    }

    #[test]
    fn compute_digest_single_field_delta() {
        let input1 = serde_json::json!({ "label": "v1.0" });
        let input2 = serde_json::json!({ "label": "v1.1" });
        let digest1 = compute_digest(&input1).expect("compute_digest 1");
        let digest2 = compute_digest(&input2).expect("compute_digest 2");
        assert_ne!(digest1, digest2);
    }

    #[test]
    fn snapshot_hash_try_from_validates() {
        assert!(SnapshotHash::try_from("abcd".to_string()).is_err());
        assert!(SnapshotHash::try_from("zz".repeat(32)).is_err());

        let upper = "AB".repeat(32);
        let hash = SnapshotHash::try_from(upper).expect("valid hex");
        assert_eq!(hash.as_str(), &"ab".repeat(32));
    }

    #[test]
    fn snapshot_hash_short_prefix() {
        let hash = SnapshotHash::compute(&serde_json::json!({"k": 1})).expect("compute");
        assert_eq!(hash.short().len(), 12);
        assert!(hash.as_str().starts_with(hash.short()));
    }
}
