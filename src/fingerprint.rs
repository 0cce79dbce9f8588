//! Pipeline Fingerprinting - SHA-256 over Canonical JSON
//!
//! Compiled configs are cached by callers and reused across documents; the
//! fingerprint gives them a stable key for a compiled plan.

use serde::Serialize;
use serde_json::{to_string, Value};
use sha2::{Digest, Sha256};

/// Compute SHA-256 hash of bytes, return hex string
pub fn sha256_hex(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Convert to canonical JSON (sorted keys, no whitespace)
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String, serde_json::Error> {
    let v: Value = serde_json::to_value(value)?;
    let sorted = sort_value(&v);
    to_string(&sorted)
}

fn sort_value(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let mut sorted: Vec<_> = map.iter().collect();
            sorted.sort_by(|a, b| a.0.cmp(b.0));
            let sorted_map: serde_json::Map<String, Value> = sorted
                .into_iter()
                .map(|(k, v)| (k.clone(), sort_value(v)))
                .collect();
            Value::Object(sorted_map)
        }
        Value::Array(arr) => Value::Array(arr.iter().map(sort_value).collect()),
        _ => v.clone(),
    }
}

/// Stable fingerprint for a compiled pipeline. Transform handles never
/// serialize, so the fingerprint covers pipeline shape, activation, and
/// parameters - exactly what the engine's behavior depends on besides the
/// pass implementations themselves.
pub fn pipeline_fingerprint<T: Serialize>(plan: &T) -> Result<String, serde_json::Error> {
    let canonical = canonical_json(plan)?;
    Ok(sha256_hex(canonical.as_bytes()))
}

// We need hex encoding
mod hex {
    pub fn encode(bytes: impl AsRef<[u8]>) -> String {
        bytes.as_ref().iter().map(|b| format!("{:02x}", b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_canonical_json_sorted() {
        let obj = json!({"z": 1, "a": 2, "m": 3});
        let canonical = canonical_json(&obj).unwrap();
        assert_eq!(canonical, r#"{"a":2,"m":3,"z":1}"#);
    }

    #[test]
    fn test_hash_deterministic() {
        let data = b"test data";
        let h1 = sha256_hex(data);
        let h2 = sha256_hex(data);
        assert_eq!(h1, h2);
    }

    #[test]
    fn test_fingerprint_ignores_key_order() {
        let plan1 = json!({
            "multipass": false,
            "plugins": [[{"name": "removeTitle", "active": true}]]
        });
        let plan2 = json!({
            "plugins": [[{"active": true, "name": "removeTitle"}]],
            "multipass": false
        });
        let h1 = pipeline_fingerprint(&plan1).unwrap();
        let h2 = pipeline_fingerprint(&plan2).unwrap();
        assert_eq!(h1, h2);
    }
}
