use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, Default)]
pub struct FingerprintOptions {
    /// Object keys dropped at every depth before hashing.
    pub ignore_object_keys: BTreeSet<String>,
}

/// JSON encoding with object keys sorted at every depth.
pub fn canonical_json_bytes(
    value: &Value,
    options: &FingerprintOptions,
) -> serde_json::Result<Vec<u8>> {
    serde_json::to_vec(&canonicalize(value, options))
}

/// Hex SHA-256 of the canonical encoding; equal documents hash equally
/// regardless of key insertion order.
pub fn fingerprint_hex(value: &Value, options: &FingerprintOptions) -> serde_json::Result<String> {
    let bytes = canonical_json_bytes(value, options)?;
    Ok(format!("{:x}", Sha256::digest(bytes)))
}

fn canonicalize(value: &Value, options: &FingerprintOptions) -> Value {
    match value {
        Value::Object(object) => {
            let sorted = object
                .iter()
                .filter(|(key, _)| !options.ignore_object_keys.contains(*key))
                .map(|(key, value)| (key.clone(), canonicalize(value, options)))
                .collect::<BTreeMap<_, _>>();
            Value::Object(sorted.into_iter().collect::<Map<_, _>>())
        }
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| canonicalize(item, options))
                .collect(),
        ),
        _ => value.clone(),
    }
}

#[cfg(test)]
#[path = "fingerprint_test.rs"]
mod tests;
