//! Deterministic content hashing of prediction results
//!
//! Hashes a canonical JSON form of `{"predictions": ..., "region_id": ...}`
//! with lexicographically sorted prediction keys and no whitespace, so the
//! digest depends only on the content, never on insertion order.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::models::AidType;

#[derive(Serialize)]
struct HashEnvelope<'a> {
    predictions: &'a BTreeMap<AidType, u64>,
    region_id: &'a str,
}

/// Lowercase hex SHA-256 over the canonical form of a prediction set.
pub fn prediction_hash(predictions: &BTreeMap<AidType, u64>, region_id: &str) -> String {
    // BTreeMap iteration plus AidType's key ordering make this canonical;
    // integers and strings cannot fail to serialize.
    let canonical = serde_json::to_string(&HashEnvelope {
        predictions,
        region_id,
    })
    .expect("prediction envelope serializes");
    hex::encode(Sha256::digest(canonical.as_bytes()))
}
