//! Upstream response envelope
//!
//! MFL read responses wrap the payload under one dynamic key next to fixed
//! `version` and `encoding` markers:
//!
//! ```text
//! {"version": "1.0", "encoding": "utf-8", "rosters": { ... }}
//! ```
//!
//! The payload is the one member that is not a marker. Zero candidates or more
//! than one candidate is a malformed response.

use serde_json::{Map, Value};

use crate::error::{ProxyError, Result};

const MARKER_KEYS: [&str; 2] = ["version", "encoding"];

/// Extracts the payload from an upstream envelope.
pub fn unwrap_envelope(body: Value) -> Result<Value> {
    let Value::Object(mut members) = body else {
        return Err(ProxyError::MalformedResponse(
            "expected a JSON object".to_string(),
        ));
    };

    let candidates = payload_keys(&members);
    match candidates.as_slice() {
        [key] => members
            .remove(key)
            .ok_or_else(|| ProxyError::MalformedResponse(format!("missing '{}'", key))),
        [] => Err(ProxyError::MalformedResponse(
            "no payload key next to version/encoding".to_string(),
        )),
        keys => Err(ProxyError::MalformedResponse(format!(
            "ambiguous payload keys: {}",
            keys.join(", ")
        ))),
    }
}

fn payload_keys(members: &Map<String, Value>) -> Vec<String> {
    members
        .keys()
        .filter(|key| !MARKER_KEYS.contains(&key.as_str()))
        .cloned()
        .collect()
}
