//! Proof payloads delivered by the proof collaborator.
//!
//! The collaborator owns the proof format. This module only guarantees that a
//! proof is a JSON object and offers read access to the claim metadata the
//! reconciler needs; everything else is carried through untouched.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Opaque attestation returned by the proof collaborator on success
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Proof(Map<String, Value>);

impl Proof {
    /// Accepts a callback payload as a proof if it is a structured object.
    ///
    /// `null`, primitives and arrays are rejected.
    #[must_use]
    pub fn from_payload(payload: Value) -> Option<Self> {
        match payload {
            Value::Object(fields) => Some(Self(fields)),
            _ => None,
        }
    }

    /// Raw `claimData` object, if present
    #[must_use]
    pub fn claim_data(&self) -> Option<&Map<String, Value>> {
        self.0.get("claimData").and_then(Value::as_object)
    }

    /// Claim parameters document.
    ///
    /// The collaborator ships `claimData.parameters` as a JSON-encoded string;
    /// an inline object is accepted as well.
    #[must_use]
    pub fn parameters(&self) -> Option<Value> {
        match self.claim_data()?.get("parameters")? {
            Value::String(encoded) => serde_json::from_str(encoded).ok(),
            inline @ Value::Object(_) => Some(inline.clone()),
            _ => None,
        }
    }

    /// Username the collaborator verified, read from `paramValues.username`
    #[must_use]
    pub fn verified_username(&self) -> Option<String> {
        self.parameters()?
            .get("paramValues")?
            .get("username")?
            .as_str()
            .map(ToString::to_string)
    }

    /// Identifier of the proof, when the collaborator supplies one
    #[must_use]
    pub fn identifier(&self) -> Option<&str> {
        self.0.get("identifier").and_then(Value::as_str)
    }

    /// Underlying JSON fields
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }
}

impl fmt::Display for Proof {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match serde_json::to_string(&self.0) {
            Ok(json) => f.write_str(&json),
            Err(_) => f.write_str("<unprintable proof>"),
        }
    }
}

#[cfg(test)]
pub mod fixtures {
    use serde_json::{json, Value};

    use super::Proof;

    /// Builds a proof payload in the collaborator's shape for `username`
    pub fn proof_payload(username: &str) -> Value {
        let parameters = json!({
            "paramValues": { "username": username },
            "method": "GET",
        });

        json!({
            "identifier": format!("0x{username}"),
            "claimData": {
                "provider": "http",
                "parameters": parameters.to_string(),
                "owner": "0x0000000000000000000000000000000000000000",
            },
            "signatures": ["0xsig"],
        })
    }

    pub fn proof_for(username: &str) -> Proof {
        Proof::from_payload(proof_payload(username)).expect("fixture is an object")
    }
}
