//! Wire types exchanged between the verifier service and the proof gateway.

use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Body sent to the proof gateway to open a verification session
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInitRequest {
    pub app_id: String,
    pub app_secret: String,
    /// Provider template the gateway should run for this session
    pub provider_id: String,
    /// Where the gateway delivers the session outcome
    pub callback_url: String,
}

impl fmt::Debug for SessionInitRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionInitRequest")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .field("provider_id", &self.provider_id)
            .field("callback_url", &self.callback_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionInitResponse {
    /// Gateway-side identifier, echoed back in the callback envelope
    pub session_id: String,
    /// Shareable link the end user opens to complete verification
    pub request_url: String,
}

/// Outcome of a session, delivered by the gateway to the verifier's callback route.
///
/// Exactly one of `proof` or `error` is expected. A missing or `null` proof
/// without an error is passed through as `null` so the receiver can reject it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SessionCallbackEnvelope {
    pub session_id: String,
    #[serde(default)]
    pub proof: Option<serde_json::Value>,
    #[serde(default)]
    pub error: Option<String>,
}

impl SessionCallbackEnvelope {
    /// Splits the envelope into the raw payload or the reported error
    ///
    /// # Errors
    ///
    /// Returns the gateway's error message when one was reported
    pub fn into_outcome(self) -> Result<serde_json::Value, String> {
        match self.error {
            Some(error) => Err(error),
            None => Ok(self.proof.unwrap_or(serde_json::Value::Null)),
        }
    }
}
