use std::sync::Arc;

use axum::{http::StatusCode, Extension, Json};
use common_types::SessionCallbackEnvelope;

use crate::{provider::gateway::PendingCallbacks, types::AppError};

/// Receives a session outcome from the proof gateway
///
/// The outcome is handed to the session's callback. Each session accepts one
/// report; later reports for the same session, and reports for sessions the
/// verifier already abandoned, are rejected as unknown.
///
/// # Errors
///
/// - `unknown_session` - no session with that id is waiting for an outcome
#[allow(clippy::unused_async)]
pub async fn receive_callback(
    Extension(pending): Extension<Arc<PendingCallbacks>>,
    Json(envelope): Json<SessionCallbackEnvelope>,
) -> Result<StatusCode, AppError> {
    let session_id = envelope.session_id.clone();

    if pending.resolve(&session_id, envelope.into_outcome()) {
        tracing::info!(%session_id, "Session outcome delivered");
        Ok(StatusCode::ACCEPTED)
    } else {
        Err(AppError::new(
            StatusCode::NOT_FOUND,
            "unknown_session",
            "No session is waiting for this outcome",
            false,
        ))
    }
}
