//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::coordinator::VerificationError;

/// API error response envelope
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: &'static str,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub const fn new(
        status: StatusCode,
        code: &'static str,
        msg: &'static str,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody { code, message: msg },
            },
        }
    }

    /// HTTP status of the error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.inner.error.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error based on status code
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}

impl From<VerificationError> for AppError {
    fn from(err: VerificationError) -> Self {
        match &err {
            VerificationError::UnknownPlatform(platform) => {
                tracing::debug!("Unknown platform requested: {platform}");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "unknown_platform",
                    "Invalid social media platform.",
                    false,
                )
            }
            VerificationError::SessionInitialization(source) => {
                tracing::error!("Session initialization failed: {source}");
                Self::new(
                    StatusCode::BAD_GATEWAY,
                    "setup_failed",
                    "Setup failed",
                    true,
                )
            }
            VerificationError::Callback(message) => {
                tracing::warn!("Verification callback failed: {message}");
                Self::new(
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "verification_failed",
                    "Verification failed",
                    true,
                )
            }
            VerificationError::InactiveSession(token) => {
                tracing::debug!("Callback for inactive session {token}");
                Self::new(
                    StatusCode::CONFLICT,
                    "inactive_session",
                    "Session is no longer active",
                    false,
                )
            }
        }
    }
}
