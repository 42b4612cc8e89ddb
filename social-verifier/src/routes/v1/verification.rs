use axum::{Extension, Json};
use axum_valid::Valid;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    coordinator::{ProofRequestCoordinator, VerificationView},
    share::ShareLinks,
    types::AppError,
};

#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct SelectPlatformRequest {
    /// Platform identifier, e.g. `instagram`
    #[validate(length(min = 1))]
    pub platform: String,
}

#[derive(Debug, Default, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct StartVerificationRequest {
    /// Platform to verify, defaults to the selected platform
    #[validate(length(min = 1))]
    pub platform: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProfileLinkRequest {
    /// Link to the profile the user claims, e.g. `https://instagram.com/alice`
    #[validate(length(max = 2048))]
    pub profile_link: String,
}

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResponse {
    #[serde(flatten)]
    pub view: VerificationView,
    /// Messenger links prefilled with the request url, present once a session is open
    pub share_links: Option<ShareLinks>,
}

impl From<VerificationView> for VerificationResponse {
    fn from(view: VerificationView) -> Self {
        let share_links = view.request_url.as_deref().and_then(|request_url| {
            ShareLinks::for_request_url(request_url)
                .inspect_err(|err| tracing::warn!("Failed to build share links: {err}"))
                .ok()
        });

        Self { view, share_links }
    }
}

/// Returns the current verification state
#[allow(clippy::unused_async)]
pub async fn get_verification(
    Extension(coordinator): Extension<ProofRequestCoordinator>,
) -> Json<VerificationResponse> {
    Json(coordinator.snapshot().into())
}

/// Selects the platform to verify
///
/// Any session in progress is discarded and the state returns to idle.
///
/// # Errors
///
/// - `unknown_platform` - the platform has no provider template
#[allow(clippy::unused_async)]
pub async fn select_platform(
    Extension(coordinator): Extension<ProofRequestCoordinator>,
    Valid(Json(request)): Valid<Json<SelectPlatformRequest>>,
) -> Result<Json<VerificationResponse>, AppError> {
    coordinator.select_platform(&request.platform)?;

    Ok(Json(coordinator.snapshot().into()))
}

/// Starts a verification session
///
/// Opens a session at the proof collaborator and returns the request url the
/// user has to open, together with messenger share links. The outcome is
/// reported later through the callback endpoint.
///
/// # Errors
///
/// - `unknown_platform` - the platform has no provider template
/// - `setup_failed` - the collaborator could not open the session
pub async fn start_verification(
    Extension(coordinator): Extension<ProofRequestCoordinator>,
    Valid(Json(request)): Valid<Json<StartVerificationRequest>>,
) -> Result<Json<VerificationResponse>, AppError> {
    let platform = request
        .platform
        .unwrap_or_else(|| coordinator.snapshot().platform.to_string());

    coordinator.start_verification(&platform).await?;

    Ok(Json(coordinator.snapshot().into()))
}

/// Stores the profile link the user claims to own
///
/// The link is matched against the verified username of the current proof and
/// the response carries the recomputed `verified` flag.
#[allow(clippy::unused_async)]
pub async fn update_profile_link(
    Extension(coordinator): Extension<ProofRequestCoordinator>,
    Valid(Json(request)): Valid<Json<ProfileLinkRequest>>,
) -> Json<VerificationResponse> {
    let verified = coordinator.set_profile_link(request.profile_link);
    tracing::debug!(verified, "Profile link updated");

    Json(coordinator.snapshot().into())
}
