use axum::{Extension, Json};
use schemars::JsonSchema;
use serde::Serialize;

use crate::{coordinator::ProofRequestCoordinator, platform::Platform};

#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlatformEntry {
    /// Identifier accepted by the verification endpoints
    pub id: Platform,
    pub display_name: String,
    /// Provider template the collaborator verifies against
    pub provider_id: String,
}

/// Lists the platforms that can be verified
#[allow(clippy::unused_async)]
pub async fn list_platforms(
    Extension(coordinator): Extension<ProofRequestCoordinator>,
) -> Json<Vec<PlatformEntry>> {
    let platforms = coordinator
        .registry()
        .entries()
        .into_iter()
        .map(|(platform, provider_id)| PlatformEntry {
            id: platform,
            display_name: platform.display_name().to_string(),
            provider_id: provider_id.to_string(),
        })
        .collect();

    Json(platforms)
}
