pub mod callback;
pub mod platforms;
pub mod verification;

use aide::axum::{
    routing::{get, post, put},
    ApiRouter,
};

/// Creates the v1 API router with all v1 handler routes
pub fn handler() -> ApiRouter {
    ApiRouter::new()
        .api_route("/platforms", get(platforms::list_platforms))
        .api_route(
            "/verification",
            get(verification::get_verification).post(verification::start_verification),
        )
        .api_route(
            "/verification/platform",
            put(verification::select_platform),
        )
        .api_route(
            "/verification/profile-link",
            put(verification::update_profile_link),
        )
        .api_route("/verification/callback", post(callback::receive_callback))
}
