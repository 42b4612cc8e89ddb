use std::{sync::Arc, time::Duration};

use aide::openapi::OpenApi;
use axum::{Extension, Router};
use tokio::{net::TcpListener, signal};

use crate::{
    coordinator::ProofRequestCoordinator, provider::gateway::PendingCallbacks, routes,
    types::Environment,
};

/// Builds the application router with its documentation and shared state
pub fn router(
    environment: Environment,
    coordinator: ProofRequestCoordinator,
    pending: Arc<PendingCallbacks>,
) -> Router {
    let mut openapi = OpenApi::default();

    routes::handler()
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(environment))
        .layer(Extension(coordinator))
        .layer(Extension(pending))
        .layer(tower_http::timeout::TimeoutLayer::new(Duration::from_secs(
            5,
        )))
}

/// Starts the server with the given environment and dependencies
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(
    environment: Environment,
    coordinator: ProofRequestCoordinator,
    pending: Arc<PendingCallbacks>,
) -> anyhow::Result<()> {
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], environment.port()));
    let router = router(environment, coordinator, pending);

    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("🔄 Social Verifier started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }

    tracing::info!("Shutdown signal received");
}
