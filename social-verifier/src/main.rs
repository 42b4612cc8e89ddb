use std::sync::Arc;

use social_verifier::{
    coordinator::{LogProofListener, ProofRequestCoordinator},
    provider::gateway::{GatewayProofProvider, PendingCallbacks},
    server,
    types::Environment,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let environment = Environment::from_env();

    // JSON logs for staging/production, plain logs for development
    if environment.json_logs() {
        fmt()
            .json()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    } else {
        fmt().with_env_filter(EnvFilter::from_default_env()).init();
    }

    let pending = Arc::new(PendingCallbacks::new());
    let provider = Arc::new(GatewayProofProvider::new(
        environment.proof_gateway_url(),
        environment.callback_url(),
        pending.clone(),
    ));

    let coordinator = ProofRequestCoordinator::new(
        provider,
        environment.provider_registry(),
        environment.app_credentials(),
        Arc::new(LogProofListener),
    );

    server::start(environment, coordinator, pending).await
}
