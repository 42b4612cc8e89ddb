use std::{
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{body::Body, http::Request, response::Response, Router};
use social_verifier::{
    coordinator::{ProofRequestCoordinator, SessionPhase},
    platform::ProviderRegistry,
    proof::Proof,
    provider::{
        gateway::{GatewayProofProvider, PendingCallbacks},
        AppCredentials,
    },
    server,
    types::Environment,
};
use tower::ServiceExt;

use super::FakeGateway;

/// Setup test environment variables with all the required configuration
pub fn setup_test_env() {
    // Load test environment variables
    dotenvy::from_path(".env.example").ok();

    // Initialize tracing for tests
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Service wired against an in-process fake gateway
#[allow(dead_code)]
pub struct TestSetup {
    pub router: Router,
    pub environment: Environment,
    pub gateway: FakeGateway,
    pub coordinator: ProofRequestCoordinator,
    pub pending: Arc<PendingCallbacks>,
    pub received: Arc<Mutex<Vec<Proof>>>,
}

impl TestSetup {
    pub async fn new() -> Self {
        Self::with_secret("test-secret").await
    }

    pub async fn with_secret(app_secret: &str) -> Self {
        setup_test_env();

        let environment = Environment::Development;
        let gateway = FakeGateway::default();
        let gateway_url = gateway.spawn().await;

        let pending = Arc::new(PendingCallbacks::new());
        let provider = Arc::new(GatewayProofProvider::new(
            gateway_url,
            "http://localhost:8000/v1/verification/callback".to_string(),
            pending.clone(),
        ));

        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        let coordinator = ProofRequestCoordinator::new(
            provider,
            ProviderRegistry::with_defaults(),
            AppCredentials::new("test-app".to_string(), app_secret.to_string()),
            Arc::new(move |proof: &Proof| sink.lock().unwrap().push(proof.clone())),
        );

        let router = server::router(environment.clone(), coordinator.clone(), pending.clone());

        Self {
            router,
            environment,
            gateway,
            coordinator,
            pending,
            received,
        }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_json_request("POST", route, payload).await
    }

    pub async fn send_put_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_json_request("PUT", route, payload).await
    }

    async fn send_json_request(
        &self,
        method: &str,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method(method)
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn parse_response_body(
        &self,
        response: Response,
    ) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
        use http_body_util::BodyExt;

        let body = response.into_body().collect().await?.to_bytes();
        let json = serde_json::from_slice(&body)?;
        Ok(json)
    }

    /// Waits until the coordinator reaches `phase`
    pub async fn wait_for_phase(&self, phase: SessionPhase) {
        let mut receiver = self.coordinator.subscribe();
        tokio::time::timeout(
            Duration::from_secs(2),
            receiver.wait_for(|view| view.phase == phase),
        )
        .await
        .expect("timed out waiting for phase")
        .expect("coordinator dropped");
    }
}
