use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use axum::{http::StatusCode, routing::post, Extension, Json, Router};
use common_types::{SessionInitRequest, SessionInitResponse};
use serde_json::{json, Value};
use tokio::net::TcpListener;

/// App secret the fake gateway refuses
pub const REJECTED_SECRET: &str = "rejected-secret";

/// In-process stand-in for the proof gateway
#[derive(Clone, Default)]
pub struct FakeGateway {
    sessions_opened: Arc<AtomicUsize>,
}

impl FakeGateway {
    /// Serves the gateway on an ephemeral port and returns its base url
    pub async fn spawn(&self) -> String {
        let router = Router::new()
            .route("/v1/sessions", post(open_session))
            .layer(Extension(self.clone()));

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        format!("http://{addr}")
    }

    /// Number of sessions successfully opened
    pub fn sessions_opened(&self) -> usize {
        self.sessions_opened.load(Ordering::SeqCst)
    }
}

async fn open_session(
    Extension(gateway): Extension<FakeGateway>,
    Json(request): Json<SessionInitRequest>,
) -> Result<Json<SessionInitResponse>, StatusCode> {
    if request.app_secret == REJECTED_SECRET {
        return Err(StatusCode::UNAUTHORIZED);
    }

    let number = gateway.sessions_opened.fetch_add(1, Ordering::SeqCst) + 1;
    let session_id = format!("session-{number}");

    Ok(Json(SessionInitResponse {
        request_url: format!(
            "https://proofs.test/verify/{session_id}?provider={}",
            request.provider_id
        ),
        session_id,
    }))
}

/// Builds a proof payload in the collaborator's shape for `username`
pub fn proof_payload(username: &str) -> Value {
    let parameters = json!({
        "paramValues": { "username": username },
    });

    json!({
        "identifier": format!("0x{username}"),
        "claimData": {
            "provider": "http",
            "parameters": parameters.to_string(),
        },
        "signatures": ["0xsig"],
    })
}
