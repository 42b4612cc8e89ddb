use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard, PoisonError},
    time::Duration,
};

use common_types::{SessionInitRequest, SessionInitResponse};
use reqwest::{Client, StatusCode};
use tracing::instrument;

use super::{
    AppCredentials, CallbackOutcome, ProofProvider, ProofSession, ProviderError, SessionCallback,
};

/// Timeout for proof gateway requests, kept below the server's request timeout
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 4;

/// Maximum number of idle connections to maintain per host
const MAX_IDLE_CONNECTIONS_PER_HOST: usize = 10;

/// Callbacks of sessions the gateway has not reported on yet, keyed by gateway session id
#[derive(Debug, Default)]
pub struct PendingCallbacks {
    sessions: Mutex<HashMap<String, SessionCallback>>,
}

impl PendingCallbacks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn sessions(&self) -> MutexGuard<'_, HashMap<String, SessionCallback>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Parks `callback` until the gateway reports on `session_id`
    pub fn register(&self, session_id: String, callback: SessionCallback) {
        let previous = self.sessions().insert(session_id, callback);
        if previous.is_some() {
            tracing::warn!("Gateway reused a session id, dropping the older callback");
        }
    }

    /// Delivers `outcome` to the session's callback.
    ///
    /// Returns false when no session with that id is waiting, including
    /// sessions that already reported or were released.
    pub fn resolve(&self, session_id: &str, outcome: CallbackOutcome) -> bool {
        let callback = self.sessions().remove(session_id);
        match callback {
            Some(callback) => {
                callback.deliver(outcome);
                true
            }
            None => false,
        }
    }

    /// Stops waiting for `session_id`. Its callback is dropped without an outcome.
    pub fn release(&self, session_id: &str) -> bool {
        self.sessions().remove(session_id).is_some()
    }

    /// Number of sessions still waiting for an outcome
    #[must_use]
    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sessions().is_empty()
    }
}

/// Proof collaborator reached over HTTP through a proof gateway.
///
/// The gateway runs the identity-proof protocol and later posts the outcome of
/// each session to `callback_url`, where it is routed into `PendingCallbacks`.
pub struct GatewayProofProvider {
    base_url: String,
    callback_url: String,
    http_client: Client,
    pending: Arc<PendingCallbacks>,
}

impl GatewayProofProvider {
    /// Creates a new gateway client
    ///
    /// # Panics
    ///
    /// If the HTTP client fails to be created
    #[must_use]
    pub fn new(base_url: String, callback_url: String, pending: Arc<PendingCallbacks>) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
            .pool_max_idle_per_host(MAX_IDLE_CONNECTIONS_PER_HOST)
            .user_agent(format!("social-verifier/{}", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            callback_url,
            http_client,
            pending,
        }
    }
}

#[async_trait::async_trait]
impl ProofProvider for GatewayProofProvider {
    #[instrument(skip(self, credentials))]
    async fn init(
        &self,
        credentials: &AppCredentials,
        provider_id: &str,
    ) -> Result<Box<dyn ProofSession>, ProviderError> {
        let request = SessionInitRequest {
            app_id: credentials.app_id().to_string(),
            app_secret: credentials.app_secret().to_string(),
            provider_id: provider_id.to_string(),
            callback_url: self.callback_url.clone(),
        };

        let response = self
            .http_client
            .post(format!("{}/v1/sessions", self.base_url))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            return Err(handle_gateway_error(&error_text, status, provider_id));
        }

        let session: SessionInitResponse = response.json().await?;
        if session.request_url.is_empty() {
            return Err(ProviderError::InvalidGatewayResponse(
                "Gateway returned an empty request url".to_string(),
            ));
        }

        tracing::debug!(session_id = %session.session_id, "Gateway session opened");

        Ok(Box::new(GatewaySession {
            session_id: session.session_id,
            request_url: session.request_url,
            pending: self.pending.clone(),
        }))
    }
}

/// Maps a non-success gateway response to a `ProviderError`
fn handle_gateway_error(error_text: &str, status: StatusCode, provider_id: &str) -> ProviderError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ProviderError::CredentialsRejected,
        StatusCode::NOT_FOUND => ProviderError::UnknownProvider(provider_id.to_string()),
        _ => ProviderError::InvalidGatewayResponse(format!("Status {status}: {error_text}")),
    }
}

struct GatewaySession {
    session_id: String,
    request_url: String,
    pending: Arc<PendingCallbacks>,
}

#[async_trait::async_trait]
impl ProofSession for GatewaySession {
    async fn request_url(&self) -> Result<String, ProviderError> {
        Ok(self.request_url.clone())
    }

    async fn start_session(&self, callback: SessionCallback) -> Result<(), ProviderError> {
        self.pending.register(self.session_id.clone(), callback);
        Ok(())
    }
}

impl Drop for GatewaySession {
    fn drop(&mut self) {
        if self.pending.release(&self.session_id) {
            tracing::debug!(session_id = %self.session_id, "Released unreported gateway session");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode as HttpStatus, routing::post, Json, Router};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use tokio::net::TcpListener;

    /// Serves a fake gateway on an ephemeral port and returns its base url
    async fn spawn_gateway(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}")
    }

    fn credentials() -> AppCredentials {
        AppCredentials::new("app-id".to_string(), "app-secret".to_string())
    }

    #[tokio::test]
    async fn test_init_opens_session_and_parks_callback() {
        let router = Router::new().route(
            "/v1/sessions",
            post(|Json(request): Json<SessionInitRequest>| async move {
                assert_eq!(request.app_id, "app-id");
                assert_eq!(request.callback_url, "http://verifier/callback");
                Json(json!({
                    "sessionId": "gw-1",
                    "requestUrl": format!("https://gateway.test/verify/{}", request.provider_id),
                }))
            }),
        );
        let base_url = spawn_gateway(router).await;
        let pending = Arc::new(PendingCallbacks::new());
        let provider = GatewayProofProvider::new(
            format!("{base_url}/"),
            "http://verifier/callback".to_string(),
            pending.clone(),
        );

        let session = provider.init(&credentials(), "provider-1").await.unwrap();
        assert_eq!(
            session.request_url().await.unwrap(),
            "https://gateway.test/verify/provider-1"
        );

        let (callback, receiver) = SessionCallback::channel();
        session.start_session(callback).await.unwrap();
        assert_eq!(pending.len(), 1);

        assert!(pending.resolve("gw-1", Ok(json!({ "ok": true }))));
        assert_eq!(receiver.await.unwrap(), Ok(json!({ "ok": true })));
        assert!(pending.is_empty());
    }

    #[tokio::test]
    async fn test_dropping_session_releases_its_callback() {
        let router = Router::new().route(
            "/v1/sessions",
            post(|| async {
                Json(json!({
                    "sessionId": "gw-7",
                    "requestUrl": "https://gateway.test/verify/gw-7",
                }))
            }),
        );
        let base_url = spawn_gateway(router).await;
        let pending = Arc::new(PendingCallbacks::new());
        let provider = GatewayProofProvider::new(
            base_url,
            "http://verifier/callback".to_string(),
            pending.clone(),
        );

        let session = provider.init(&credentials(), "provider-1").await.unwrap();
        let (callback, receiver) = SessionCallback::channel();
        session.start_session(callback).await.unwrap();
        assert_eq!(pending.len(), 1);

        drop(session);

        assert!(pending.is_empty());
        assert!(receiver.await.is_err());
        assert!(!pending.resolve("gw-7", Ok(json!({ "ok": true }))));
    }

    #[tokio::test]
    async fn test_init_maps_gateway_errors() {
        let router = Router::new().route(
            "/v1/sessions",
            post(|Json(request): Json<SessionInitRequest>| async move {
                match request.provider_id.as_str() {
                    "forbidden" => (HttpStatus::UNAUTHORIZED, "bad secret"),
                    "missing" => (HttpStatus::NOT_FOUND, "no such provider"),
                    _ => (HttpStatus::BAD_GATEWAY, "upstream down"),
                }
            }),
        );
        let base_url = spawn_gateway(router).await;
        let provider = GatewayProofProvider::new(
            base_url,
            "http://verifier/callback".to_string(),
            Arc::new(PendingCallbacks::new()),
        );

        assert!(matches!(
            provider.init(&credentials(), "forbidden").await,
            Err(ProviderError::CredentialsRejected)
        ));
        assert!(matches!(
            provider.init(&credentials(), "missing").await,
            Err(ProviderError::UnknownProvider(id)) if id == "missing"
        ));
        assert!(matches!(
            provider.init(&credentials(), "other").await,
            Err(ProviderError::InvalidGatewayResponse(message)) if message.contains("upstream down")
        ));
    }

    #[test]
    fn test_resolve_unknown_or_repeated_session() {
        let pending = PendingCallbacks::new();
        let (callback, _receiver) = SessionCallback::channel();
        pending.register("gw-1".to_string(), callback);

        assert!(!pending.resolve("gw-2", Err("nope".to_string())));
        assert!(pending.resolve("gw-1", Err("declined".to_string())));
        assert!(!pending.resolve("gw-1", Err("declined".to_string())));
    }
}
