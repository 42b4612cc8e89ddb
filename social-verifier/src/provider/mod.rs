//! Boundary to the external proof collaborator.
//!
//! The collaborator negotiates the verification out of band and reports back
//! once per session. It is modelled with three capabilities:
//! - `ProofProvider::init` opens a session for a provider template
//! - `ProofSession::request_url` yields the shareable link
//! - `ProofSession::start_session` registers the completion callback
//!
//! # Components
//! - `error`: failures while opening a session
//! - `gateway`: HTTP adapter that talks to a proof gateway service

pub mod error;
pub mod gateway;

use std::fmt;

use tokio::sync::oneshot;

pub use error::ProviderError;

/// Raw result reported by the collaborator: a payload on success, a message on error
pub type CallbackOutcome = Result<serde_json::Value, String>;

/// Application credentials presented to the collaborator
#[derive(Clone)]
pub struct AppCredentials {
    app_id: String,
    app_secret: String,
}

impl AppCredentials {
    #[must_use]
    pub const fn new(app_id: String, app_secret: String) -> Self {
        Self { app_id, app_secret }
    }

    #[must_use]
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    #[must_use]
    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }
}

impl fmt::Debug for AppCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppCredentials")
            .field("app_id", &self.app_id)
            .field("app_secret", &"<redacted>")
            .finish()
    }
}

/// Completion handle for one session.
///
/// Consumed on delivery, so a session can report at most once.
#[derive(Debug)]
pub struct SessionCallback {
    sender: oneshot::Sender<CallbackOutcome>,
}

impl SessionCallback {
    /// Creates a callback and the receiver its outcome is delivered to
    #[must_use]
    pub fn channel() -> (Self, oneshot::Receiver<CallbackOutcome>) {
        let (sender, receiver) = oneshot::channel();
        (Self { sender }, receiver)
    }

    /// Delivers the session outcome
    pub fn deliver(self, outcome: CallbackOutcome) {
        if self.sender.send(outcome).is_err() {
            tracing::debug!("Session outcome dropped, nobody is waiting for it");
        }
    }

    /// Reports a successful session with the collaborator's payload
    pub fn succeed(self, payload: serde_json::Value) {
        self.deliver(Ok(payload));
    }

    /// Reports a failed session
    pub fn fail(self, error: impl Into<String>) {
        self.deliver(Err(error.into()));
    }
}

/// Factory for verification sessions
#[async_trait::async_trait]
pub trait ProofProvider: Send + Sync {
    /// Opens a session for `provider_id` using the application credentials
    async fn init(
        &self,
        credentials: &AppCredentials,
        provider_id: &str,
    ) -> Result<Box<dyn ProofSession>, ProviderError>;
}

/// One in-flight verification at the collaborator
#[async_trait::async_trait]
pub trait ProofSession: Send + Sync {
    /// Shareable link the end user opens to complete verification
    async fn request_url(&self) -> Result<String, ProviderError>;

    /// Starts waiting for the outcome, which is reported through `callback`
    async fn start_session(&self, callback: SessionCallback) -> Result<(), ProviderError>;
}
