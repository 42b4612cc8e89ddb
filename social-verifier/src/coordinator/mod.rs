//! Lifecycle of a single verification attempt.
//!
//! The coordinator resolves the selected platform to a provider identifier,
//! opens a session at the proof collaborator, publishes the shareable link and
//! waits for the collaborator to report back:
//!
//! `Idle -> Initializing -> AwaitingCallback -> {Succeeded | Failed}`
//!
//! Selecting another platform returns to `Idle` from any phase. The abandoned
//! session is not cancelled at the collaborator. The coordinator holds the
//! active `ProofSession` and drops it when the session is replaced, which lets
//! the collaborator stop waiting for it; a late callback that still arrives is
//! dropped because every session carries a token and only the active token is
//! accepted. A setup that is cancelled midway, e.g. by a request timeout,
//! returns to `Idle` with "Setup failed".
//!
//! State lives in a `watch` channel. Each transition is one `send_modify`, so
//! subscribers always see the proof, the profile link and the derived
//! `verified` flag from the same instant.

pub mod error;
pub mod view;

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{oneshot, watch};
use tracing::{debug, error, info, instrument, warn};

use crate::{
    platform::{Platform, ProviderRegistry},
    proof::Proof,
    provider::{
        AppCredentials, CallbackOutcome, ProofProvider, ProofSession, ProviderError,
        SessionCallback,
    },
};

pub use error::VerificationError;
pub use view::{SessionPhase, SessionToken, Status, VerificationView};

/// Consumer of accepted proofs, e.g. persistence or audit logging
pub trait ProofListener: Send + Sync {
    fn on_proof_received(&self, proof: &Proof);
}

impl<F> ProofListener for F
where
    F: Fn(&Proof) + Send + Sync,
{
    fn on_proof_received(&self, proof: &Proof) {
        self(proof);
    }
}

/// Listener that writes every accepted proof to the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogProofListener;

impl ProofListener for LogProofListener {
    fn on_proof_received(&self, proof: &Proof) {
        info!(proof = %proof, "Proof received");
    }
}

/// Drives one verification attempt end-to-end.
///
/// Cloning is cheap; clones share the same state.
#[derive(Clone)]
pub struct ProofRequestCoordinator {
    provider: Arc<dyn ProofProvider>,
    registry: Arc<ProviderRegistry>,
    credentials: AppCredentials,
    listener: Arc<dyn ProofListener>,
    state: Arc<watch::Sender<VerificationView>>,
    /// Session behind `state.session`, once its setup completed
    active_session: Arc<Mutex<Option<Box<dyn ProofSession>>>>,
}

/// Returns a session to `Idle` if its setup ends without being disarmed
struct SetupGuard<'a> {
    coordinator: &'a ProofRequestCoordinator,
    token: SessionToken,
    armed: bool,
}

impl<'a> SetupGuard<'a> {
    const fn new(coordinator: &'a ProofRequestCoordinator, token: SessionToken) -> Self {
        Self {
            coordinator,
            token,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for SetupGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            warn!(token = %self.token, "Verification setup abandoned before completing");
            self.coordinator
                .update_if_active(self.token, VerificationView::abort_setup);
        }
    }
}

impl ProofRequestCoordinator {
    #[must_use]
    pub fn new(
        provider: Arc<dyn ProofProvider>,
        registry: ProviderRegistry,
        credentials: AppCredentials,
        listener: Arc<dyn ProofListener>,
    ) -> Self {
        let (state, _) = watch::channel(VerificationView::default());
        Self {
            provider,
            registry: Arc::new(registry),
            credentials,
            listener,
            state: Arc::new(state),
            active_session: Arc::new(Mutex::new(None)),
        }
    }

    /// Current state
    #[must_use]
    pub fn snapshot(&self) -> VerificationView {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<VerificationView> {
        self.state.subscribe()
    }

    /// Registry used to resolve platforms
    #[must_use]
    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    /// Selects `platform`, discarding any session in progress
    ///
    /// # Errors
    ///
    /// Returns `VerificationError::UnknownPlatform` and leaves the state untouched
    /// if the platform has no provider mapping
    pub fn select_platform(&self, platform: &str) -> Result<Platform, VerificationError> {
        let (platform, _) = self.registry.resolve(platform)?;
        let released = self.with_active_session(|active| {
            self.state.send_modify(|view| {
                if let Some(token) = view.session {
                    debug!(%token, "Discarding session on platform change");
                }
                view.reset(platform);
            });
            active.take()
        });
        if released.is_some() {
            debug!("Released abandoned session");
        }
        Ok(platform)
    }

    /// Stores the profile link the user claims and re-runs reconciliation
    pub fn set_profile_link(&self, profile_link: impl Into<String>) -> bool {
        let profile_link = profile_link.into();
        let mut verified = false;
        self.state.send_modify(|view| {
            view.set_profile_link(profile_link);
            verified = view.verified;
        });
        verified
    }

    /// Starts a verification for `platform` and returns the shareable request url.
    ///
    /// Selecting a different platform than the current one resets the state first.
    /// The outcome arrives later through the collaborator's callback.
    ///
    /// # Errors
    ///
    /// - `VerificationError::UnknownPlatform` - no provider mapping, the collaborator is not contacted
    /// - `VerificationError::SessionInitialization` - the collaborator failed to open the session
    #[instrument(skip(self))]
    pub async fn start_verification(&self, platform: &str) -> Result<String, VerificationError> {
        let (platform, provider_id) = match self.registry.resolve(platform) {
            Ok((platform, provider_id)) => (platform, provider_id.to_string()),
            Err(err) => {
                warn!("Rejecting verification: {err}");
                self.state
                    .send_modify(|view| view.status = Status::InvalidPlatform);
                return Err(err);
            }
        };

        let token = SessionToken::new();
        let released = self.with_active_session(|active| {
            self.state.send_modify(|view| {
                if view.platform != platform {
                    view.reset(platform);
                }
                view.begin(token);
            });
            active.take()
        });
        if let Some(session) = released {
            drop(session);
            debug!(%token, "Released previous session");
        }
        info!(%token, %platform, "Initializing verification");

        // Dropping this future before `open_session` resolves aborts the setup
        let guard = SetupGuard::new(self, token);
        let result = self.open_session(token, &provider_id).await;

        match result {
            Ok(request_url) => {
                self.update_if_active(token, |view| view.loading = false);
                guard.disarm();
                Ok(request_url)
            }
            Err(err) => {
                error!(%token, "Verification setup failed: {err}");
                self.update_if_active(token, VerificationView::abort_setup);
                guard.disarm();
                Err(VerificationError::SessionInitialization(err))
            }
        }
    }

    async fn open_session(
        &self,
        token: SessionToken,
        provider_id: &str,
    ) -> Result<String, ProviderError> {
        let session = self.provider.init(&self.credentials, provider_id).await?;
        let request_url = session.request_url().await?;

        let url = request_url.clone();
        self.update_if_active(token, move |view| view.await_callback(url));
        info!(%token, "Verification started");

        let (callback, receiver) = SessionCallback::channel();
        session.start_session(callback).await?;
        self.watch_callback(token, receiver);
        self.retain_session(token, session);

        Ok(request_url)
    }

    /// Keeps `session` alive while `token` is the active session
    fn retain_session(&self, token: SessionToken, session: Box<dyn ProofSession>) {
        let superseded = self.with_active_session(|active| {
            if self.state.borrow().is_active(token) {
                *active = Some(session);
                None
            } else {
                Some(session)
            }
        });
        if superseded.is_some() {
            debug!(%token, "Session superseded during setup, releasing it");
        }
    }

    /// Runs `f` with exclusive access to the active session slot.
    ///
    /// State changes that replace the active token happen inside `f`, so the
    /// slot never holds a session that belongs to an older token.
    fn with_active_session<R>(
        &self,
        f: impl FnOnce(&mut Option<Box<dyn ProofSession>>) -> R,
    ) -> R {
        let mut active = self
            .active_session
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        f(&mut active)
    }

    /// Routes the session outcome back into the coordinator once it arrives
    fn watch_callback(&self, token: SessionToken, receiver: oneshot::Receiver<CallbackOutcome>) {
        let coordinator = self.clone();
        tokio::spawn(async move {
            match receiver.await {
                Ok(outcome) => {
                    if let Err(err) = coordinator.on_session_callback(token, outcome) {
                        debug!(%token, "Session callback not applied: {err}");
                    }
                }
                Err(_) => debug!(%token, "Session dropped without reporting"),
            }
        });
    }

    /// Applies the collaborator's report for session `token`.
    ///
    /// Only a structured object is accepted as a proof; an explicit error,
    /// `null` or any primitive fails the session. Reports for sessions that are
    /// not active, or that already completed, are ignored.
    ///
    /// # Errors
    ///
    /// - `VerificationError::Callback` - the session failed
    /// - `VerificationError::InactiveSession` - the report was ignored
    #[instrument(skip(self, outcome))]
    pub fn on_session_callback(
        &self,
        token: SessionToken,
        outcome: CallbackOutcome,
    ) -> Result<(), VerificationError> {
        let proof = match outcome {
            Ok(payload) => Proof::from_payload(payload)
                .ok_or_else(|| VerificationError::Callback("Invalid proof received".to_string())),
            Err(message) => Err(VerificationError::Callback(message)),
        };

        let mut applied = false;
        self.state.send_if_modified(|view| {
            if !view.is_active(token) || view.phase != SessionPhase::AwaitingCallback {
                return false;
            }
            match &proof {
                Ok(proof) => view.succeed(proof.clone()),
                Err(_) => view.fail(),
            }
            applied = true;
            true
        });

        if !applied {
            warn!(%token, "Ignoring callback for inactive session");
            return Err(VerificationError::InactiveSession(token));
        }

        match proof {
            Ok(proof) => {
                info!(%token, "Verification successful");
                self.listener.on_proof_received(&proof);
                Ok(())
            }
            Err(err) => {
                warn!(%token, "Verification failed: {err}");
                Err(err)
            }
        }
    }

    /// Applies `update` only while `token` is still the active session
    fn update_if_active<F>(&self, token: SessionToken, update: F)
    where
        F: FnOnce(&mut VerificationView),
    {
        let mut update = Some(update);
        self.state.send_if_modified(|view| {
            if !view.is_active(token) {
                return false;
            }
            if let Some(update) = update.take() {
                update(view);
            }
            true
        });
    }
}
