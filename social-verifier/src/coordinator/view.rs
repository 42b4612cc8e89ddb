use std::fmt;

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::{platform::Platform, proof::Proof, reconciler::reconcile};

/// Identity of one verification session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub struct SessionToken(#[schemars(with = "String")] Uuid);

impl SessionToken {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionToken {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Lifecycle phase of the current verification attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    #[default]
    Idle,
    Initializing,
    AwaitingCallback,
    Succeeded,
    Failed,
}

/// Status line shown to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema, Display)]
pub enum Status {
    #[default]
    #[serde(rename = "")]
    #[strum(to_string = "")]
    Ready,
    #[serde(rename = "Invalid social media platform.")]
    #[strum(to_string = "Invalid social media platform.")]
    InvalidPlatform,
    #[serde(rename = "Initializing verification...")]
    #[strum(to_string = "Initializing verification...")]
    Initializing,
    #[serde(rename = "Ready for verification")]
    #[strum(to_string = "Ready for verification")]
    AwaitingVerification,
    #[serde(rename = "Verification successful!")]
    #[strum(to_string = "Verification successful!")]
    Verified,
    #[serde(rename = "Verification failed")]
    #[strum(to_string = "Verification failed")]
    VerificationFailed,
    #[serde(rename = "Setup failed")]
    #[strum(to_string = "Setup failed")]
    SetupFailed,
}

impl Status {
    /// Whether the status reports a failure
    #[must_use]
    pub const fn is_failure(self) -> bool {
        matches!(
            self,
            Self::InvalidPlatform | Self::VerificationFailed | Self::SetupFailed
        )
    }
}

/// Snapshot of the coordinator state, published on every change
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationView {
    /// Platform currently selected
    pub platform: Platform,
    pub phase: SessionPhase,
    pub status: Status,
    /// Active session, absent while idle
    pub session: Option<SessionToken>,
    /// Shareable link of the active session
    pub request_url: Option<String>,
    /// Proof received for the active session
    pub proof: Option<Proof>,
    /// Profile link the user claims to own
    pub profile_link: String,
    /// Whether `profile_link` matches the username verified by `proof`
    pub verified: bool,
    /// Set while the session is being opened
    pub loading: bool,
    #[schemars(with = "Option<String>")]
    pub started_at: Option<DateTime<Utc>>,
}

impl VerificationView {
    /// Whether `token` identifies the active session
    #[must_use]
    pub fn is_active(&self, token: SessionToken) -> bool {
        self.session == Some(token)
    }

    /// Drops the current session and everything derived from it, keeping the profile link
    pub(crate) fn reset(&mut self, platform: Platform) {
        *self = Self {
            platform,
            profile_link: std::mem::take(&mut self.profile_link),
            ..Self::default()
        };
        self.recompute();
    }

    pub(crate) fn begin(&mut self, token: SessionToken) {
        self.phase = SessionPhase::Initializing;
        self.status = Status::Initializing;
        self.session = Some(token);
        self.request_url = None;
        self.proof = None;
        self.loading = true;
        self.started_at = Some(Utc::now());
        self.recompute();
    }

    pub(crate) fn await_callback(&mut self, request_url: String) {
        self.phase = SessionPhase::AwaitingCallback;
        self.status = Status::AwaitingVerification;
        self.request_url = Some(request_url);
    }

    pub(crate) fn abort_setup(&mut self) {
        self.phase = SessionPhase::Idle;
        self.status = Status::SetupFailed;
        self.session = None;
        self.request_url = None;
        self.loading = false;
        self.started_at = None;
    }

    pub(crate) fn succeed(&mut self, proof: Proof) {
        self.phase = SessionPhase::Succeeded;
        self.status = Status::Verified;
        self.proof = Some(proof);
        self.recompute();
    }

    pub(crate) fn fail(&mut self) {
        self.phase = SessionPhase::Failed;
        self.status = Status::VerificationFailed;
    }

    pub(crate) fn set_profile_link(&mut self, profile_link: String) {
        self.profile_link = profile_link;
        self.recompute();
    }

    /// Keeps `verified` in step with the proof and profile link it derives from
    fn recompute(&mut self) {
        self.verified = reconcile(self.proof.as_ref(), &self.profile_link);
    }
}
