use thiserror::Error;

use super::view::SessionToken;
use crate::provider::ProviderError;

/// Error types for a verification attempt
#[derive(Debug, Error)]
pub enum VerificationError {
    /// The platform has no provider mapping; the collaborator was not contacted
    #[error("Unknown platform: {0}")]
    UnknownPlatform(String),

    /// Credential or network failure while opening the session
    #[error("Session setup failed: {0}")]
    SessionInitialization(#[from] ProviderError),

    /// The collaborator reported an error or delivered a malformed payload
    #[error("Verification failed: {0}")]
    Callback(String),

    /// A callback arrived for a session that is no longer the active one
    #[error("Session {0} is not active")]
    InactiveSession(SessionToken),
}

impl VerificationError {
    /// Whether restarting the flow may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::SessionInitialization(_) | Self::Callback(_))
    }
}
