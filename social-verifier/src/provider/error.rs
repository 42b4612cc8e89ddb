use thiserror::Error;

/// Errors raised by a proof collaborator while setting up a session
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The collaborator refused the application credentials
    #[error("Credentials rejected")]
    CredentialsRejected,

    /// The collaborator does not know the requested provider template
    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    /// Network error when communicating with the proof gateway
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// Unexpected response format or status from the proof gateway
    #[error("Gateway error: {0}")]
    InvalidGatewayResponse(String),

    /// The session could not be registered for completion
    #[error("Session not started: {0}")]
    SessionNotStarted(String),
}
