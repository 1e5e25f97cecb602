use thiserror::Error;

/// Failures from the session operations (`login`, `signup`, `logout`,
/// `boot`). Every variant renders to a display-ready message; the session
/// manager guarantees no state or storage mutation happened on any of them.
#[derive(Error, Debug)]
pub enum AuthError {
    /// Bad input caught locally, before any network call.
    #[error("{0}")]
    Validation(String),

    /// Could not reach the authentication endpoint.
    #[error("Connection error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server rejected the attempt with a non-2xx status. The message
    /// comes from the server's error payload when present, otherwise a
    /// generic fallback.
    #[error("{message}")]
    Rejected {
        status: reqwest::StatusCode,
        message: String,
    },

    /// The server answered 2xx but the token or user id was missing.
    #[error("Unexpected response from server: {0}")]
    MalformedResponse(String),

    /// The credential store could not be read or written.
    #[error("Credential storage error: {0}")]
    Store(#[source] anyhow::Error),
}
