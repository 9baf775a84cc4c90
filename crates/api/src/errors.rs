//! Gateway-specific error types

use std::time::Duration;

use thiserror::Error;
use tokengate_common::auth::AuthError;

/// Errors surfaced by the request executor.
///
/// Non-401 HTTP statuses are deliberately absent: they are data, returned
/// to the caller verbatim inside the response. Only the 401/refresh/logout
/// path and transport-level failures are owned here.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Refresh failed; the session has been logged out and the in-flight
    /// business operation is abandoned.
    #[error("Session expired")]
    SessionExpired(#[source] AuthError),

    /// Transport-level failure of the wrapped request.
    #[error("Network error: {0}")]
    Network(String),

    /// The wrapped request exceeded the configured timeout.
    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    /// Client construction or configuration failure.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl GatewayError {
    /// Whether this error means the session is gone and the caller should
    /// stop issuing authenticated requests.
    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired(_))
    }
}
