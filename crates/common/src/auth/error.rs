//! Error type for the auth coordination core

/// Errors produced by the refresh path.
///
/// Both variants are terminal for the session: the request executor reacts
/// to either by running the logout guard. `Clone` because a single refresh
/// outcome is fanned out to every caller attached to the in-flight attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Refresh was needed but no refresh token is stored.
    NoRefreshToken,

    /// The refresh call failed: transport error, non-success status,
    /// malformed payload, or a server-side rejection.
    RefreshFailed(String),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRefreshToken => write!(f, "No refresh token available"),
            Self::RefreshFailed(msg) => write!(f, "Token refresh failed: {msg}"),
        }
    }
}

impl std::error::Error for AuthError {}
