//! Session and refresh wire types
//!
//! Defines the credential-store key space, the session snapshot used by the
//! request executor, and the wire format of the refresh endpoint.

use serde::{Deserialize, Serialize};

use super::traits::CredentialStore;

/// Credential-store keys owned by the session.
///
/// The gateway itself only reads [`keys::ACCESS_TOKEN`] and
/// [`keys::REFRESH_TOKEN`]; the profile keys are written by the external
/// login flow and removed together with the tokens on logout.
pub mod keys {
    /// Short-lived bearer token attached to outgoing requests.
    pub const ACCESS_TOKEN: &str = "ACCESS_TOKEN";
    /// Long-lived credential used solely to obtain a new access token.
    pub const REFRESH_TOKEN: &str = "REFRESH_TOKEN";
    /// Identifier of the logged-in user.
    pub const USER_ID: &str = "USER_ID";
    /// Display name shown by the host application.
    pub const FIRST_NAME: &str = "FIRST_NAME";
    /// Avatar URL shown by the host application.
    pub const PROFILE_IMAGE: &str = "PROFILE_IMAGE";
}

/// Snapshot of the stored session tokens.
///
/// Loaded from the credential store at the start of an operation and never
/// cached beyond it; the store remains the single source of truth.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Current access token, if any.
    pub access_token: Option<String>,
    /// Current refresh token, if any.
    pub refresh_token: Option<String>,
}

impl Session {
    /// Load the current session tokens from the credential store.
    pub async fn load<S: CredentialStore + ?Sized>(store: &S) -> Self {
        Self {
            access_token: store.get(keys::ACCESS_TOKEN).await,
            refresh_token: store.get(keys::REFRESH_TOKEN).await,
        }
    }

    /// Whether an access token is currently present.
    ///
    /// Presence does not imply validity; the server remains the authority
    /// and signals staleness with a 401.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }
}

/// Request body for the refresh endpoint.
#[derive(Debug, Serialize)]
pub struct RefreshRequest<'a> {
    /// Refresh token presented to the server.
    pub refresh_token: &'a str,
}

/// Response body of the refresh endpoint.
///
/// The server signals acceptance with `status: true` and a fresh access
/// token. Anything else - `status` missing or false, a missing or empty
/// token, or a body that does not deserialize at all - is a failed refresh.
#[derive(Debug, Deserialize)]
pub struct RefreshResponse {
    /// Server-side acceptance flag.
    #[serde(default)]
    pub status: bool,
    /// New access token when the refresh was accepted.
    #[serde(default)]
    pub access_token: Option<String>,
}

impl RefreshResponse {
    /// Extract the new access token if the refresh was accepted.
    #[must_use]
    pub fn into_accepted_token(self) -> Option<String> {
        match self {
            Self { status: true, access_token: Some(token) } if !token.is_empty() => Some(token),
            _ => None,
        }
    }
}
