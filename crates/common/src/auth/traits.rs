//! Traits for the gateway's external collaborators
//!
//! These traits enable dependency injection and testing by abstracting the
//! credential store, the session-expiry notifier, and the refresh endpoint.

use async_trait::async_trait;

use super::error::AuthError;

/// Durable key-value store holding the session credentials.
///
/// The gateway only reads and overwrites entries; lifecycle and persistence
/// format belong to the host application. Implementations must make writes
/// atomic with respect to concurrent reads - a reader must never observe a
/// half-written value.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Read the value stored under `key`, if any.
    async fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str);

    /// Remove every stored entry, tokens and derived session fields alike.
    async fn clear_all(&self);
}

/// Sink for the "session expired" signal.
///
/// Fire-and-forget from the gateway's point of view: the host application
/// owns presentation (dialog, redirect) and no return value is consumed.
pub trait SessionNotifier: Send + Sync {
    /// Announce that the session can no longer be refreshed.
    fn notify_session_expired(&self);
}

/// The network refresh operation.
///
/// Abstracted so the coordinator can be driven by a scripted implementation
/// in tests; [`super::client::RefreshClient`] is the production
/// implementation.
#[async_trait]
pub trait RefreshApi: Send + Sync {
    /// Exchange a refresh token for a new access token.
    ///
    /// # Errors
    /// Returns [`AuthError::RefreshFailed`] on transport failure, a
    /// non-success status, a malformed payload, or server-side rejection.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AuthError>;
}
