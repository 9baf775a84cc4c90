//! Mock implementations of the collaborator traits
//!
//! Deterministic in-memory stand-ins for the credential store, the session
//! notifier, and the refresh endpoint. All of them count their side effects
//! so tests can assert exactly-once semantics.

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::auth::error::AuthError;
use crate::auth::traits::{CredentialStore, RefreshApi, SessionNotifier};
use crate::auth::types::keys;

/// In-memory credential store.
///
/// Writes go through a mutex-protected map, so concurrent readers never
/// observe a half-written value. Counts `clear_all` invocations so tests
/// can assert the store is wiped exactly once.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    data: Mutex<HashMap<String, String>>,
    clear_calls: AtomicUsize,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store seeded with an access and a refresh token.
    #[must_use]
    pub fn with_session(access_token: &str, refresh_token: &str) -> Self {
        let store = Self::new();
        store.insert(keys::ACCESS_TOKEN, access_token);
        store.insert(keys::REFRESH_TOKEN, refresh_token);
        store
    }

    /// Insert a value synchronously (test setup convenience).
    pub fn insert(&self, key: &str, value: &str) {
        self.data.lock().insert(key.to_string(), value.to_string());
    }

    /// Whether the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.lock().is_empty()
    }

    /// Number of times `clear_all` has run.
    #[must_use]
    pub fn clear_count(&self) -> usize {
        self.clear_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn get(&self, key: &str) -> Option<String> {
        self.data.lock().get(key).cloned()
    }

    async fn set(&self, key: &str, value: &str) {
        self.data.lock().insert(key.to_string(), value.to_string());
    }

    async fn clear_all(&self) {
        self.data.lock().clear();
        self.clear_calls.fetch_add(1, Ordering::SeqCst);
    }
}

/// Session notifier that records how many times it fired.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    expired: AtomicUsize,
}

impl RecordingNotifier {
    /// Create a notifier with a zeroed counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of "session expired" signals received.
    #[must_use]
    pub fn expired_count(&self) -> usize {
        self.expired.load(Ordering::SeqCst)
    }
}

impl SessionNotifier for RecordingNotifier {
    fn notify_session_expired(&self) {
        self.expired.fetch_add(1, Ordering::SeqCst);
    }
}

/// Scripted refresh endpoint.
///
/// Returns queued outcomes in order and counts calls; an optional delay
/// holds each call open so tests can pile up concurrent callers against a
/// single in-flight refresh.
#[derive(Debug, Default)]
pub struct ScriptedRefreshApi {
    outcomes: Mutex<VecDeque<Result<String, AuthError>>>,
    delay: Option<Duration>,
    calls: AtomicUsize,
}

impl ScriptedRefreshApi {
    /// Create an endpoint with no scripted outcomes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Hold every call open for `delay` before resolving.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queue a successful refresh yielding `token`.
    #[must_use]
    pub fn push_success(self, token: &str) -> Self {
        self.outcomes.lock().push_back(Ok(token.to_string()));
        self
    }

    /// Queue a failed refresh with the given message.
    #[must_use]
    pub fn push_failure(self, message: &str) -> Self {
        self.outcomes.lock().push_back(Err(AuthError::RefreshFailed(message.to_string())));
        self
    }

    /// Number of refresh calls received.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RefreshApi for ScriptedRefreshApi {
    async fn refresh_access_token(&self, _refresh_token: &str) -> Result<String, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcomes
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(AuthError::RefreshFailed("no scripted outcome".to_string())))
    }
}
