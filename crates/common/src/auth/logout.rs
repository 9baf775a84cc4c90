//! One-shot logout transition
//!
//! When refresh fails, every concurrent request converges here; the
//! clear-credentials-and-notify sequence must run exactly once per session
//! lifetime no matter how many callers race into it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::warn;

use super::traits::{CredentialStore, SessionNotifier};

/// Idempotent guard around the logged-out transition.
pub struct LogoutGuard<S, N> {
    store: Arc<S>,
    notifier: Arc<N>,
    logged_out: AtomicBool,
}

impl<S, N> LogoutGuard<S, N>
where
    S: CredentialStore,
    N: SessionNotifier,
{
    /// Create a guard over the given store and notifier.
    #[must_use]
    pub fn new(store: Arc<S>, notifier: Arc<N>) -> Self {
        Self { store, notifier, logged_out: AtomicBool::new(false) }
    }

    /// Run the logged-out transition if it has not run yet.
    ///
    /// The first caller wins the flag, clears every credential-store entry
    /// and invokes the session notifier; concurrent losers and all later
    /// callers return immediately. The notifier call is synchronous from
    /// the guard's point of view - no UI acknowledgment is awaited.
    pub async fn trigger(&self) {
        if self.logged_out.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst).is_err()
        {
            return;
        }

        warn!("session expired; clearing credentials");
        self.store.clear_all().await;
        self.notifier.notify_session_expired();
    }

    /// Whether the logged-out transition has already run.
    #[must_use]
    pub fn is_logged_out(&self) -> bool {
        self.logged_out.load(Ordering::SeqCst)
    }

    /// Re-arm the guard after a new successful login.
    ///
    /// Called by the host application's login flow, which owns session
    /// creation.
    pub fn reset(&self) {
        self.logged_out.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for auth::logout.
    use super::*;
    use crate::auth::types::keys;
    use crate::testing::mocks::{MemoryCredentialStore, RecordingNotifier};

    fn guard_with_session() -> (
        Arc<MemoryCredentialStore>,
        Arc<RecordingNotifier>,
        LogoutGuard<MemoryCredentialStore, RecordingNotifier>,
    ) {
        let store = MemoryCredentialStore::new();
        store.insert(keys::ACCESS_TOKEN, "access");
        store.insert(keys::REFRESH_TOKEN, "refresh");
        store.insert(keys::USER_ID, "42");
        let store = Arc::new(store);
        let notifier = Arc::new(RecordingNotifier::new());
        let guard = LogoutGuard::new(store.clone(), notifier.clone());
        (store, notifier, guard)
    }

    #[tokio::test]
    async fn test_trigger_clears_store_and_notifies() {
        let (store, notifier, guard) = guard_with_session();

        guard.trigger().await;

        assert!(guard.is_logged_out());
        assert!(store.is_empty());
        assert_eq!(notifier.expired_count(), 1);
    }

    #[tokio::test]
    async fn test_repeated_triggers_are_noops() {
        let (store, notifier, guard) = guard_with_session();

        guard.trigger().await;
        guard.trigger().await;
        guard.trigger().await;

        assert_eq!(store.clear_count(), 1);
        assert_eq!(notifier.expired_count(), 1);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_triggers_run_once() {
        let (store, notifier, guard) = guard_with_session();
        let guard = Arc::new(guard);

        let mut handles = Vec::new();
        for _ in 0..16 {
            let guard = guard.clone();
            handles.push(tokio::spawn(async move { guard.trigger().await }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.clear_count(), 1);
        assert_eq!(notifier.expired_count(), 1);
    }

    #[tokio::test]
    async fn test_reset_rearms_the_guard() {
        let (store, notifier, guard) = guard_with_session();

        guard.trigger().await;
        guard.reset();
        assert!(!guard.is_logged_out());

        store.insert(keys::ACCESS_TOKEN, "new-session");
        guard.trigger().await;

        assert_eq!(store.clear_count(), 2);
        assert_eq!(notifier.expired_count(), 2);
    }
}
