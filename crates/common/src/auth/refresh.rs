//! Single-flight token refresh
//!
//! Guarantees that no matter how many requests observe a 401 concurrently,
//! at most one network refresh call is outstanding, and every caller that
//! arrived while it was in flight observes the identical outcome.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::error::AuthError;
use super::traits::{CredentialStore, RefreshApi};
use super::types::keys;

type RefreshOutcome = Result<String, AuthError>;
type OutcomeReceiver = watch::Receiver<Option<RefreshOutcome>>;

/// In-process coordination state. Never persisted.
enum RefreshState {
    /// No refresh in progress.
    Idle,
    /// A refresh call is outstanding; the receiver resolves once for every
    /// caller that attached while it was in flight.
    InFlight(OutcomeReceiver),
}

/// How the current caller participates in the refresh.
enum Claim {
    Driver(watch::Sender<Option<RefreshOutcome>>),
    Waiter(OutcomeReceiver),
}

/// Restores the state to `Idle` when the driving caller finishes or is
/// cancelled mid-refresh. Without this, a cancelled driver would leave the
/// state `InFlight` forever and strand every future caller.
struct IdleOnDrop<'a> {
    state: &'a Mutex<RefreshState>,
}

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        *self.state.lock() = RefreshState::Idle;
    }
}

/// Single-flight coordinator for token refresh.
///
/// The state mutex is only ever held for the `Idle`/`InFlight` transition,
/// never across an await, so the coordinator is correct under true parallel
/// threads as well as cooperative scheduling.
pub struct RefreshCoordinator<S, R> {
    store: Arc<S>,
    api: Arc<R>,
    state: Mutex<RefreshState>,
}

impl<S, R> RefreshCoordinator<S, R>
where
    S: CredentialStore,
    R: RefreshApi,
{
    /// Create a new coordinator over the given store and refresh endpoint.
    #[must_use]
    pub fn new(store: Arc<S>, api: Arc<R>) -> Self {
        Self { store, api, state: Mutex::new(RefreshState::Idle) }
    }

    /// Ensure a refresh has run, sharing an in-flight attempt if one exists.
    ///
    /// The first caller that finds the coordinator idle claims the attempt
    /// and issues exactly one network call; every caller that arrives while
    /// that call is outstanding attaches to it and observes the same
    /// outcome. Callers that arrive after the attempt has resolved start a
    /// fresh one.
    ///
    /// On success the new access token has already been written to the
    /// credential store before any caller observes it.
    ///
    /// # Errors
    /// Returns [`AuthError::NoRefreshToken`] if no refresh token is stored,
    /// or [`AuthError::RefreshFailed`] if the refresh call fails in any way.
    /// No retry is attempted here; retry policy belongs to the caller.
    pub async fn ensure_refreshed(&self) -> RefreshOutcome {
        let claim = {
            let mut state = self.state.lock();
            match &*state {
                RefreshState::InFlight(rx) => Claim::Waiter(rx.clone()),
                RefreshState::Idle => {
                    let (tx, rx) = watch::channel(None);
                    *state = RefreshState::InFlight(rx);
                    Claim::Driver(tx)
                }
            }
        };

        match claim {
            Claim::Driver(tx) => {
                let reset = IdleOnDrop { state: &self.state };
                let outcome = self.refresh_once().await;
                // Back to Idle before publishing: callers arriving from here
                // on must start a fresh attempt, never reuse this outcome.
                drop(reset);
                let _ = tx.send(Some(outcome.clone()));
                outcome
            }
            Claim::Waiter(mut rx) => {
                debug!("attaching to in-flight token refresh");
                loop {
                    let settled = rx.borrow_and_update().as_ref().cloned();
                    if let Some(outcome) = settled {
                        return outcome;
                    }
                    if rx.changed().await.is_err() {
                        // Driver dropped without publishing (cancelled).
                        return Err(AuthError::RefreshFailed(
                            "refresh attempt was abandoned".to_string(),
                        ));
                    }
                }
            }
        }
    }

    /// Perform one refresh attempt against the store and the endpoint.
    async fn refresh_once(&self) -> RefreshOutcome {
        let Some(refresh_token) = self.store.get(keys::REFRESH_TOKEN).await else {
            warn!("refresh requested but no refresh token is stored");
            return Err(AuthError::NoRefreshToken);
        };

        match self.api.refresh_access_token(&refresh_token).await {
            Ok(access_token) => {
                self.store.set(keys::ACCESS_TOKEN, &access_token).await;
                info!("access token refreshed");
                Ok(access_token)
            }
            Err(e) => {
                warn!("token refresh failed: {e}");
                Err(e)
            }
        }
    }
}
