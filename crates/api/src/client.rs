//! Authenticated request executor
//!
//! Performs one logical authenticated request end-to-end. Per call the
//! state machine is `Sending -> (401?) -> Refreshing -> Retrying -> Done`,
//! or `Sending -> Done` when no 401 occurs; no state is revisited, so a
//! retry that itself returns 401 goes back to the caller verbatim rather
//! than into another refresh cycle.

use std::sync::Arc;
use std::time::Duration;

use reqwest::header::AUTHORIZATION;
use reqwest::{Client, Response, StatusCode};
use tokengate_common::auth::types::keys;
use tokengate_common::auth::{
    CredentialStore, LogoutGuard, RefreshApi, RefreshClient, RefreshCoordinator, SessionNotifier,
};
use tracing::{debug, info, instrument, warn};

use crate::descriptor::RequestDescriptor;
use crate::errors::GatewayError;

/// Configuration for the gateway client.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Base URL prepended to every descriptor path.
    pub base_url: String,
    /// Path of the token refresh endpoint, resolved against `base_url`.
    pub refresh_path: String,
    /// Timeout applied to each send (initial, refresh, retry alike).
    pub timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.example.com".to_string(),
            refresh_path: "/refresh/".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    /// Full URL of the token refresh endpoint.
    #[must_use]
    pub fn refresh_endpoint(&self) -> String {
        format!("{}{}", self.base_url, self.refresh_path)
    }

    /// Build a refresh client pointed at this configuration's endpoint,
    /// sharing its timeout. The usual wiring for hosts that talk to a
    /// single backend.
    #[must_use]
    pub fn refresh_client(&self) -> RefreshClient {
        RefreshClient::new(self.refresh_endpoint(), self.timeout)
    }
}

/// Request executor with token attachment and coordinated recovery.
///
/// Shared across the host application behind an `Arc`; all concurrent
/// callers converge on the same refresh coordinator and logout guard, which
/// is what makes the single-flight and exactly-once guarantees hold.
pub struct GatewayClient<S, R, N> {
    http: Client,
    store: Arc<S>,
    refresh: Arc<RefreshCoordinator<S, R>>,
    logout: Arc<LogoutGuard<S, N>>,
    config: GatewayConfig,
}

impl<S, R, N> GatewayClient<S, R, N>
where
    S: CredentialStore,
    R: RefreshApi,
    N: SessionNotifier,
{
    /// Create a new gateway client.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] if the HTTP client cannot be built.
    pub fn new(
        config: GatewayConfig,
        store: Arc<S>,
        refresh: Arc<RefreshCoordinator<S, R>>,
        logout: Arc<LogoutGuard<S, N>>,
    ) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| GatewayError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, store, refresh, logout, config })
    }

    /// Create a builder for fluent configuration.
    #[must_use]
    pub fn builder() -> GatewayClientBuilder<S, R, N> {
        GatewayClientBuilder::default()
    }

    /// Execute one logical authenticated request.
    ///
    /// Attaches the stored access token (the request still goes out without
    /// an `Authorization` header if none is stored). A 401 response invokes
    /// the shared refresh coordinator; on success the request is retried
    /// exactly once with the new token and that response is returned
    /// verbatim, even if it is itself a 401. Every non-401 response,
    /// including error statuses, is returned unchanged.
    ///
    /// # Errors
    /// Returns [`GatewayError::SessionExpired`] when refresh fails (the
    /// logout guard has run by then), or [`GatewayError::Network`] /
    /// [`GatewayError::Timeout`] for transport failures.
    #[instrument(skip(self, descriptor), fields(method = %descriptor.method(), path = %descriptor.path()))]
    pub async fn execute(&self, descriptor: &RequestDescriptor) -> Result<Response, GatewayError> {
        let access_token = self.store.get(keys::ACCESS_TOKEN).await;

        debug!("sending request");
        let response = self.send(descriptor, access_token.as_deref()).await?;
        if response.status() != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        info!("request was unauthorized; refreshing access token");
        match self.refresh.ensure_refreshed().await {
            Ok(new_token) => {
                debug!("retrying request with refreshed token");
                self.send(descriptor, Some(&new_token)).await
            }
            Err(cause) => {
                warn!("refresh failed, logging out: {cause}");
                self.logout.trigger().await;
                Err(GatewayError::SessionExpired(cause))
            }
        }
    }

    /// Send the descriptor once, with the given bearer token if any.
    async fn send(
        &self,
        descriptor: &RequestDescriptor,
        token: Option<&str>,
    ) -> Result<Response, GatewayError> {
        let url = format!("{}{}", self.config.base_url, descriptor.path());

        // The gateway owns the Authorization header: a caller-supplied value
        // is replaced when a token is attached, never duplicated.
        let mut headers = descriptor.headers().clone();
        if token.is_some() {
            headers.remove(AUTHORIZATION);
        }

        let mut request =
            self.http.request(descriptor.method().clone(), &url).headers(headers);

        if let Some(token) = token {
            request = request.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(body) = descriptor.body_bytes() {
            request = request.body(body.to_vec());
        }

        match tokio::time::timeout(self.config.timeout, request.send()).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) => Err(GatewayError::Network(e.to_string())),
            Err(_) => Err(GatewayError::Timeout(self.config.timeout)),
        }
    }
}

/// Builder for the gateway client.
pub struct GatewayClientBuilder<S, R, N> {
    config: Option<GatewayConfig>,
    store: Option<Arc<S>>,
    refresh: Option<Arc<RefreshCoordinator<S, R>>>,
    logout: Option<Arc<LogoutGuard<S, N>>>,
}

impl<S, R, N> Default for GatewayClientBuilder<S, R, N> {
    fn default() -> Self {
        Self { config: None, store: None, refresh: None, logout: None }
    }
}

impl<S, R, N> GatewayClientBuilder<S, R, N>
where
    S: CredentialStore,
    R: RefreshApi,
    N: SessionNotifier,
{
    /// Set the gateway configuration.
    #[must_use]
    pub fn config(mut self, config: GatewayConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the credential store.
    #[must_use]
    pub fn store(mut self, store: Arc<S>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the refresh coordinator.
    #[must_use]
    pub fn refresh(mut self, refresh: Arc<RefreshCoordinator<S, R>>) -> Self {
        self.refresh = Some(refresh);
        self
    }

    /// Set the logout guard.
    #[must_use]
    pub fn logout(mut self, logout: Arc<LogoutGuard<S, N>>) -> Self {
        self.logout = Some(logout);
        self
    }

    /// Build the gateway client.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] if a collaborator is missing or the
    /// HTTP client cannot be built.
    pub fn build(self) -> Result<GatewayClient<S, R, N>, GatewayError> {
        let config = self.config.unwrap_or_default();
        let store =
            self.store.ok_or_else(|| GatewayError::Config("Credential store not set".into()))?;
        let refresh = self
            .refresh
            .ok_or_else(|| GatewayError::Config("Refresh coordinator not set".into()))?;
        let logout =
            self.logout.ok_or_else(|| GatewayError::Config("Logout guard not set".into()))?;

        GatewayClient::new(config, store, refresh, logout)
    }
}

#[cfg(test)]
mod tests {
    use tokengate_common::testing::{
        MemoryCredentialStore, RecordingNotifier, ScriptedRefreshApi,
    };

    use super::*;

    type TestClient = GatewayClient<MemoryCredentialStore, ScriptedRefreshApi, RecordingNotifier>;

    #[test]
    fn test_default_config_points_at_refresh_path() {
        let config = GatewayConfig::default();
        assert_eq!(config.refresh_path, "/refresh/");
        assert_eq!(config.refresh_endpoint(), "https://api.example.com/refresh/");
    }

    #[test]
    fn test_refresh_client_is_derived_from_config() {
        let config = GatewayConfig {
            base_url: "http://localhost:8000".to_string(),
            refresh_path: "/api/token/refresh/".to_string(),
            timeout: Duration::from_secs(5),
        };
        let client = config.refresh_client();
        assert_eq!(client.endpoint(), "http://localhost:8000/api/token/refresh/");
    }

    #[test]
    fn test_builder_requires_collaborators() {
        let result: Result<TestClient, _> = GatewayClient::builder().build();
        assert!(matches!(result, Err(GatewayError::Config(_))));
    }

    #[test]
    fn test_builder_with_all_collaborators() {
        let store = Arc::new(MemoryCredentialStore::new());
        let refresh = Arc::new(RefreshCoordinator::new(
            store.clone(),
            Arc::new(ScriptedRefreshApi::new()),
        ));
        let logout = Arc::new(LogoutGuard::new(store.clone(), Arc::new(RecordingNotifier::new())));

        let result: Result<TestClient, _> =
            GatewayClient::builder().store(store).refresh(refresh).logout(logout).build();
        assert!(result.is_ok());
    }
}
