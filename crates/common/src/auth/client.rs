//! HTTP implementation of the refresh endpoint
//!
//! Posts the refresh token as a JSON body and expects a `{status,
//! access_token}` payload back. Every failure mode - transport error,
//! non-success status, malformed body, `status != true` - collapses into
//! [`AuthError::RefreshFailed`]; retry policy belongs to the caller.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use super::error::AuthError;
use super::traits::RefreshApi;
use super::types::{RefreshRequest, RefreshResponse};

/// Reqwest-backed refresh client.
#[derive(Debug, Clone)]
pub struct RefreshClient {
    endpoint: String,
    client: Client,
}

impl RefreshClient {
    /// Create a refresh client for the given endpoint URL.
    ///
    /// The timeout matches the policy used for ordinary API calls; a
    /// timed-out refresh resolves as failure like any other.
    #[must_use]
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        let client =
            Client::builder().timeout(timeout).build().unwrap_or_else(|_| Client::new());
        Self { endpoint, client }
    }

    /// The configured refresh endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RefreshApi for RefreshClient {
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AuthError> {
        debug!(endpoint = %self.endpoint, "requesting token refresh");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| AuthError::RefreshFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AuthError::RefreshFailed(format!(
                "refresh endpoint returned status {status}"
            )));
        }

        let body: RefreshResponse = response
            .json()
            .await
            .map_err(|e| AuthError::RefreshFailed(format!("malformed refresh response: {e}")))?;

        body.into_accepted_token()
            .ok_or_else(|| AuthError::RefreshFailed("refresh rejected by server".to_string()))
    }
}
