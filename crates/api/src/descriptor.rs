//! Immutable request descriptor
//!
//! A [`RequestDescriptor`] captures everything about a logical request
//! except authentication. The executor never mutates one; each send copies
//! it with the `Authorization` header of the moment, which is what makes
//! the retry-with-fresh-token path safe.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;

use crate::errors::GatewayError;

/// Description of one logical API request, minus authentication.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    headers: HeaderMap,
    body: Option<Vec<u8>>,
}

impl RequestDescriptor {
    /// Create a descriptor for `method` against the API path `path`
    /// (e.g. `"/offers"`).
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self { method, path: path.into(), headers: HeaderMap::new(), body: None }
    }

    /// Shorthand for a GET descriptor.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// Shorthand for a POST descriptor.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a header.
    #[must_use]
    pub fn header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    /// Attach a raw body.
    #[must_use]
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a JSON body and set the content type.
    ///
    /// # Errors
    /// Returns [`GatewayError::Config`] if the value cannot be serialized.
    pub fn json<T: Serialize>(mut self, value: &T) -> Result<Self, GatewayError> {
        let body = serde_json::to_vec(value)
            .map_err(|e| GatewayError::Config(format!("Failed to serialize body: {e}")))?;
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.body = Some(body);
        Ok(self)
    }

    /// HTTP method of the request.
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// API path the request targets.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Caller-supplied headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request body, if any.
    #[must_use]
    pub fn body_bytes(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}
