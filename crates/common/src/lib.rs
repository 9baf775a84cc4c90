//! Coordination core for the tokengate authenticated request gateway.
//!
//! This crate owns the concurrency-sensitive pieces of the gateway:
//! single-flight token refresh, the one-shot logout transition, and the
//! trait seams to the external collaborators (credential store, session
//! notifier, refresh endpoint). The outward-facing request executor lives
//! in `tokengate-api`.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod auth;

// Testing utilities - not compiled into production builds
#[cfg(any(feature = "test-utils", test))]
pub mod testing;

// Re-export commonly used types and traits for convenience
pub use auth::{
    AuthError, CredentialStore, LogoutGuard, RefreshApi, RefreshClient, RefreshCoordinator,
    Session, SessionNotifier,
};
