//! Bearer-token session coordination
//!
//! Implements the recovery path for authenticated requests:
//! - Single-flight token refresh shared by all concurrent callers
//! - One-shot logout (clear credentials + notify) on refresh failure
//! - Trait abstractions over the credential store, the session notifier,
//!   and the refresh endpoint so every piece is testable in isolation
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────┐
//! │   GatewayClient    │  Request executor (tokengate-api)
//! └─────────┬──────────┘
//!           │
//!           ├──► RefreshCoordinator  (single-flight refresh)
//!           │         │
//!           │         └──► RefreshApi / RefreshClient  (POST refresh endpoint)
//!           │
//!           └──► LogoutGuard         (one-shot clear + notify)
//!                     │
//!                     ├──► CredentialStore
//!                     └──► SessionNotifier
//! ```

pub mod client;
pub mod error;
pub mod logout;
pub mod refresh;
pub mod traits;
pub mod types;

pub use client::RefreshClient;
pub use error::AuthError;
pub use logout::LogoutGuard;
pub use refresh::RefreshCoordinator;
pub use traits::{CredentialStore, RefreshApi, SessionNotifier};
pub use types::{keys, RefreshRequest, RefreshResponse, Session};
