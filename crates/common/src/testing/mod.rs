//! Test support utilities
//!
//! In-memory implementations of the gateway's collaborator traits, used by
//! this crate's tests and by downstream crates.

pub mod mocks;

pub use mocks::{MemoryCredentialStore, RecordingNotifier, ScriptedRefreshApi};
