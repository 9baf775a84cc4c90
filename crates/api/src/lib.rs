//! Authenticated request executor for the tokengate gateway.
//!
//! Wraps an arbitrary HTTP request with bearer-token attachment, 401
//! detection, coordinated single-flight refresh, exactly one retry, and the
//! one-shot logout transition when refresh fails. The coordination
//! primitives live in `tokengate-common`.

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]

pub mod client;
pub mod descriptor;
pub mod errors;

pub use client::{GatewayClient, GatewayClientBuilder, GatewayConfig};
pub use descriptor::RequestDescriptor;
pub use errors::GatewayError;
