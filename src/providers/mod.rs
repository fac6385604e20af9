//! Scoring provider implementations.
//!
//! This module contains implementations of the `ScoringProvider` trait:
//!
//! - `MockProvider`: scripted replies for testing
//! - `HttpProvider`: JSON over HTTPS (requires the `http-providers` feature)
//!
//! Request and response shapes for HTTP providers live in [`wire`].

mod mock;
pub mod wire;

#[cfg(feature = "http-providers")]
mod http;

pub use mock::MockProvider;

#[cfg(feature = "http-providers")]
pub use http::{classify_status, parse_retry_after, HttpProvider, CONTENTS_API_KEY_HEADER};
