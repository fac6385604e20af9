//! Scoring orchestration.
//!
//! This module contains the `ScoringDispatcher`, which coordinates the
//! circuit breaker, retry policy, provider call, and score extraction, and
//! falls back to offline scoring when the provider cannot answer.

mod retry;
mod scoring;

pub use retry::{RetryAttempt, RetryPolicy};
pub use scoring::{DispatcherConfig, ScoringDispatcher, ScoringDispatcherBuilder, DEFAULT_INSTRUCTIONS};
