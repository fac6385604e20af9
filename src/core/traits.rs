//! Core traits for the scoreguard library.
//!
//! This module defines the `ScoringProvider` trait that every external
//! scoring backend implements.

use crate::core::error::ScoreOutcome;

use async_trait::async_trait;
use std::fmt::Debug;
use std::sync::Arc;

/// An external service that turns a prompt into free-text feedback.
///
/// # Implementation Notes
///
/// - Implementations must be `Send + Sync` for use in async contexts.
/// - `fetch` performs at most one network request. Retries and circuit
///   breaking are layered on top by the dispatcher.
/// - Implementations should never panic; all failures are `ScoreError`s,
///   classified so that `ScoreError::is_transient` is accurate.
///
/// # Example Implementation
///
/// ```rust,ignore
/// use scoreguard::core::{ScoreOutcome, ScoringProvider};
/// use async_trait::async_trait;
///
/// #[derive(Debug)]
/// struct EchoProvider;
///
/// #[async_trait]
/// impl ScoringProvider for EchoProvider {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     async fn fetch(&self, prompt: &str) -> ScoreOutcome<String> {
///         Ok(format!("Score: 0.5. {prompt}"))
///     }
/// }
/// ```
#[async_trait]
pub trait ScoringProvider: Send + Sync + Debug {
    /// Returns the stable name of this provider, e.g. "alpha".
    fn name(&self) -> &str;

    /// Sends the prompt and returns the provider's free-text reply.
    ///
    /// # Errors
    ///
    /// - `Timeout`, `ConnectionFailed`, `ProviderUnavailable`, `RateLimited`
    ///   for transient failures.
    /// - `Parse` when the reply does not have the expected shape.
    /// - `AuthenticationFailed` or `Rejected` for permanent request failures.
    async fn fetch(&self, prompt: &str) -> ScoreOutcome<String>;
}

/// An arc-wrapped provider for shared ownership.
pub type ArcProvider = Arc<dyn ScoringProvider>;
