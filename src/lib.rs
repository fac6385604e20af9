//! # Scoreguard
//!
//! A resilience layer for scoring documents with an external AI provider.
//!
//! ## Overview
//!
//! Scoreguard sits between an application and a remote scoring service and
//! makes sure every request ends in a usable score:
//!
//! - Send document text to one configured provider through a consistent API
//! - Stop calling a failing provider with a per-provider circuit breaker
//! - Retry transient failures with bounded exponential backoff
//! - Read a numeric score out of the provider's free-text reply
//! - Score offline with a deterministic keyword heuristic when the provider
//!   cannot answer
//! - Generate structured audit logs for every decision
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use scoreguard::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Create a provider
//!     let provider = MockProvider::replying("Score: 0.85. Good compliance.");
//!
//!     // Create the dispatcher
//!     let dispatcher = ScoringDispatcher::builder()
//!         .with_provider(provider)
//!         .build()?;
//!
//!     // Score a document
//!     let result = dispatcher.score("Scope 1 emissions fell 12%.").await;
//!     println!("{} from {}", result.score, result.provider_name);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - `default` - Includes HTTP provider support
//! - `http-providers` - `HttpProvider` and `ScoringDispatcher::from_config`
//!
//! ## Architecture
//!
//! The library is organized into several layers:
//!
//! - **Core**: Fundamental types, traits, and error handling
//! - **Providers**: Individual provider implementations
//! - **Circuit Breaker**: Resilience patterns for failing providers
//! - **Dispatcher**: Retry policy and orchestration of a scoring request
//! - **Scoring**: Score extraction and the offline fallback scorer
//! - **Audit**: Structured logging of scoring decisions

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod audit;
pub mod circuit_breaker;
pub mod config;
pub mod core;
pub mod dispatcher;
pub mod providers;
pub mod scoring;

// Re-export commonly used types at the crate root
pub use crate::core::{
    ArcProvider, ProviderConfig, ScoreError, ScoreResult, ScoringInput, ScoringProvider,
    WireFormat,
};

pub use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitPhase};
pub use crate::config::ScoringConfig;
pub use crate::dispatcher::{DispatcherConfig, RetryPolicy, ScoringDispatcher};
pub use crate::scoring::{FallbackScorer, ScoreExtractor};

/// Prelude module for convenient imports.
///
/// ```rust
/// use scoreguard::prelude::*;
/// ```
pub mod prelude {
    pub use crate::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitPhase};
    pub use crate::config::ScoringConfig;
    pub use crate::core::{
        ArcProvider, ProviderConfig, ScoreError, ScoreResult, ScoringProvider, WireFormat,
    };
    pub use crate::dispatcher::{DispatcherConfig, RetryPolicy, ScoringDispatcher};
    pub use crate::providers::MockProvider;
    pub use crate::scoring::{FallbackScorer, ScoreExtractor};
}
