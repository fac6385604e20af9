//! Circuit breaker for scoring provider resilience.
//!
//! The circuit breaker stops traffic to a provider after repeated failures
//! and probes it again once a recovery timeout has passed since the last
//! failure.
//!
//! ## States
//!
//! - **Closed**: Normal operation; calls pass through.
//! - **Open**: Provider is failing; calls are rejected immediately.
//! - **Half-Open**: One probe call tests whether the provider has recovered.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scoreguard::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
//! use std::time::Duration;
//!
//! let config = CircuitBreakerConfig::default()
//!     .with_failure_threshold(5)
//!     .with_recovery_timeout(Duration::from_secs(60));
//!
//! let breaker = CircuitBreaker::new("alpha", config);
//! ```

mod breaker;
mod config;
mod state;

pub use breaker::{Admission, CircuitBreaker};
pub use config::CircuitBreakerConfig;
pub use state::{BreakerMetrics, BreakerState, CircuitPhase};
