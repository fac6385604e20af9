//! Error types for the scoreguard library.
//!
//! Every failure inside the scoring layer is a typed `ScoreError`. Only the
//! dispatcher sees these errors; its public `score` method converts all of
//! them into a fallback result.

use std::time::Duration;
use thiserror::Error;

/// The error type for provider calls, breaker decisions, and configuration.
#[derive(Debug, Clone, Error)]
pub enum ScoreError {
    /// The input cannot be scored (empty or whitespace-only).
    #[error("invalid input: {reason}")]
    Validation {
        /// Why the input was rejected.
        reason: String,
    },

    /// The dispatcher or a provider is misconfigured.
    #[error("configuration error: {message}")]
    Configuration {
        /// Description of the configuration error.
        message: String,
    },

    /// The provider call did not finish in time.
    #[error("request to provider '{provider}' timed out after {elapsed:?}")]
    Timeout {
        /// Name of the provider.
        provider: String,
        /// How long the call ran before giving up.
        elapsed: Duration,
    },

    /// Failed to reach the provider at all.
    #[error("connection to provider '{provider}' failed: {message}")]
    ConnectionFailed {
        /// Name of the provider.
        provider: String,
        /// Error message describing the failure.
        message: String,
    },

    /// The provider answered with a server-side error.
    #[error("provider '{provider}' is unavailable (status {status}): {reason}")]
    ProviderUnavailable {
        /// Name of the provider.
        provider: String,
        /// HTTP status code returned.
        status: u16,
        /// Human-readable reason.
        reason: String,
    },

    /// The provider is throttling requests.
    #[error("rate limit exceeded for provider '{provider}': retry after {retry_after:?}")]
    RateLimited {
        /// Name of the provider.
        provider: String,
        /// Suggested wait time before retry, if the provider sent one.
        retry_after: Option<Duration>,
    },

    /// The provider refused the credentials.
    #[error("authentication failed for provider '{provider}': {reason}")]
    AuthenticationFailed {
        /// Name of the provider.
        provider: String,
        /// Reason for authentication failure.
        reason: String,
    },

    /// The provider rejected the request as invalid.
    #[error("provider '{provider}' rejected the request (status {status}): {reason}")]
    Rejected {
        /// Name of the provider.
        provider: String,
        /// HTTP status code returned.
        status: u16,
        /// Human-readable reason.
        reason: String,
    },

    /// The provider replied successfully but the body had an unexpected shape.
    #[error("unparseable response from provider '{provider}': {details}")]
    Parse {
        /// Name of the provider.
        provider: String,
        /// What was missing or malformed.
        details: String,
    },

    /// The circuit breaker is open for this provider.
    #[error("circuit breaker open for provider '{provider}'")]
    CircuitOpen {
        /// Name of the provider with open circuit.
        provider: String,
        /// When the circuit might close (if known).
        recovery_hint: Option<String>,
    },
}

impl ScoreError {
    /// Returns `true` if retrying the same request may succeed.
    ///
    /// Timeouts, connection failures, 5xx replies, and throttling are
    /// transient. Everything else propagates without retry.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::Timeout { .. }
                | Self::ConnectionFailed { .. }
                | Self::ProviderUnavailable { .. }
                | Self::RateLimited { .. }
        )
    }

    /// Returns `true` if this error was produced by the breaker itself.
    pub fn is_circuit_open(&self) -> bool {
        matches!(self, Self::CircuitOpen { .. })
    }

    /// Wait the provider asked for before the next request, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Returns the provider name if this error is associated with one.
    pub fn provider(&self) -> Option<&str> {
        match self {
            Self::Timeout { provider, .. }
            | Self::ConnectionFailed { provider, .. }
            | Self::ProviderUnavailable { provider, .. }
            | Self::RateLimited { provider, .. }
            | Self::AuthenticationFailed { provider, .. }
            | Self::Rejected { provider, .. }
            | Self::Parse { provider, .. }
            | Self::CircuitOpen { provider, .. } => Some(provider),
            _ => None,
        }
    }

    /// Short, stable label for logs and audit events.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::Configuration { .. } => "configuration",
            Self::Timeout { .. } => "timeout",
            Self::ConnectionFailed { .. } => "connection_failed",
            Self::ProviderUnavailable { .. } => "provider_unavailable",
            Self::RateLimited { .. } => "rate_limited",
            Self::AuthenticationFailed { .. } => "authentication_failed",
            Self::Rejected { .. } => "rejected",
            Self::Parse { .. } => "parse",
            Self::CircuitOpen { .. } => "circuit_open",
        }
    }

    /// Creates a `Validation` error.
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Creates a `Configuration` error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates a `Timeout` error.
    pub fn timeout(provider: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            provider: provider.into(),
            elapsed,
        }
    }

    /// Creates a `ConnectionFailed` error.
    pub fn connection_failed(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionFailed {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Creates a `ProviderUnavailable` error.
    pub fn unavailable(provider: impl Into<String>, status: u16, reason: impl Into<String>) -> Self {
        Self::ProviderUnavailable {
            provider: provider.into(),
            status,
            reason: reason.into(),
        }
    }

    /// Creates a `Parse` error.
    pub fn parse(provider: impl Into<String>, details: impl Into<String>) -> Self {
        Self::Parse {
            provider: provider.into(),
            details: details.into(),
        }
    }
}

/// A specialized `Result` type for scoring operations.
pub type ScoreOutcome<T> = Result<T, ScoreError>;
