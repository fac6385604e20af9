//! Circuit breaker state machine.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::time::Instant;

/// The phase a circuit breaker is in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CircuitPhase {
    /// Requests pass through normally.
    Closed,
    /// Requests are rejected without reaching the provider.
    Open,
    /// A probe request is allowed through to test recovery.
    HalfOpen,
}

impl CircuitPhase {
    /// Returns the name of the phase.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Closed => "closed",
            Self::Open => "open",
            Self::HalfOpen => "half_open",
        }
    }
}

impl fmt::Display for CircuitPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// The current state of a circuit breaker.
///
/// Owned by exactly one breaker and mutated only under its lock.
#[derive(Debug, Clone)]
pub struct BreakerState {
    /// Current phase.
    pub phase: CircuitPhase,
    /// Failures since the last success that closed or kept the circuit closed.
    pub consecutive_failures: u32,
    /// When the most recent failure was recorded.
    pub last_failure_at: Option<Instant>,
    /// Half-open probes currently in flight.
    pub probes_in_flight: u32,
}

impl BreakerState {
    /// Creates a new closed state.
    pub fn closed() -> Self {
        Self {
            phase: CircuitPhase::Closed,
            consecutive_failures: 0,
            last_failure_at: None,
            probes_in_flight: 0,
        }
    }

    /// Returns `true` if the circuit is closed.
    pub fn is_closed(&self) -> bool {
        self.phase == CircuitPhase::Closed
    }

    /// Returns `true` if the circuit is open.
    pub fn is_open(&self) -> bool {
        self.phase == CircuitPhase::Open
    }

    /// Returns `true` if the circuit is half-open.
    pub fn is_half_open(&self) -> bool {
        self.phase == CircuitPhase::HalfOpen
    }

    /// Returns the name of the phase.
    pub fn name(&self) -> &'static str {
        self.phase.name()
    }
}

impl Default for BreakerState {
    fn default() -> Self {
        Self::closed()
    }
}

/// Metrics about circuit breaker behavior.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BreakerMetrics {
    /// Total number of requests.
    pub total_requests: u64,
    /// Number of successful requests.
    pub successful_requests: u64,
    /// Number of failed requests.
    pub failed_requests: u64,
    /// Number of requests rejected without calling the provider.
    pub rejected_requests: u64,
    /// Number of times the circuit has opened.
    pub times_opened: u64,
    /// Number of times the circuit has closed from half-open.
    pub times_closed: u64,
}

impl BreakerMetrics {
    /// Creates new empty metrics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful request.
    pub fn record_success(&mut self) {
        self.total_requests += 1;
        self.successful_requests += 1;
    }

    /// Records a failed request.
    pub fn record_failure(&mut self) {
        self.total_requests += 1;
        self.failed_requests += 1;
    }

    /// Records a rejected request.
    pub fn record_rejected(&mut self) {
        self.total_requests += 1;
        self.rejected_requests += 1;
    }

    /// Records that the circuit opened.
    pub fn record_opened(&mut self) {
        self.times_opened += 1;
    }

    /// Records that the circuit closed.
    pub fn record_closed(&mut self) {
        self.times_closed += 1;
    }

    /// Returns the success rate (0.0 to 1.0).
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            return 1.0;
        }
        self.successful_requests as f64 / self.total_requests as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_breaker_state_default() {
        let state = BreakerState::default();
        assert!(state.is_closed());
        assert_eq!(state.consecutive_failures, 0);
        assert!(state.last_failure_at.is_none());
    }

    #[test]
    fn test_phase_names() {
        assert_eq!(CircuitPhase::Closed.name(), "closed");
        assert_eq!(CircuitPhase::Open.to_string(), "open");
        assert_eq!(CircuitPhase::HalfOpen.name(), "half_open");
    }

    #[test]
    fn test_metrics() {
        let mut metrics = BreakerMetrics::new();
        assert_eq!(metrics.success_rate(), 1.0);

        metrics.record_success();
        metrics.record_success();
        metrics.record_failure();
        metrics.record_rejected();

        assert_eq!(metrics.total_requests, 4);
        assert_eq!(metrics.successful_requests, 2);
        assert_eq!(metrics.failed_requests, 1);
        assert_eq!(metrics.rejected_requests, 1);
        assert!((metrics.success_rate() - 0.5).abs() < f64::EPSILON);
    }
}
