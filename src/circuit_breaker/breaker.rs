//! Circuit breaker implementation.

use crate::audit;
use crate::circuit_breaker::config::CircuitBreakerConfig;
use crate::circuit_breaker::state::{BreakerMetrics, BreakerState, CircuitPhase};
use crate::core::{ScoreError, ScoreOutcome};

use std::fmt;
use std::future::Future;
use std::sync::RwLock;
use tokio::time::Instant;

/// How a call was let through the breaker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// The circuit is closed; the call may use the full retry budget.
    Normal,
    /// The circuit is half-open; the call is a single recovery probe.
    Probe,
}

/// A circuit breaker guarding one scoring provider.
///
/// The breaker counts consecutive failures and stops calling the provider
/// once they reach the configured threshold. After the recovery timeout has
/// elapsed since the last failure, one probe is let through: success closes
/// the circuit, failure opens it again.
///
/// # States
///
/// - **Closed**: Normal operation. Calls pass through, failures are counted.
/// - **Open**: Calls are rejected with `ScoreError::CircuitOpen` without
///   invoking the operation.
/// - **Half-Open**: A bounded number of probe calls are let through.
///
/// # Example
///
/// ```rust,ignore
/// use scoreguard::circuit_breaker::{CircuitBreaker, CircuitBreakerConfig};
///
/// let breaker = CircuitBreaker::new("alpha", CircuitBreakerConfig::default());
/// let text = breaker.call(|_admission| provider.fetch(prompt)).await?;
/// ```
pub struct CircuitBreaker {
    /// Name of the guarded provider.
    provider: String,
    /// Current state of the circuit.
    state: RwLock<BreakerState>,
    /// Configuration.
    config: CircuitBreakerConfig,
    /// Metrics.
    metrics: RwLock<BreakerMetrics>,
}

impl CircuitBreaker {
    /// Creates a new closed circuit breaker for `provider`.
    pub fn new(provider: impl Into<String>, config: CircuitBreakerConfig) -> Self {
        Self {
            provider: provider.into(),
            state: RwLock::new(BreakerState::closed()),
            config,
            metrics: RwLock::new(BreakerMetrics::new()),
        }
    }

    /// Creates a new circuit breaker with default configuration.
    pub fn with_defaults(provider: impl Into<String>) -> Self {
        Self::new(provider, CircuitBreakerConfig::default())
    }

    /// Returns a snapshot of the current state.
    pub fn state(&self) -> BreakerState {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns a copy of the current metrics.
    pub fn metrics(&self) -> BreakerMetrics {
        self.metrics
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Returns the name of the guarded provider.
    pub fn provider(&self) -> &str {
        &self.provider
    }

    /// Returns a reference to the configuration.
    pub fn config(&self) -> &CircuitBreakerConfig {
        &self.config
    }

    /// Forces the circuit into the open state, starting a fresh recovery window.
    pub fn force_open(&self) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let from = state.phase;
        state.phase = CircuitPhase::Open;
        state.last_failure_at = Some(Instant::now());
        state.probes_in_flight = 0;
        self.metrics
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .record_opened();
        audit::emit_circuit_transition(&self.provider, from, CircuitPhase::Open, state.consecutive_failures);
    }

    /// Forces the circuit into the closed state.
    pub fn force_close(&self) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let from = state.phase;
        *state = BreakerState::closed();
        self.metrics
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .record_closed();
        audit::emit_circuit_transition(&self.provider, from, CircuitPhase::Closed, 0);
    }

    /// Resets the circuit breaker state and metrics.
    pub fn reset(&self) {
        *self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = BreakerState::closed();
        *self
            .metrics
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = BreakerMetrics::new();
    }

    /// Runs `op` through the breaker.
    ///
    /// At most one invocation of `op` happens per call, and the breaker never
    /// retries. `op` receives the [`Admission`] it was granted so callers can
    /// keep half-open probes to a single attempt.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::CircuitOpen` without invoking `op` while the
    /// circuit is open, or while the half-open probe budget is in use.
    /// Otherwise returns whatever `op` returned.
    pub async fn call<F, Fut, T>(&self, op: F) -> ScoreOutcome<T>
    where
        F: FnOnce(Admission) -> Fut,
        Fut: Future<Output = ScoreOutcome<T>>,
    {
        let admission = match self.admit() {
            Ok(admission) => admission,
            Err(e) => {
                self.metrics
                    .write()
                    .unwrap_or_else(|poisoned| poisoned.into_inner())
                    .record_rejected();
                return Err(e);
            }
        };

        let mut slot = ProbeSlot::new(self, admission);
        let outcome = op(admission).await;
        slot.disarm();

        match outcome {
            Ok(value) => {
                self.record_success(admission);
                Ok(value)
            }
            Err(e) => {
                self.record_failure(admission, &e);
                Err(e)
            }
        }
    }

    /// Decides whether a call may proceed, moving Open to HalfOpen when the
    /// recovery timeout has strictly elapsed.
    fn admit(&self) -> Result<Admission, ScoreError> {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let now = Instant::now();

        match state.phase {
            CircuitPhase::Closed => Ok(Admission::Normal),

            CircuitPhase::Open => {
                let since_failure = state
                    .last_failure_at
                    .map(|at| now.saturating_duration_since(at))
                    .unwrap_or(self.config.recovery_timeout);

                if since_failure > self.config.recovery_timeout {
                    state.phase = CircuitPhase::HalfOpen;
                    state.probes_in_flight = 1;
                    audit::emit_circuit_transition(
                        &self.provider,
                        CircuitPhase::Open,
                        CircuitPhase::HalfOpen,
                        state.consecutive_failures,
                    );
                    Ok(Admission::Probe)
                } else {
                    let remaining = self.config.recovery_timeout - since_failure;
                    Err(ScoreError::CircuitOpen {
                        provider: self.provider.clone(),
                        recovery_hint: Some(format!("circuit may recover in {remaining:?}")),
                    })
                }
            }

            CircuitPhase::HalfOpen => {
                if state.probes_in_flight < self.config.half_open_max_probes {
                    state.probes_in_flight += 1;
                    Ok(Admission::Probe)
                } else {
                    Err(ScoreError::CircuitOpen {
                        provider: self.provider.clone(),
                        recovery_hint: Some("recovery probe in progress".to_string()),
                    })
                }
            }
        }
    }

    /// Records a successful call.
    fn record_success(&self, admission: Admission) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut metrics = self
            .metrics
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        metrics.record_success();

        if admission == Admission::Probe {
            state.probes_in_flight = state.probes_in_flight.saturating_sub(1);
        }

        match state.phase {
            CircuitPhase::Closed => {
                state.consecutive_failures = 0;
            }

            // Only the probe decides how a half-open circuit resolves.
            CircuitPhase::HalfOpen if admission == Admission::Normal => {}

            CircuitPhase::HalfOpen => {
                *state = BreakerState::closed();
                metrics.record_closed();
                tracing::info!(provider = %self.provider, "Provider recovered, circuit closed");
                audit::emit_circuit_transition(
                    &self.provider,
                    CircuitPhase::HalfOpen,
                    CircuitPhase::Closed,
                    0,
                );
            }

            // Admitted while closed, but another caller opened the circuit meanwhile.
            CircuitPhase::Open => {}
        }
    }

    /// Records a failed call.
    fn record_failure(&self, admission: Admission, error: &ScoreError) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let mut metrics = self
            .metrics
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        metrics.record_failure();

        if admission == Admission::Probe {
            state.probes_in_flight = state.probes_in_flight.saturating_sub(1);
        } else if state.phase == CircuitPhase::HalfOpen {
            // Admitted while closed; the probe in flight decides the outcome.
            tracing::debug!(
                provider = %self.provider,
                error = %error,
                "Call admitted before the circuit opened failed during recovery"
            );
            return;
        }

        state.consecutive_failures = state.consecutive_failures.saturating_add(1);
        state.last_failure_at = Some(Instant::now());

        let from = state.phase;
        let trips = from == CircuitPhase::HalfOpen
            || state.consecutive_failures >= self.config.failure_threshold;

        tracing::debug!(
            provider = %self.provider,
            consecutive_failures = state.consecutive_failures,
            threshold = self.config.failure_threshold,
            error = %error,
            "Provider call failed"
        );

        if trips && from != CircuitPhase::Open {
            state.phase = CircuitPhase::Open;
            state.probes_in_flight = 0;
            metrics.record_opened();
            tracing::warn!(
                provider = %self.provider,
                consecutive_failures = state.consecutive_failures,
                recovery_timeout_ms = self.config.recovery_timeout.as_millis() as u64,
                "Circuit opened"
            );
            audit::emit_circuit_transition(
                &self.provider,
                from,
                CircuitPhase::Open,
                state.consecutive_failures,
            );
        }
    }

    /// Gives back a probe slot whose call was dropped before completing.
    fn release_probe(&self) {
        let mut state = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if state.phase == CircuitPhase::HalfOpen {
            state.probes_in_flight = state.probes_in_flight.saturating_sub(1);
        }
    }
}

impl fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("provider", &self.provider)
            .field(
                "state",
                &*self
                    .state
                    .read()
                    .unwrap_or_else(|poisoned| poisoned.into_inner()),
            )
            .field("config", &self.config)
            .finish()
    }
}

/// Releases a half-open probe slot if the guarded call is cancelled.
struct ProbeSlot<'a> {
    breaker: &'a CircuitBreaker,
    armed: bool,
}

impl<'a> ProbeSlot<'a> {
    fn new(breaker: &'a CircuitBreaker, admission: Admission) -> Self {
        Self {
            breaker,
            armed: admission == Admission::Probe,
        }
    }

    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for ProbeSlot<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.breaker.release_probe();
        }
    }
}
