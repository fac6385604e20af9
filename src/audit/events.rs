//! Audit event types and emission functions.

use crate::circuit_breaker::CircuitPhase;
use crate::core::{ScoreError, ScoreResult};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Base trait for audit events.
pub trait AuditEvent: Serialize {
    /// Returns the event type name.
    fn event_type(&self) -> &'static str;

    /// Returns the timestamp of the event.
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Audit event for a completed scoring request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreAuditEvent {
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Result ID.
    pub result_id: String,

    /// Provider that produced the score, or "fallback".
    pub provider: String,

    /// The score.
    pub score: f64,

    /// Whether the fallback scorer produced the score.
    pub fallback: bool,

    /// Processing time in milliseconds.
    pub processing_time_ms: u64,

    /// Whether the input was truncated before sending.
    pub truncated: bool,
}

impl ScoreAuditEvent {
    /// Builds the event for `result`.
    pub fn new(result: &ScoreResult, truncated: bool) -> Self {
        Self {
            timestamp: result.scored_at,
            result_id: result.id.clone(),
            provider: result.provider_name.clone(),
            score: result.score,
            fallback: result.is_fallback(),
            processing_time_ms: result.processing_time_ms,
            truncated,
        }
    }
}

impl AuditEvent for ScoreAuditEvent {
    fn event_type(&self) -> &'static str {
        "score_completed"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Audit event for the fallback scorer taking over from a provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackAuditEvent {
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Provider that could not answer.
    pub provider: String,

    /// Error kind, e.g. "timeout" or "circuit_open".
    pub error_kind: String,

    /// Error message.
    pub error: String,
}

impl FallbackAuditEvent {
    /// Builds the event for a provider failure.
    pub fn new(provider: &str, error: &ScoreError) -> Self {
        Self {
            timestamp: Utc::now(),
            provider: provider.to_string(),
            error_kind: error.kind().to_string(),
            error: error.to_string(),
        }
    }
}

impl AuditEvent for FallbackAuditEvent {
    fn event_type(&self) -> &'static str {
        "fallback_engaged"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Audit event for a circuit breaker state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitAuditEvent {
    /// Timestamp of the event.
    pub timestamp: DateTime<Utc>,

    /// Provider the breaker guards.
    pub provider: String,

    /// Phase before the transition.
    pub from: String,

    /// Phase after the transition.
    pub to: String,

    /// Consecutive failures at the time of the transition.
    pub consecutive_failures: u32,
}

impl CircuitAuditEvent {
    /// Builds the event for a transition.
    pub fn new(provider: &str, from: CircuitPhase, to: CircuitPhase, consecutive_failures: u32) -> Self {
        Self {
            timestamp: Utc::now(),
            provider: provider.to_string(),
            from: from.name().to_string(),
            to: to.name().to_string(),
            consecutive_failures,
        }
    }
}

impl AuditEvent for CircuitAuditEvent {
    fn event_type(&self) -> &'static str {
        "circuit_transition"
    }

    fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// Emits an audit event for a scoring request starting.
pub fn emit_score_started(provider: &str, input_chars: usize, truncated: bool) {
    tracing::info!(
        target: "scoreguard::audit",
        event_type = "score_started",
        provider = %provider,
        input_chars = input_chars,
        truncated = truncated,
        "Scoring started"
    );
}

/// Emits an audit event for a completed scoring request.
pub fn emit_score_completed(result: &ScoreResult, truncated: bool) {
    let event = ScoreAuditEvent::new(result, truncated);

    tracing::info!(
        target: "scoreguard::audit",
        event_type = event.event_type(),
        result_id = %event.result_id,
        provider = %event.provider,
        score = event.score,
        fallback = event.fallback,
        processing_time_ms = event.processing_time_ms,
        truncated = event.truncated,
        "Scoring completed"
    );
}

/// Emits an audit event for the fallback scorer taking over.
pub fn emit_fallback_engaged(provider: &str, error: &ScoreError) {
    let event = FallbackAuditEvent::new(provider, error);

    tracing::warn!(
        target: "scoreguard::audit",
        event_type = event.event_type(),
        provider = %event.provider,
        error_kind = %event.error_kind,
        error = %event.error,
        "Fallback scorer engaged"
    );
}

/// Emits an audit event for a circuit breaker state change.
pub fn emit_circuit_transition(
    provider: &str,
    from: CircuitPhase,
    to: CircuitPhase,
    consecutive_failures: u32,
) {
    let event = CircuitAuditEvent::new(provider, from, to, consecutive_failures);

    tracing::info!(
        target: "scoreguard::audit",
        event_type = event.event_type(),
        provider = %event.provider,
        from = %event.from,
        to = %event.to,
        consecutive_failures = event.consecutive_failures,
        "Circuit state changed"
    );
}
