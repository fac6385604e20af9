//! Structured audit logging for scoring decisions.
//!
//! This module provides functions for emitting structured audit events
//! using the `tracing` crate under the `scoreguard::audit` target. Any
//! subscriber can capture them; filter on the target to keep them apart
//! from diagnostic logs.

mod events;

pub use events::{
    emit_circuit_transition, emit_fallback_engaged, emit_score_completed, emit_score_started,
    AuditEvent, CircuitAuditEvent, FallbackAuditEvent, ScoreAuditEvent,
};
