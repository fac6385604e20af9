//! Score result structures.
//!
//! `ScoreResult` is the only value this layer hands to the outside world.
//! Persistence and notification collaborators consume it as-is.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Provider name carried by results produced by the local fallback scorer.
pub const FALLBACK_PROVIDER: &str = "fallback";

/// Provider name carried by results for inputs that were never scored.
pub const NO_PROVIDER: &str = "none";

/// Feedback attached to results for empty input.
pub const NO_CONTENT_FEEDBACK: &str = "no content provided";

/// The result of scoring one piece of text.
///
/// `score` is always within `[0, 1]` and never NaN, whichever path produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Unique identifier for this result.
    pub id: String,

    /// Compliance score in `[0, 1]`.
    pub score: f64,

    /// Provider text, or the fallback scorer's explanation.
    pub feedback: String,

    /// Name of the provider that produced the score.
    pub provider_name: String,

    /// Wall time spent producing this result.
    pub processing_time_ms: u64,

    /// When the result was produced.
    pub scored_at: DateTime<Utc>,
}

impl ScoreResult {
    /// Creates a new result, clamping the score into `[0, 1]`.
    pub fn new(
        score: f64,
        feedback: impl Into<String>,
        provider_name: impl Into<String>,
        elapsed: Duration,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            score: clamp_score(score),
            feedback: feedback.into(),
            provider_name: provider_name.into(),
            processing_time_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            scored_at: Utc::now(),
        }
    }

    /// The result returned for empty or whitespace-only input.
    pub fn no_content() -> Self {
        Self::new(0.0, NO_CONTENT_FEEDBACK, NO_PROVIDER, Duration::ZERO)
    }

    /// Returns `true` if the local fallback scorer produced this result.
    pub fn is_fallback(&self) -> bool {
        self.provider_name == FALLBACK_PROVIDER
    }
}

/// Clamps a raw score into `[0, 1]`, mapping NaN to `0.0`.
pub fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        0.0
    } else {
        score.clamp(0.0, 1.0)
    }
}
