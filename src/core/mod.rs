//! Core types and traits for the scoreguard library.
//!
//! - [`types`] - Provider configuration and wire formats
//! - [`traits`] - The `ScoringProvider` trait
//! - [`error`] - Structured error types
//! - [`input`] - Input validation and truncation
//! - [`result`] - The `ScoreResult` handed to collaborators

pub mod error;
pub mod input;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{ScoreError, ScoreOutcome};
pub use input::{ScoringInput, DEFAULT_MAX_INPUT_CHARS, TRUNCATION_MARKER};
pub use result::{clamp_score, ScoreResult, FALLBACK_PROVIDER, NO_CONTENT_FEEDBACK, NO_PROVIDER};
pub use traits::{ArcProvider, ScoringProvider};
pub use types::{ProviderConfig, WireFormat};
