//! Turning text into scores.
//!
//! [`ScoreExtractor`] reads a number out of a provider reply.
//! [`FallbackScorer`] scores the submission itself when no provider reply
//! is available.

mod extractor;
mod fallback;
pub mod keywords;
pub mod sentiment;

pub use extractor::{ExtractionMethod, Extraction, ScoreExtractor};
pub use fallback::{CategoryHits, FallbackScorer};
pub use keywords::EsgCategory;
