//! Input preparation for provider calls.
//!
//! `ScoringInput` validates raw document text and bounds what is sent to a
//! provider. The original text is kept so the fallback scorer can still see
//! all of it.

use crate::core::error::ScoreError;

/// Maximum number of characters sent to a provider.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 50_000;

/// Marker appended to provider input that was cut short.
pub const TRUNCATION_MARKER: &str = "...[truncated]";

/// Validated text ready to be sent to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringInput {
    text: String,
    original_chars: usize,
    truncated: bool,
}

impl ScoringInput {
    /// Validates `text` and truncates it to `max_chars` characters.
    ///
    /// Truncation keeps the first `max_chars` characters and appends
    /// [`TRUNCATION_MARKER`]. It is deterministic and always cuts on a
    /// character boundary.
    ///
    /// # Errors
    ///
    /// Returns `ScoreError::Validation` if `text` is empty or whitespace-only.
    pub fn prepare(text: &str, max_chars: usize) -> Result<Self, ScoreError> {
        if text.trim().is_empty() {
            return Err(ScoreError::validation("no content provided"));
        }

        match text.char_indices().nth(max_chars) {
            Some((cut, _)) => {
                let mut bounded = String::with_capacity(cut + TRUNCATION_MARKER.len());
                bounded.push_str(&text[..cut]);
                bounded.push_str(TRUNCATION_MARKER);
                Ok(Self {
                    text: bounded,
                    original_chars: text.chars().count(),
                    truncated: true,
                })
            }
            None => Ok(Self {
                text: text.to_string(),
                original_chars: text.chars().count(),
                truncated: false,
            }),
        }
    }

    /// The text to send to the provider.
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Character count of the input before truncation.
    pub fn original_chars(&self) -> usize {
        self.original_chars
    }

    /// Returns `true` if the input was truncated.
    pub fn is_truncated(&self) -> bool {
        self.truncated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_input() {
        assert!(matches!(
            ScoringInput::prepare("", DEFAULT_MAX_INPUT_CHARS),
            Err(ScoreError::Validation { .. })
        ));
        assert!(ScoringInput::prepare(" \n\t ", DEFAULT_MAX_INPUT_CHARS).is_err());
    }

    #[test]
    fn test_short_input_untouched() {
        let input = ScoringInput::prepare("Carbon report", DEFAULT_MAX_INPUT_CHARS).unwrap();
        assert_eq!(input.as_str(), "Carbon report");
        assert!(!input.is_truncated());
    }

    #[test]
    fn test_truncates_at_limit() {
        let text = "a".repeat(50_010);
        let input = ScoringInput::prepare(&text, DEFAULT_MAX_INPUT_CHARS).unwrap();

        assert!(input.is_truncated());
        assert_eq!(input.original_chars(), 50_010);
        assert_eq!(input.as_str().len(), 50_000 + TRUNCATION_MARKER.len());
        assert!(input.as_str().ends_with("...[truncated]"));
    }

    #[test]
    fn test_exact_limit_not_truncated() {
        let text = "b".repeat(50_000);
        let input = ScoringInput::prepare(&text, DEFAULT_MAX_INPUT_CHARS).unwrap();
        assert!(!input.is_truncated());
        assert_eq!(input.as_str(), text);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let text = "é".repeat(12);
        let input = ScoringInput::prepare(&text, 10).unwrap();
        assert_eq!(input.as_str(), format!("{}{}", "é".repeat(10), TRUNCATION_MARKER));
    }
}
