//! Word-count sentiment heuristic used when a reply carries no number.

/// Words that pull the score up.
pub const POSITIVE_WORDS: &[&str] = &[
    "excellent",
    "strong",
    "good",
    "compliant",
    "robust",
    "comprehensive",
    "effective",
    "adequate",
    "satisfactory",
    "outstanding",
    "exemplary",
    "thorough",
    "clear",
    "well",
];

/// Words that pull the score down.
pub const NEGATIVE_WORDS: &[&str] = &[
    "poor",
    "weak",
    "lacking",
    "missing",
    "inadequate",
    "insufficient",
    "non-compliant",
    "deficient",
    "incomplete",
    "unclear",
    "fails",
    "failure",
    "absent",
    "violation",
];

/// Score with no sentiment words at all, in hundredths.
const BASELINE_HUNDREDTHS: i64 = 70;

/// Adjustment per net positive word, in hundredths.
const STEP_HUNDREDTHS: i64 = 5;

/// Occurrence counts of sentiment words in a text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SentimentCounts {
    /// Positive word occurrences.
    pub positive: u32,
    /// Negative word occurrences.
    pub negative: u32,
}

/// Counts whole-word, case-insensitive occurrences of sentiment words.
///
/// Words are runs of alphanumerics, with hyphens and apostrophes allowed
/// inside a word, so `non-compliant` counts as negative and not as
/// `compliant`.
pub fn count(text: &str) -> SentimentCounts {
    let mut counts = SentimentCounts::default();

    for word in words(text) {
        let word = word.to_lowercase();
        if POSITIVE_WORDS.contains(&word.as_str()) {
            counts.positive += 1;
        } else if NEGATIVE_WORDS.contains(&word.as_str()) {
            counts.negative += 1;
        }
    }

    counts
}

/// `0.70 + 0.05 * (positive - negative)`, clamped to `[0, 1]`.
pub fn score(positive: u32, negative: u32) -> f64 {
    let net = i64::from(positive) - i64::from(negative);
    let hundredths = (BASELINE_HUNDREDTHS + STEP_HUNDREDTHS * net).clamp(0, 100);
    hundredths as f64 / 100.0
}

fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-' || c == '\''))
        .map(|w| w.trim_matches(|c| c == '-' || c == '\''))
        .filter(|w| !w.is_empty())
}
