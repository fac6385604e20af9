//! Numeric score extraction from free-text provider replies.
//!
//! Pattern categories are tried in a fixed order and the first category
//! with a valid match decides the score, regardless of where in the text
//! other categories would have matched:
//!
//! 1. `Score: X` / `Score = X`
//! 2. `X / 1` / `X out of 1`
//! 3. `N%`
//! 4. a standalone decimal in `[0, 1]`
//!
//! When nothing matches, the sentiment heuristic produces the score.

use crate::core::clamp_score;
use crate::scoring::sentiment::{self, SentimentCounts};

use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// Which rule produced an extracted score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ExtractionMethod {
    /// An explicit `Score: X` or `Score = X` phrase.
    ScorePhrase,
    /// A ratio against one, `X / 1` or `X out of 1`.
    Ratio,
    /// A percentage, `N%`.
    Percentage,
    /// A bare decimal between zero and one.
    BareDecimal,
    /// No numeric pattern; positive and negative word counts decided.
    Sentiment {
        /// Positive word occurrences.
        positive: u32,
        /// Negative word occurrences.
        negative: u32,
    },
}

impl ExtractionMethod {
    /// Returns `true` if the score came from a numeric pattern.
    pub fn is_numeric(&self) -> bool {
        !matches!(self, Self::Sentiment { .. })
    }
}

/// An extracted score together with the rule that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    /// Score in `[0, 1]`.
    pub score: f64,
    /// How the score was found.
    pub method: ExtractionMethod,
}

/// Parses a score in `[0, 1]` out of arbitrary text. Never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScoreExtractor;

impl ScoreExtractor {
    /// Creates a new extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extracts a score from `text`.
    pub fn extract(&self, text: &str) -> f64 {
        self.extract_detailed(text).score
    }

    /// Extracts a score from `text` and reports which rule matched.
    pub fn extract_detailed(&self, text: &str) -> Extraction {
        let numeric = rules().iter().find_map(|(rule, regex)| {
            regex
                .captures_iter(text)
                .find_map(|caps| rule.accept(text, &caps))
                .map(|score| (score, rule.method()))
        });

        match numeric {
            Some((score, method)) => Extraction {
                score: clamp_score(score),
                method,
            },
            None => {
                let SentimentCounts { positive, negative } = sentiment::count(text);
                Extraction {
                    score: sentiment::score(positive, negative),
                    method: ExtractionMethod::Sentiment { positive, negative },
                }
            }
        }
    }
}

/// Numeric pattern categories, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    ScorePhrase,
    Ratio,
    Percentage,
    BareDecimal,
}

impl Rule {
    const ORDER: [Rule; 4] = [
        Self::ScorePhrase,
        Self::Ratio,
        Self::Percentage,
        Self::BareDecimal,
    ];

    fn pattern(self) -> &'static str {
        match self {
            Self::ScorePhrase => {
                r"(?i)\bscore[\s*_`]*[:=][\s*_`]*(?P<value>-?[0-9]*\.?[0-9]+)(?P<percent>[ \t]*%)?"
            }
            Self::Ratio => r"(?i)(?P<value>[0-9]*\.?[0-9]+)\s*(?:/|out\s+of)\s*(?P<one>1(?:\.0+)?)",
            Self::Percentage => r"(?P<value>[0-9]*\.?[0-9]+)[ \t]*%",
            Self::BareDecimal => r"(?P<value>[0-9]*\.[0-9]+)",
        }
    }

    fn method(self) -> ExtractionMethod {
        match self {
            Self::ScorePhrase => ExtractionMethod::ScorePhrase,
            Self::Ratio => ExtractionMethod::Ratio,
            Self::Percentage => ExtractionMethod::Percentage,
            Self::BareDecimal => ExtractionMethod::BareDecimal,
        }
    }

    /// Score for one match, or `None` if the candidate is not a valid score.
    fn accept(self, text: &str, caps: &Captures<'_>) -> Option<f64> {
        let bytes = text.as_bytes();
        let value = caps.name("value")?;
        if value.as_str().starts_with('-') || negative_sign_before(bytes, value.start()) {
            return None;
        }
        let number: f64 = value.as_str().parse().ok()?;

        match self {
            Self::ScorePhrase if caps.name("percent").is_some() => Some(percent(number)),
            Self::ScorePhrase => unit(number),
            Self::Ratio => {
                let one = caps.name("one")?;
                if continues_number(bytes, one.end()) {
                    return None;
                }
                unit(number)
            }
            Self::Percentage => Some(percent(number)),
            Self::BareDecimal => {
                if touches_number(bytes, value.start()) || continues_number(bytes, value.end()) {
                    return None;
                }
                unit(number)
            }
        }
    }
}

fn rules() -> &'static [(Rule, Regex)] {
    static RULES: OnceLock<Vec<(Rule, Regex)>> = OnceLock::new();
    RULES.get_or_init(|| {
        Rule::ORDER
            .iter()
            .map(|&rule| {
                let regex = Regex::new(rule.pattern()).expect("Invalid score pattern");
                (rule, regex)
            })
            .collect()
    })
}

/// A value that is not percent-marked must already be in `[0, 1]`.
fn unit(value: f64) -> Option<f64> {
    (0.0..=1.0).contains(&value).then_some(value)
}

/// Percent-marked values above one are divided by 100.
fn percent(value: f64) -> f64 {
    let scaled = if value > 1.0 { value / 100.0 } else { value };
    clamp_score(scaled)
}

/// `-0.4` is negative, `ISO-0.5` is not.
fn negative_sign_before(bytes: &[u8], start: usize) -> bool {
    start > 0
        && bytes[start - 1] == b'-'
        && (start < 2 || !bytes[start - 2].is_ascii_alphanumeric())
}

fn digit_at(bytes: &[u8], i: usize) -> bool {
    bytes.get(i).is_some_and(u8::is_ascii_digit)
}

/// A digit run ends right before `start`, directly or across a decimal point.
fn touches_number(bytes: &[u8], start: usize) -> bool {
    start > 0
        && (digit_at(bytes, start - 1)
            || (bytes[start - 1] == b'.' && start >= 2 && digit_at(bytes, start - 2)))
}

/// A digit run starts at `end`, directly or across a decimal point.
fn continues_number(bytes: &[u8], end: usize) -> bool {
    digit_at(bytes, end) || (bytes.get(end) == Some(&b'.') && digit_at(bytes, end + 1))
}
