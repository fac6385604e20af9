//! Deterministic offline scorer used when the provider cannot answer.

use crate::core::{ScoreResult, FALLBACK_PROVIDER, NO_CONTENT_FEEDBACK};
use crate::scoring::keywords::{self, EsgCategory};

use std::time::Duration;

const BASE_SCORE: f64 = 0.5;
const PER_KEYWORD: f64 = 0.05;
const LENGTH_WEIGHT: f64 = 0.2;
const LENGTH_SATURATION_CHARS: f64 = 1000.0;
const MAX_FALLBACK_SCORE: f64 = 0.95;

/// Keyword hits per ESG category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryHits {
    /// Matched environmental keywords.
    pub environmental: Vec<&'static str>,
    /// Matched social keywords.
    pub social: Vec<&'static str>,
    /// Matched governance keywords.
    pub governance: Vec<&'static str>,
}

impl CategoryHits {
    /// Distinct keywords matched across all categories.
    pub fn total(&self) -> usize {
        self.environmental.len() + self.social.len() + self.governance.len()
    }

    fn for_category(&self, category: EsgCategory) -> &[&'static str] {
        match category {
            EsgCategory::Environmental => &self.environmental,
            EsgCategory::Social => &self.social,
            EsgCategory::Governance => &self.governance,
        }
    }
}

/// Keyword-and-length heuristic scorer.
///
/// The same text always yields the same score and feedback, and the score
/// never exceeds 0.95.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackScorer;

impl FallbackScorer {
    /// Creates a new fallback scorer.
    pub fn new() -> Self {
        Self
    }

    /// Scores `text`; `elapsed` is recorded as the processing time.
    pub fn score(&self, text: &str, elapsed: Duration) -> ScoreResult {
        if text.trim().is_empty() {
            return ScoreResult::new(0.0, NO_CONTENT_FEEDBACK, FALLBACK_PROVIDER, elapsed);
        }

        let hits = self.assess(text);
        let chars = text.chars().count();
        let score = self.compute(hits.total(), chars);

        ScoreResult::new(score, feedback(&hits, chars), FALLBACK_PROVIDER, elapsed)
    }

    /// Finds the ESG keywords present in `text`.
    pub fn assess(&self, text: &str) -> CategoryHits {
        let lowered = text.to_lowercase();
        CategoryHits {
            environmental: keywords::matches(&lowered, EsgCategory::Environmental),
            social: keywords::matches(&lowered, EsgCategory::Social),
            governance: keywords::matches(&lowered, EsgCategory::Governance),
        }
    }

    /// `min(0.95, 0.5 + 0.05 * hits + 0.2 * min(1, chars / 1000))`.
    pub fn compute(&self, keyword_hits: usize, chars: usize) -> f64 {
        let length_factor = (chars as f64 / LENGTH_SATURATION_CHARS).min(1.0);
        let raw = BASE_SCORE + PER_KEYWORD * keyword_hits as f64 + LENGTH_WEIGHT * length_factor;
        raw.min(MAX_FALLBACK_SCORE)
    }
}

fn feedback(hits: &CategoryHits, chars: usize) -> String {
    let mut lines = vec![format!(
        "Automated assessment (AI provider unavailable): {} ESG indicator(s) found in {} characters.",
        hits.total(),
        chars
    )];

    for category in EsgCategory::ALL {
        let found = hits.for_category(category);
        let listed = if found.is_empty() {
            "no indicators found".to_string()
        } else {
            found.join(", ")
        };
        lines.push(format!("{category} ({}): {listed}", found.len()));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_blank_input() {
        let result = FallbackScorer::new().score("  \n\t", Duration::ZERO);
        assert_eq!(result.score, 0.0);
        assert_eq!(result.feedback, NO_CONTENT_FEEDBACK);
        assert_eq!(result.provider_name, FALLBACK_PROVIDER);
    }

    #[test]
    fn test_compute_formula() {
        let scorer = FallbackScorer::new();
        assert!(approx(scorer.compute(0, 0), 0.5));
        assert!(approx(scorer.compute(2, 500), 0.7));
        assert!(approx(scorer.compute(0, 5000), 0.7));
        assert!(approx(scorer.compute(4, 1000), 0.9));
        assert!(approx(scorer.compute(30, 10_000), 0.95));
    }

    #[test]
    fn test_score_counts_distinct_keywords() {
        let text = "Our carbon emissions and energy use are reviewed by the board.";
        let scorer = FallbackScorer::new();
        let hits = scorer.assess(text);
        assert_eq!(hits.environmental, vec!["carbon", "emission", "energy"]);
        assert_eq!(hits.governance, vec!["board"]);
        assert!(hits.social.is_empty());

        let result = scorer.score(text, Duration::from_millis(3));
        let expected = 0.5 + 0.05 * 4.0 + 0.2 * (text.chars().count() as f64 / 1000.0);
        assert!(approx(result.score, expected));
        assert_eq!(result.provider_name, "fallback");
        assert_eq!(result.processing_time_ms, 3);
    }

    #[test]
    fn test_deterministic() {
        let text = "Employee safety training and a whistle-blowing policy are in place.";
        let scorer = FallbackScorer::new();
        let a = scorer.score(text, Duration::ZERO);
        let b = scorer.score(text, Duration::ZERO);
        assert_eq!(a.score, b.score);
        assert_eq!(a.feedback, b.feedback);
    }

    #[test]
    fn test_feedback_lists_categories() {
        let result = FallbackScorer::new().score("Water recycling programme", Duration::ZERO);
        assert!(result.feedback.contains("environmental (2): water, recycling"));
        assert!(result.feedback.contains("social (0): no indicators found"));
        assert!(result.feedback.contains("governance (0): no indicators found"));
    }

    #[test]
    fn test_feedback_counts_hits_per_category() {
        let text = "The board commissioned an audit of carbon reporting and employee safety.";
        let result = FallbackScorer::new().score(text, Duration::ZERO);
        let lines: Vec<&str> = result.feedback.lines().collect();

        assert_eq!(lines.len(), 4);
        assert!(lines[0].contains("5 ESG indicator(s)"));
        assert_eq!(lines[1], "environmental (1): carbon");
        assert_eq!(lines[2], "social (2): employee, safety");
        assert_eq!(lines[3], "governance (2): board, audit");
    }

    #[test]
    fn test_score_capped() {
        let text = ENVIRONMENT_HEAVY.repeat(20);
        let result = FallbackScorer::new().score(&text, Duration::ZERO);
        assert!(approx(result.score, 0.95));
    }

    const ENVIRONMENT_HEAVY: &str = "carbon emission energy renewable waste water climate \
        pollution biodiversity recycling employee diversity safety community board audit ";
}
