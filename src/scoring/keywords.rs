//! ESG indicator keywords used by the offline fallback scorer.

use serde::{Deserialize, Serialize};

/// Environmental indicators.
pub const ENVIRONMENTAL: &[&str] = &[
    "carbon",
    "emission",
    "energy",
    "renewable",
    "waste",
    "water",
    "climate",
    "pollution",
    "biodiversity",
    "recycling",
];

/// Social indicators.
pub const SOCIAL: &[&str] = &[
    "employee",
    "diversity",
    "safety",
    "community",
    "human rights",
    "labor",
    "labour",
    "health",
    "training",
    "inclusion",
    "wellbeing",
];

/// Governance indicators.
pub const GOVERNANCE: &[&str] = &[
    "board",
    "compliance",
    "audit",
    "ethics",
    "transparency",
    "risk",
    "policy",
    "anti-corruption",
    "shareholder",
    "disclosure",
];

/// ESG category a keyword belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EsgCategory {
    /// Environmental.
    Environmental,
    /// Social.
    Social,
    /// Governance.
    Governance,
}

impl EsgCategory {
    /// All categories in reporting order.
    pub const ALL: [EsgCategory; 3] = [Self::Environmental, Self::Social, Self::Governance];

    /// Keywords for this category.
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            Self::Environmental => ENVIRONMENTAL,
            Self::Social => SOCIAL,
            Self::Governance => GOVERNANCE,
        }
    }

    /// Returns the category name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Environmental => "environmental",
            Self::Social => "social",
            Self::Governance => "governance",
        }
    }
}

impl std::fmt::Display for EsgCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Keywords of `category` present in `lowered`, each reported once.
///
/// `lowered` must already be lowercase. A keyword matches at the start of
/// a word and may carry a suffix, so `emission` matches `emissions` but
/// `diversity` does not match `biodiversity`.
pub fn matches(lowered: &str, category: EsgCategory) -> Vec<&'static str> {
    category
        .keywords()
        .iter()
        .copied()
        .filter(|keyword| contains_word_start(lowered, keyword))
        .collect()
}

fn contains_word_start(haystack: &str, keyword: &str) -> bool {
    haystack.match_indices(keyword).any(|(idx, _)| {
        haystack[..idx]
            .chars()
            .next_back()
            .map_or(true, |c| !c.is_alphanumeric())
    })
}
