//! Prompt categories
//!
//! The category decides which pair of models battles over a prompt and which
//! enhancement template the reply parser falls back to.

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// Kind of prompt being refined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptCategory {
    Creative,
    Technical,
    Coding,
    Business,
    Educational,
    #[default]
    General,
}

/// Keyword table used by [`PromptCategory::detect`]. Earlier rows win ties.
const KEYWORDS: &[(PromptCategory, &[&str])] = &[
    (
        PromptCategory::Coding,
        &[
            "code", "function", "rust", "python", "javascript", "typescript", "bug", "refactor",
            "sql", "regex", "compile",
        ],
    ),
    (
        PromptCategory::Technical,
        &[
            "api", "architecture", "system", "database", "network", "protocol", "algorithm",
            "kubernetes", "server", "performance", "technical",
        ],
    ),
    (
        PromptCategory::Creative,
        &[
            "story", "poem", "write about", "creative", "fiction", "character", "song", "novel",
            "imagine", "describe",
        ],
    ),
    (
        PromptCategory::Business,
        &[
            "marketing", "business", "sales", "strategy", "customer", "startup", "revenue",
            "pitch", "email", "brand",
        ],
    ),
    (
        PromptCategory::Educational,
        &[
            "explain", "teach", "lesson", "student", "learn", "tutorial", "course", "quiz",
            "beginner",
        ],
    ),
];

impl PromptCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromptCategory::Creative => "creative",
            PromptCategory::Technical => "technical",
            PromptCategory::Coding => "coding",
            PromptCategory::Business => "business",
            PromptCategory::Educational => "educational",
            PromptCategory::General => "general",
        }
    }

    pub fn all() -> [PromptCategory; 6] {
        [
            PromptCategory::Creative,
            PromptCategory::Technical,
            PromptCategory::Coding,
            PromptCategory::Business,
            PromptCategory::Educational,
            PromptCategory::General,
        ]
    }

    /// Guess the category from prompt keywords.
    ///
    /// Scores each category by the number of keyword hits and picks the
    /// highest; falls back to [`PromptCategory::General`] with no hits.
    pub fn detect(prompt: &str) -> PromptCategory {
        let lower = prompt.to_lowercase();
        let mut best = (PromptCategory::General, 0usize);
        for (category, words) in KEYWORDS {
            let hits = words.iter().filter(|w| lower.contains(*w)).count();
            if hits > best.1 {
                best = (*category, hits);
            }
        }
        best.0
    }
}

impl std::fmt::Display for PromptCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PromptCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "creative" => Ok(PromptCategory::Creative),
            "technical" | "tech" => Ok(PromptCategory::Technical),
            "coding" | "code" => Ok(PromptCategory::Coding),
            "business" => Ok(PromptCategory::Business),
            "educational" | "education" => Ok(PromptCategory::Educational),
            "general" => Ok(PromptCategory::General),
            other => Err(DomainError::InvalidCategory(other.to_string())),
        }
    }
}
