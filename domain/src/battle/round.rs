//! A single improve + review round

use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// Token and cost totals of the calls made during one round.
///
/// `cost` is passed through from the endpoint as-is; nothing here prices
/// tokens.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundUsage {
    pub tokens: u64,
    pub cost: f64,
}

impl RoundUsage {
    pub fn add(&mut self, tokens: u64, cost: f64) {
        self.tokens += tokens;
        self.cost += cost;
    }
}

impl std::ops::Add for RoundUsage {
    type Output = RoundUsage;

    fn add(self, rhs: RoundUsage) -> RoundUsage {
        RoundUsage {
            tokens: self.tokens + rhs.tokens,
            cost: self.cost + rhs.cost,
        }
    }
}

/// One completed round. Immutable once appended to the battle history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Round {
    /// Round number (1-indexed, counts failed attempts too)
    pub index: usize,
    pub improver_model: Model,
    /// Model that actually produced the score
    pub reviewer_model: Model,
    pub prompt_before: String,
    pub prompt_after: String,
    pub reviewer_score: f64,
    pub reviewer_feedback: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improver_thinking: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_thinking: Option<String>,
    pub is_improvement: bool,
    pub consensus: bool,
    #[serde(default)]
    pub usage: RoundUsage,
}

impl Round {
    /// Change in length between the prompt before and after the round, in characters
    pub fn length_delta(&self) -> i64 {
        self.prompt_after.chars().count() as i64 - self.prompt_before.chars().count() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_round() -> Round {
        Round {
            index: 1,
            improver_model: Model::Llama33,
            reviewer_model: Model::DeepSeekR1,
            prompt_before: "Write about AI".to_string(),
            prompt_after: "Write a 500-word essay about AI".to_string(),
            reviewer_score: 8.2,
            reviewer_feedback: "Clearer scope".to_string(),
            improver_thinking: Some("Add length and form".to_string()),
            reviewer_thinking: None,
            is_improvement: true,
            consensus: false,
            usage: RoundUsage { tokens: 420, cost: 0.0012 },
        }
    }

    #[test]
    fn test_length_delta() {
        assert_eq!(sample_round().length_delta(), 17);
    }

    #[test]
    fn test_usage_accumulates() {
        let mut usage = RoundUsage::default();
        usage.add(100, 0.5);
        usage.add(50, 0.25);
        assert_eq!(usage, RoundUsage { tokens: 150, cost: 0.75 });
        assert_eq!((usage + usage).tokens, 300);
    }

    #[test]
    fn test_serializes_without_missing_thinking() {
        let json = serde_json::to_value(sample_round()).unwrap();
        assert!(json.get("reviewer_thinking").is_none());
        assert_eq!(json["improver_model"], "llama-3.3-70b");
    }
}
