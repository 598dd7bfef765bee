//! Battle phase definitions

use serde::{Deserialize, Serialize};

/// Steps of the battle state machine, in the order they first occur
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattlePhase {
    /// Choosing the two models
    SelectPair,
    /// The improver rewrites the current prompt
    Improve,
    /// The reviewer scores the rewrite
    Review,
    /// The score is checked against the convergence rules
    Evaluate,
    /// The final result is assembled
    Finalize,
}

impl BattlePhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            BattlePhase::SelectPair => "select_pair",
            BattlePhase::Improve => "improve",
            BattlePhase::Review => "review",
            BattlePhase::Evaluate => "evaluate",
            BattlePhase::Finalize => "finalize",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            BattlePhase::SelectPair => "🎲",
            BattlePhase::Improve => "✍️",
            BattlePhase::Review => "🔍",
            BattlePhase::Evaluate => "⚖️",
            BattlePhase::Finalize => "🏁",
        }
    }

    /// Position within a round, used to spread progress evenly
    pub fn step_in_round(&self) -> Option<u8> {
        match self {
            BattlePhase::Improve => Some(0),
            BattlePhase::Review => Some(1),
            BattlePhase::Evaluate => Some(2),
            BattlePhase::SelectPair | BattlePhase::Finalize => None,
        }
    }
}

impl std::fmt::Display for BattlePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
