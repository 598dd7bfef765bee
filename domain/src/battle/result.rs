//! Battle outcome and the final, immutable battle result

use super::round::{Round, RoundUsage};
use crate::core::category::PromptCategory;
use crate::core::model::Model;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Terminal state of the battle loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BattleOutcome {
    /// A reviewer score reached the consensus threshold
    Converged,
    /// Too many consecutive rounds without meaningful improvement
    Plateaued,
    /// The maximum number of round attempts was used up
    RoundLimitReached,
    /// The caller cancelled between rounds
    Cancelled,
}

impl BattleOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            BattleOutcome::Converged => "converged",
            BattleOutcome::Plateaued => "plateaued",
            BattleOutcome::RoundLimitReached => "round limit reached",
            BattleOutcome::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for BattleOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single artifact a battle produces. Never mutated after it is returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BattleResult {
    pub id: String,
    pub original_prompt: String,
    pub final_prompt: String,
    pub category: PromptCategory,
    pub rounds: Vec<Round>,
    pub model_a: Model,
    pub model_b: Model,
    pub total_rounds: usize,
    pub consensus_achieved: bool,
    pub final_score: f64,
    pub winner_model: Model,
    pub outcome: BattleOutcome,
    pub improvement_count: usize,
    pub total_tokens: u64,
    pub total_cost: f64,
    pub narrative: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: DateTime<Utc>,
}

/// Everything known about a battle when its loop ends
#[derive(Debug, Clone)]
pub struct BattleRecord {
    pub id: String,
    pub original_prompt: String,
    pub category: PromptCategory,
    pub model_a: Model,
    pub model_b: Model,
    pub rounds: Vec<Round>,
    pub outcome: BattleOutcome,
    pub started_at: DateTime<Utc>,
}

impl BattleResult {
    /// Assemble the final result from the round history.
    ///
    /// Returns `None` when no round was recorded. On consensus the last round
    /// is final; otherwise the best-scoring round wins (earliest on ties).
    pub fn finalize(record: BattleRecord, completed_at: DateTime<Utc>) -> Option<BattleResult> {
        let chosen = match record.outcome {
            BattleOutcome::Converged => record.rounds.last(),
            _ => best_round(&record.rounds),
        }?
        .clone();

        let improvement_count = record.rounds.iter().filter(|r| r.is_improvement).count();
        let usage = record
            .rounds
            .iter()
            .fold(RoundUsage::default(), |acc, r| acc + r.usage);
        let consensus_achieved = record.outcome == BattleOutcome::Converged;
        let narrative = narrate(&record, &chosen, improvement_count);

        Some(BattleResult {
            id: record.id,
            original_prompt: record.original_prompt,
            final_prompt: chosen.prompt_after,
            category: record.category,
            total_rounds: record.rounds.len(),
            rounds: record.rounds,
            model_a: record.model_a,
            model_b: record.model_b,
            consensus_achieved,
            final_score: chosen.reviewer_score,
            winner_model: chosen.improver_model,
            outcome: record.outcome,
            improvement_count,
            total_tokens: usage.tokens,
            total_cost: usage.cost,
            narrative,
            started_at: record.started_at,
            completed_at,
        })
    }

    /// Round whose prompt became the final prompt
    pub fn winning_round(&self) -> Option<&Round> {
        self.rounds
            .iter()
            .find(|r| r.prompt_after == self.final_prompt && r.reviewer_score == self.final_score)
    }

    pub fn duration(&self) -> chrono::Duration {
        self.completed_at - self.started_at
    }
}

fn best_round(rounds: &[Round]) -> Option<&Round> {
    rounds.iter().fold(None, |best: Option<&Round>, round| match best {
        Some(b) if b.reviewer_score >= round.reviewer_score => Some(b),
        _ => Some(round),
    })
}

fn narrate(record: &BattleRecord, chosen: &Round, improvements: usize) -> String {
    let rounds = record.rounds.len();
    let mut text = format!(
        "{} and {} refined the prompt over {} round{} with {} improvement{}.",
        record.model_a,
        record.model_b,
        rounds,
        if rounds == 1 { "" } else { "s" },
        improvements,
        if improvements == 1 { "" } else { "s" },
    );

    let ending = match record.outcome {
        BattleOutcome::Converged => format!(
            " Consensus reached in round {} at {:.1}/10.",
            chosen.index, chosen.reviewer_score
        ),
        BattleOutcome::Plateaued => format!(
            " Scores plateaued; the best version came from round {} at {:.1}/10.",
            chosen.index, chosen.reviewer_score
        ),
        BattleOutcome::RoundLimitReached => format!(
            " The round limit was reached; the best version came from round {} at {:.1}/10.",
            chosen.index, chosen.reviewer_score
        ),
        BattleOutcome::Cancelled => format!(
            " The battle was cancelled; keeping round {} at {:.1}/10.",
            chosen.index, chosen.reviewer_score
        ),
    };
    text.push_str(&ending);
    text.push_str(&format!(" Winner: {}.", chosen.improver_model));
    text
}
