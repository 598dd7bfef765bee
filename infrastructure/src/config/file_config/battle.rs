//! Battle configuration from TOML (`[battle]` section)

use arena_application::BattleParams;
use arena_domain::BattlePolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBattleConfig {
    pub max_rounds: usize,
    pub consensus_threshold: f64,
    pub improvement_margin: f64,
    pub max_plateau: usize,
    pub improve_max_tokens: u32,
    pub review_max_tokens: u32,
    pub improve_temperature: f32,
    pub review_temperature: f32,
    /// Let the improver score its own rewrite when the reviewer fails
    pub self_review_fallback: bool,
}

impl Default for FileBattleConfig {
    fn default() -> Self {
        let params = BattleParams::default();
        Self {
            max_rounds: params.policy.max_rounds,
            consensus_threshold: params.policy.consensus_threshold,
            improvement_margin: params.policy.improvement_margin,
            max_plateau: params.policy.max_plateau,
            improve_max_tokens: params.improve_max_tokens,
            review_max_tokens: params.review_max_tokens,
            improve_temperature: params.improve_temperature,
            review_temperature: params.review_temperature,
            self_review_fallback: params.self_review_fallback,
        }
    }
}

impl FileBattleConfig {
    pub fn to_params(&self) -> BattleParams {
        BattleParams {
            policy: BattlePolicy {
                max_rounds: self.max_rounds,
                consensus_threshold: self.consensus_threshold,
                improvement_margin: self.improvement_margin,
                max_plateau: self.max_plateau,
            },
            improve_max_tokens: self.improve_max_tokens,
            review_max_tokens: self.review_max_tokens,
            improve_temperature: self.improve_temperature,
            review_temperature: self.review_temperature,
            self_review_fallback: self.self_review_fallback,
        }
    }
}
