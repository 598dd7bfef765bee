//! Battle parameters — use case loop control.
//!
//! [`BattleParams`] groups what [`RunBattleUseCase`](crate::use_cases::run_battle::RunBattleUseCase)
//! needs beyond the domain [`BattlePolicy`]: request sizes, sampling
//! temperatures and the reviewer fallback switch.

use arena_domain::BattlePolicy;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleParams {
    /// Convergence thresholds and round limit
    pub policy: BattlePolicy,
    /// Token limit for improve calls
    pub improve_max_tokens: u32,
    /// Token limit for review calls
    pub review_max_tokens: u32,
    /// Sampling temperature for improve calls
    pub improve_temperature: f32,
    /// Sampling temperature for review calls (kept low for stable scores)
    pub review_temperature: f32,
    /// When the reviewer call fails, let the improver score its own rewrite
    /// instead of discarding the round.
    pub self_review_fallback: bool,
}

impl Default for BattleParams {
    fn default() -> Self {
        Self {
            policy: BattlePolicy::default(),
            improve_max_tokens: 1024,
            review_max_tokens: 512,
            improve_temperature: 0.7,
            review_temperature: 0.2,
            self_review_fallback: true,
        }
    }
}

impl BattleParams {
    // ==================== Builder Methods ====================

    pub fn with_policy(mut self, policy: BattlePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.policy.max_rounds = max_rounds;
        self
    }

    pub fn with_self_review_fallback(mut self, enabled: bool) -> Self {
        self.self_review_fallback = enabled;
        self
    }
}
