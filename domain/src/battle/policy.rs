//! Convergence rules: when a round counts as progress and when the loop stops

use super::result::BattleOutcome;
use crate::core::error::DomainError;
use serde::{Deserialize, Serialize};

/// Tolerance for score comparisons, so 6.3 - 6.0 counts as a 0.3 gain
const SCORE_EPSILON: f64 = 1e-9;

/// Thresholds that drive the battle loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattlePolicy {
    /// Hard cap on round attempts, failed rounds included
    pub max_rounds: usize,
    /// Reviewer score at or above which both sides agree the prompt is done
    pub consensus_threshold: f64,
    /// Minimum gain over the best score so far for a round to count as progress
    pub improvement_margin: f64,
    /// Consecutive non-improving rounds tolerated before giving up
    pub max_plateau: usize,
}

impl Default for BattlePolicy {
    fn default() -> Self {
        Self {
            max_rounds: 5,
            consensus_threshold: 9.5,
            improvement_margin: 0.3,
            max_plateau: 2,
        }
    }
}

impl BattlePolicy {
    pub fn with_max_rounds(mut self, max_rounds: usize) -> Self {
        self.max_rounds = max_rounds;
        self
    }

    pub fn with_max_plateau(mut self, max_plateau: usize) -> Self {
        self.max_plateau = max_plateau;
        self
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        if self.max_rounds == 0 {
            return Err(DomainError::InvalidPolicy("max_rounds must be at least 1".into()));
        }
        if self.max_plateau == 0 {
            return Err(DomainError::InvalidPolicy("max_plateau must be at least 1".into()));
        }
        if !(1.0..=10.0).contains(&self.consensus_threshold) {
            return Err(DomainError::InvalidPolicy(format!(
                "consensus_threshold {} is outside 1-10",
                self.consensus_threshold
            )));
        }
        if self.improvement_margin < 0.0 {
            return Err(DomainError::InvalidPolicy(
                "improvement_margin cannot be negative".into(),
            ));
        }
        Ok(())
    }

    /// Judge a reviewer score against the best score seen so far
    pub fn judge(&self, score: f64, best_so_far: f64) -> RoundVerdict {
        RoundVerdict {
            is_improvement: score - best_so_far + SCORE_EPSILON >= self.improvement_margin,
            consensus: score >= self.consensus_threshold,
        }
    }
}

/// How a single round scored against the policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundVerdict {
    pub is_improvement: bool,
    pub consensus: bool,
}

/// What the loop should do after a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Swap roles and run another round
    Continue,
    /// Leave the loop in the given terminal state
    Stop(BattleOutcome),
}

/// Per-battle bookkeeping for the convergence rules.
///
/// Owned by one battle; never shared.
#[derive(Debug, Clone)]
pub struct ConvergenceTracker {
    policy: BattlePolicy,
    best_score: f64,
    plateau: usize,
    attempts: usize,
}

impl ConvergenceTracker {
    pub fn new(policy: BattlePolicy) -> Self {
        Self {
            policy,
            best_score: 0.0,
            plateau: 0,
            attempts: 0,
        }
    }

    pub fn policy(&self) -> &BattlePolicy {
        &self.policy
    }

    pub fn best_score(&self) -> f64 {
        self.best_score
    }

    pub fn plateau(&self) -> usize {
        self.plateau
    }

    pub fn attempts(&self) -> usize {
        self.attempts
    }

    /// Number the next round attempt will carry (1-indexed)
    pub fn next_index(&self) -> usize {
        self.attempts + 1
    }

    /// Whether another round may start
    pub fn has_rounds_left(&self) -> bool {
        self.attempts < self.policy.max_rounds
    }

    /// Record a scored round and decide whether to continue
    pub fn record_score(&mut self, score: f64) -> (RoundVerdict, Decision) {
        self.attempts += 1;
        let verdict = self.policy.judge(score, self.best_score);

        if verdict.consensus {
            self.best_score = self.best_score.max(score);
            return (verdict, Decision::Stop(BattleOutcome::Converged));
        }

        if verdict.is_improvement {
            self.best_score = score;
            self.plateau = 0;
        } else {
            self.plateau += 1;
            if self.plateau >= self.policy.max_plateau {
                return (verdict, Decision::Stop(BattleOutcome::Plateaued));
            }
        }

        (verdict, self.limit_decision())
    }

    /// Record a round that produced no score. Plateau is untouched.
    pub fn record_failure(&mut self) -> Decision {
        self.attempts += 1;
        self.limit_decision()
    }

    fn limit_decision(&self) -> Decision {
        if self.has_rounds_left() {
            Decision::Continue
        } else {
            Decision::Stop(BattleOutcome::RoundLimitReached)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_is_valid() {
        assert!(BattlePolicy::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_policies() {
        assert!(BattlePolicy::default().with_max_rounds(0).validate().is_err());
        assert!(BattlePolicy::default().with_max_plateau(0).validate().is_err());
        let policy = BattlePolicy {
            consensus_threshold: 11.0,
            ..BattlePolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn test_consensus_boundary() {
        let policy = BattlePolicy::default();
        assert!(!policy.judge(9.49, 0.0).consensus);
        assert!(policy.judge(9.5, 0.0).consensus);
        assert!(policy.judge(10.0, 0.0).consensus);
    }

    #[test]
    fn test_improvement_needs_margin() {
        let policy = BattlePolicy::default();
        assert!(policy.judge(6.3, 6.0).is_improvement);
        assert!(!policy.judge(6.29, 6.0).is_improvement);
        assert!(!policy.judge(6.1, 6.0).is_improvement);
        assert!(policy.judge(6.0, 0.0).is_improvement);
    }

    #[test]
    fn test_consensus_stops_immediately() {
        let mut tracker = ConvergenceTracker::new(BattlePolicy::default());
        let (verdict, decision) = tracker.record_score(9.6);
        assert!(verdict.consensus);
        assert_eq!(decision, Decision::Stop(BattleOutcome::Converged));
        assert_eq!(tracker.attempts(), 1);
    }

    #[test]
    fn test_two_flat_rounds_plateau() {
        let mut tracker = ConvergenceTracker::new(BattlePolicy::default().with_max_plateau(2));
        assert_eq!(tracker.record_score(6.0).1, Decision::Continue);
        assert_eq!(tracker.record_score(6.1).1, Decision::Continue);
        assert_eq!(tracker.plateau(), 1);
        assert_eq!(
            tracker.record_score(6.05).1,
            Decision::Stop(BattleOutcome::Plateaued)
        );
        assert_eq!(tracker.best_score(), 6.0);
    }

    #[test]
    fn test_improvement_resets_plateau() {
        let mut tracker = ConvergenceTracker::new(BattlePolicy::default());
        tracker.record_score(6.0);
        tracker.record_score(6.1);
        assert_eq!(tracker.plateau(), 1);
        let (verdict, decision) = tracker.record_score(7.0);
        assert!(verdict.is_improvement);
        assert_eq!(decision, Decision::Continue);
        assert_eq!(tracker.plateau(), 0);
        assert_eq!(tracker.best_score(), 7.0);
    }

    #[test]
    fn test_round_limit_counts_failures() {
        let mut tracker = ConvergenceTracker::new(BattlePolicy::default().with_max_rounds(3));
        assert_eq!(tracker.record_failure(), Decision::Continue);
        assert_eq!(tracker.record_score(5.0).1, Decision::Continue);
        assert_eq!(tracker.next_index(), 3);
        assert_eq!(
            tracker.record_score(7.0).1,
            Decision::Stop(BattleOutcome::RoundLimitReached)
        );
        assert!(!tracker.has_rounds_left());
    }

    #[test]
    fn test_failures_do_not_touch_plateau() {
        let mut tracker = ConvergenceTracker::new(BattlePolicy::default());
        tracker.record_score(6.0);
        tracker.record_score(6.0);
        tracker.record_failure();
        assert_eq!(tracker.plateau(), 1);
    }
}
