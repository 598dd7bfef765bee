//! Run Battle use case
//!
//! Drives the improve → review → evaluate loop between two models until the
//! convergence rules stop it, then assembles the [`BattleResult`].

use crate::config::BattleParams;
use crate::ports::battle_logger::{BattleEvent, BattleLogger, NoBattleLogger};
use crate::ports::llm_gateway::{CompletionGateway, CompletionRequest};
use crate::ports::progress::{BattleProgressNotifier, NoProgress, ProgressTracker};
use crate::resilience::{CallError, Priority, ResilientClient};
use arena_domain::{
    BattleOutcome, BattlePhase, BattleRecord, BattleResult, ConvergenceTracker, Decision,
    DomainError, Model, ParseContext, PromptCategory, PromptTemplate, PromptText, ReplyKind,
    ReplyParser, RolePair, Round, RoundUsage, select_pair,
};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Errors that end a battle without a result
#[derive(Error, Debug)]
pub enum RunBattleError {
    #[error("Invalid battle input: {0}")]
    InvalidInput(#[from] DomainError),

    #[error("No rounds completed after {attempts} attempt(s): {last_error}")]
    NoRoundsCompleted { attempts: usize, last_error: String },

    #[error("Battle cancelled before any round completed")]
    Cancelled,
}

/// Input for the RunBattle use case
#[derive(Debug, Clone)]
pub struct RunBattleInput {
    pub prompt: PromptText,
    /// Detected from the prompt when not given
    pub category: Option<PromptCategory>,
    /// Picked from the category table when not given
    pub models: Option<RolePair>,
}

impl RunBattleInput {
    pub fn new(prompt: PromptText) -> Self {
        Self {
            prompt,
            category: None,
            models: None,
        }
    }

    pub fn with_category(mut self, category: PromptCategory) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_models(mut self, models: RolePair) -> Self {
        self.models = Some(models);
        self
    }
}

/// What one successful round produced, before it is judged
struct PlayedRound {
    prompt_after: String,
    score: f64,
    feedback: String,
    improver_thinking: Option<String>,
    reviewer_thinking: Option<String>,
    reviewer: Model,
    usage: RoundUsage,
}

/// Inputs shared by every round of one battle
struct BattleContext<'a> {
    original: &'a str,
    category: PromptCategory,
}

/// Use case for running a prompt battle
pub struct RunBattleUseCase<G: CompletionGateway + ?Sized + 'static> {
    client: Arc<ResilientClient<G>>,
    params: BattleParams,
    parser: ReplyParser,
    logger: Arc<dyn BattleLogger>,
    cancellation: Option<CancellationToken>,
}

impl<G: CompletionGateway + ?Sized + 'static> RunBattleUseCase<G> {
    pub fn new(client: Arc<ResilientClient<G>>, params: BattleParams) -> Self {
        Self {
            client,
            params,
            parser: ReplyParser::new(),
            logger: Arc::new(NoBattleLogger),
            cancellation: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn BattleLogger>) -> Self {
        self.logger = logger;
        self
    }

    /// Stop between rounds once `token` is cancelled
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn params(&self) -> &BattleParams {
        &self.params
    }

    /// Execute the use case with default (no-op) progress
    pub async fn execute(&self, input: RunBattleInput) -> Result<BattleResult, RunBattleError> {
        self.execute_with_progress(input, &NoProgress).await
    }

    /// Execute the use case with progress callbacks
    pub async fn execute_with_progress(
        &self,
        input: RunBattleInput,
        progress: &dyn BattleProgressNotifier,
    ) -> Result<BattleResult, RunBattleError> {
        self.params.policy.validate()?;

        let original = input.prompt.content().to_string();
        let category = input
            .category
            .unwrap_or_else(|| PromptCategory::detect(&original));
        let mut pair = match input.models {
            Some(pair) => pair,
            None => select_pair(category),
        };
        let (model_a, model_b) = (pair.improver.clone(), pair.reviewer.clone());

        let id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        let mut tracker = ProgressTracker::new(progress, self.params.policy.max_rounds);

        info!(
            "Starting battle {} ({}): {} vs {}",
            id, category, model_a, model_b
        );
        tracker.report(
            BattlePhase::SelectPair,
            0,
            format!("{} vs {} ({})", model_a, model_b, category),
        );
        self.logger.log(BattleEvent::new(
            "battle_started",
            json!({
                "battle_id": id,
                "prompt": original,
                "category": category.as_str(),
                "model_a": model_a.as_str(),
                "model_b": model_b.as_str(),
            }),
        ));

        let ctx = BattleContext {
            original: &original,
            category,
        };
        let mut convergence = ConvergenceTracker::new(self.params.policy.clone());
        let mut rounds: Vec<Round> = Vec::new();
        let mut current = original.clone();
        let mut feedback: Option<String> = None;
        let mut last_error: Option<CallError> = None;
        let mut outcome = BattleOutcome::RoundLimitReached;

        while convergence.has_rounds_left() {
            if self.is_cancelled() {
                info!("Battle {} cancelled after {} round(s)", id, rounds.len());
                outcome = BattleOutcome::Cancelled;
                break;
            }

            let index = convergence.next_index();
            let played = self
                .play_round(&ctx, index, &pair, &current, feedback.as_deref(), &mut tracker)
                .await;

            let decision = match played {
                Ok(played) => {
                    let (verdict, decision) = convergence.record_score(played.score);
                    let round = Round {
                        index,
                        improver_model: pair.improver.clone(),
                        reviewer_model: played.reviewer,
                        prompt_before: current.clone(),
                        prompt_after: played.prompt_after,
                        reviewer_score: played.score,
                        reviewer_feedback: played.feedback,
                        improver_thinking: played.improver_thinking,
                        reviewer_thinking: played.reviewer_thinking,
                        is_improvement: verdict.is_improvement,
                        consensus: verdict.consensus,
                        usage: played.usage,
                    };

                    if verdict.is_improvement || verdict.consensus {
                        current = round.prompt_after.clone();
                    }
                    feedback = Some(round.reviewer_feedback.clone());

                    tracker.report(
                        BattlePhase::Evaluate,
                        index,
                        format!(
                            "Round {}: {:.1}/10{}",
                            index,
                            round.reviewer_score,
                            if round.consensus {
                                " (consensus)"
                            } else if round.is_improvement {
                                " (improved)"
                            } else {
                                ""
                            }
                        ),
                    );
                    debug!(
                        "Round {} scored {:.1} (best {:.1}, plateau {})",
                        index,
                        round.reviewer_score,
                        convergence.best_score(),
                        convergence.plateau()
                    );
                    self.logger.log(BattleEvent::new(
                        "round_recorded",
                        json!({ "battle_id": id, "round": round }),
                    ));
                    rounds.push(round);
                    decision
                }
                Err(error) => {
                    warn!(
                        "Round {} of battle {} failed ({} improving): {}",
                        index, id, pair.improver, error
                    );
                    tracker
                        .notifier()
                        .on_round_failed(index, &pair.improver, &error.to_string());
                    self.logger.log(BattleEvent::new(
                        "round_failed",
                        json!({
                            "battle_id": id,
                            "round": index,
                            "improver": pair.improver.as_str(),
                            "reviewer": pair.reviewer.as_str(),
                            "error_kind": error.kind(),
                            "error": error.to_string(),
                        }),
                    ));
                    last_error = Some(error);
                    convergence.record_failure()
                }
            };

            if let Decision::Stop(stop) = decision {
                outcome = stop;
                break;
            }
            pair.swap();
        }

        if rounds.is_empty() {
            if outcome == BattleOutcome::Cancelled {
                return Err(RunBattleError::Cancelled);
            }
            return Err(RunBattleError::NoRoundsCompleted {
                attempts: convergence.attempts(),
                last_error: last_error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| "no round was attempted".to_string()),
            });
        }

        let record = BattleRecord {
            id: id.clone(),
            original_prompt: original.clone(),
            category,
            model_a,
            model_b,
            rounds,
            outcome,
            started_at,
        };
        let attempts = convergence.attempts();
        let result = BattleResult::finalize(record, Utc::now()).ok_or_else(|| {
            RunBattleError::NoRoundsCompleted {
                attempts,
                last_error: "no round was recorded".to_string(),
            }
        })?;

        tracker.report(
            BattlePhase::Finalize,
            attempts,
            format!(
                "{} with {:.1}/10, winner {}",
                result.outcome, result.final_score, result.winner_model
            ),
        );
        self.logger.log(BattleEvent::new(
            "battle_finished",
            json!({
                "battle_id": result.id,
                "outcome": result.outcome,
                "total_rounds": result.total_rounds,
                "final_score": result.final_score,
                "winner": result.winner_model.as_str(),
                "total_tokens": result.total_tokens,
                "total_cost": result.total_cost,
            }),
        ));
        info!(
            "Battle {} finished: {} after {} round(s), score {:.1}, winner {}",
            result.id, result.outcome, result.total_rounds, result.final_score, result.winner_model
        );

        Ok(result)
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(|token| token.is_cancelled())
    }

    /// Improve then review. Any call failure fails the whole round.
    async fn play_round(
        &self,
        ctx: &BattleContext<'_>,
        index: usize,
        pair: &RolePair,
        current: &str,
        feedback: Option<&str>,
        tracker: &mut ProgressTracker<'_>,
    ) -> Result<PlayedRound, CallError> {
        let mut usage = RoundUsage::default();

        // Improve
        tracker.report(
            BattlePhase::Improve,
            index,
            format!("Round {}: {} is improving the prompt", index, pair.improver),
        );
        let request = CompletionRequest::new(
            pair.improver.clone(),
            PromptTemplate::improve_prompt(ctx.original, current, ctx.category, feedback),
        )
        .with_max_tokens(self.params.improve_max_tokens)
        .with_temperature(self.params.improve_temperature);
        let answer = self.client.complete(request, Priority::BATTLE).await?;
        usage.add(answer.tokens, answer.cost);

        let improved = self.parser.parse(
            &answer.text,
            &ParseContext::new(ReplyKind::Improvement, current, ctx.category),
        );
        debug!(
            "Round {} improvement parsed with {:?} strategy",
            index, improved.strategy
        );

        // Review
        tracker.report(
            BattlePhase::Review,
            index,
            format!("Round {}: {} is reviewing", index, pair.reviewer),
        );
        let review_prompt =
            PromptTemplate::review_prompt(ctx.original, &improved.payload, ctx.category);
        let (reviewer, answer) = match self.review(&pair.reviewer, &review_prompt).await {
            Ok(answer) => (pair.reviewer.clone(), answer),
            Err(error) if self.params.self_review_fallback => {
                warn!(
                    "Reviewer {} failed ({}), {} scores its own rewrite",
                    pair.reviewer, error, pair.improver
                );
                let answer = self.review(&pair.improver, &review_prompt).await?;
                (pair.improver.clone(), answer)
            }
            Err(error) => return Err(error),
        };
        usage.add(answer.tokens, answer.cost);

        let review = self.parser.parse(
            &answer.text,
            &ParseContext::new(ReplyKind::Review, &improved.payload, ctx.category),
        );

        Ok(PlayedRound {
            score: review.score.unwrap_or(arena_domain::DEFAULT_SCORE),
            feedback: review.feedback.unwrap_or(review.payload),
            reviewer_thinking: review.thinking,
            improver_thinking: improved.thinking,
            prompt_after: improved.payload,
            reviewer,
            usage,
        })
    }

    async fn review(
        &self,
        model: &Model,
        prompt: &str,
    ) -> Result<crate::resilience::CallOutcome, CallError> {
        let request = CompletionRequest::new(model.clone(), prompt)
            .with_max_tokens(self.params.review_max_tokens)
            .with_temperature(self.params.review_temperature);
        self.client.complete(request, Priority::BATTLE).await
    }
}
