//! Free-text reply parsing
//!
//! Models are asked to answer with labeled sections (`THINKING:`,
//! `IMPROVED PROMPT:`, `SCORE:`, `FEEDBACK:`) but often don't. A reply goes
//! through an ordered chain of strategies; the first usable result wins and
//! the last strategy cannot fail, so [`ReplyParser::parse`] is total.
//!
//! | Strategy | Handles |
//! |----------|---------|
//! | [`StructuredExtraction`] | Exact labels, in the expected order |
//! | [`HeuristicScan`] | Labels present but loosely formatted |
//! | [`TemplateFallback`] | Anything else, including empty replies |

pub mod enhancement;
pub mod parsed;
pub mod score;
pub mod strategies;

pub use parsed::{ParseContext, ParsedReply, ReplyKind, StrategyKind};
pub use score::{DEFAULT_SCORE, parse_score, parse_section_score};
pub use strategies::{HeuristicScan, ParseStrategy, StructuredExtraction, TemplateFallback};

/// Ordered chain of parsing strategies ending in the template fallback
pub struct ReplyParser {
    strategies: Vec<Box<dyn ParseStrategy>>,
    fallback: TemplateFallback,
}

impl Default for ReplyParser {
    fn default() -> Self {
        Self {
            strategies: vec![Box::new(StructuredExtraction), Box::new(HeuristicScan)],
            fallback: TemplateFallback,
        }
    }
}

impl ReplyParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a raw reply. Never fails.
    ///
    /// A strategy result that is present but unusable (for example a payload
    /// far shorter than the prompt it should rewrite) is kept as a partial so
    /// the fallback can reuse its thinking, score and feedback.
    pub fn parse(&self, raw: &str, ctx: &ParseContext<'_>) -> ParsedReply {
        let mut partial: Option<ParsedReply> = None;

        for strategy in &self.strategies {
            if let Some(reply) = strategy.parse(raw, ctx) {
                if reply.is_usable(ctx) {
                    return reply.finish(ctx);
                }
                partial = Some(match partial {
                    Some(previous) => previous.merge(reply),
                    None => reply,
                });
            }
        }

        self.fallback.complete(raw, ctx, partial).finish(ctx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::category::PromptCategory;

    fn improve_ctx(prompt: &str) -> ParseContext<'_> {
        ParseContext::new(ReplyKind::Improvement, prompt, PromptCategory::Creative)
    }

    fn review_ctx() -> ParseContext<'static> {
        ParseContext::new(ReplyKind::Review, "Write about AI", PromptCategory::Creative)
    }

    #[test]
    fn test_numbered_review_without_score_stays_neutral() {
        let raw = "1. The rewrite names an audience.\n2. It still lacks a length.";
        let reply = ReplyParser::new().parse(raw, &review_ctx());
        assert_eq!(reply.strategy, StrategyKind::Fallback);
        assert_eq!(reply.score, Some(DEFAULT_SCORE));
    }

    #[test]
    fn test_review_opening_with_a_count_stays_neutral() {
        let raw = "10 words were added, which makes it clearer but still vague.";
        let reply = ReplyParser::new().parse(raw, &review_ctx());
        assert_eq!(reply.score, Some(DEFAULT_SCORE));
        assert_eq!(reply.payload, raw);
    }

    #[test]
    fn test_well_formed_improvement() {
        let raw = "THINKING: Needs a format and an audience.\n\nIMPROVED PROMPT:\nWrite a 600-word essay about how AI changes everyday work, for a general audience.";
        let reply = ReplyParser::new().parse(raw, &improve_ctx("Write about AI"));
        assert_eq!(reply.strategy, StrategyKind::Structured);
        assert_eq!(reply.thinking.as_deref(), Some("Needs a format and an audience."));
        assert!(reply.payload.starts_with("Write a 600-word essay"));
        assert_eq!(reply.score, None);
    }

    #[test]
    fn test_loose_labels_use_heuristic() {
        let raw = "**Thinking**\nThe prompt is vague.\n\n**Improved Prompt:**\nWrite a short story about an AI that learns to paint.";
        let reply = ReplyParser::new().parse(raw, &improve_ctx("Write about AI"));
        assert_eq!(reply.strategy, StrategyKind::Heuristic);
        assert_eq!(reply.thinking.as_deref(), Some("The prompt is vague."));
        assert_eq!(
            reply.payload,
            "Write a short story about an AI that learns to paint."
        );
    }

    #[test]
    fn test_empty_reply_falls_back_to_template() {
        let reply = ReplyParser::new().parse("", &improve_ctx("Write about AI"));
        assert_eq!(reply.strategy, StrategyKind::Fallback);
        assert!(reply.payload.contains("Write about AI"));
        assert!(reply.payload.len() > "Write about AI".len());
    }

    #[test]
    fn test_short_payload_falls_back_but_keeps_thinking() {
        let prompt = "Write a detailed guide to composting at home for apartment dwellers";
        let raw = "THINKING: Add structure.\nIMPROVED PROMPT: Compost.";
        let reply = ReplyParser::new().parse(raw, &improve_ctx(prompt));
        assert_eq!(reply.strategy, StrategyKind::Fallback);
        assert_eq!(reply.thinking.as_deref(), Some("Add structure."));
        assert!(reply.payload.contains(prompt));
    }

    #[test]
    fn test_well_formed_review() {
        let raw = "THINKING: Compared both.\nSCORE: 8.5\nFEEDBACK: Much clearer audience and length.";
        let reply = ReplyParser::new().parse(raw, &review_ctx());
        assert_eq!(reply.strategy, StrategyKind::Structured);
        assert_eq!(reply.score, Some(8.5));
        assert_eq!(reply.feedback.as_deref(), Some("Much clearer audience and length."));
        assert_eq!(reply.payload, "Much clearer audience and length.");
    }

    #[test]
    fn test_review_without_score_defaults_to_neutral() {
        let reply = ReplyParser::new().parse("Looks decent overall.", &review_ctx());
        assert_eq!(reply.score, Some(DEFAULT_SCORE));
        assert_eq!(reply.payload, "Looks decent overall.");
    }

    #[test]
    fn test_review_score_is_clamped() {
        let reply = ReplyParser::new().parse("SCORE: 14\nFEEDBACK: Perfect.", &review_ctx());
        assert_eq!(reply.score, Some(10.0));
    }

    #[test]
    fn test_parse_is_total() {
        let inputs = [
            "",
            "   ",
            "\n\n\n",
            "SCORE:",
            "IMPROVED PROMPT:",
            "THINKING:\nIMPROVED PROMPT:\n",
            "🤖🤖🤖",
            "score score score",
            "{\"score\": \"high\"}",
        ];
        let parser = ReplyParser::new();
        for raw in inputs {
            let improved = parser.parse(raw, &improve_ctx("Write about AI"));
            assert!(!improved.payload.trim().is_empty(), "improvement {raw:?}");

            let reviewed = parser.parse(raw, &review_ctx());
            assert!(!reviewed.payload.trim().is_empty(), "review {raw:?}");
            let score = reviewed.score.unwrap();
            assert!((1.0..=10.0).contains(&score), "review {raw:?}");
        }
    }
}
