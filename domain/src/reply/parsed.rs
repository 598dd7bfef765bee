//! Parsed reply types

use super::score::DEFAULT_SCORE;
use crate::core::category::PromptCategory;
use crate::core::string::trimmed_char_len;
use serde::{Deserialize, Serialize};

/// Which step of a round produced the reply, and so which sections to expect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplyKind {
    /// `THINKING:` then `IMPROVED PROMPT:`
    Improvement,
    /// Optional `THINKING:`, then `SCORE:` and `FEEDBACK:`
    Review,
}

impl ReplyKind {
    /// Labels that must all appear, in order, for structured extraction
    pub fn required_labels(&self) -> &'static [&'static str] {
        match self {
            ReplyKind::Improvement => &["THINKING", "IMPROVED PROMPT"],
            ReplyKind::Review => &["SCORE", "FEEDBACK"],
        }
    }

    /// Labels that open a section of this kind of reply. Any other label is
    /// ordinary text, so a rewritten prompt may contain `SCORE:` or
    /// `FEEDBACK:` lines of its own.
    pub fn section_labels(&self) -> &'static [&'static str] {
        match self {
            ReplyKind::Improvement => &["THINKING", "IMPROVED PROMPT"],
            ReplyKind::Review => &["THINKING", "SCORE", "FEEDBACK"],
        }
    }

    pub fn expects_score(&self) -> bool {
        matches!(self, ReplyKind::Review)
    }
}

/// What the parser needs to know besides the raw text
#[derive(Debug, Clone, Copy)]
pub struct ParseContext<'a> {
    pub kind: ReplyKind,
    /// Prompt the reply was meant to transform (improvement) or judge (review)
    pub source_prompt: &'a str,
    pub category: PromptCategory,
}

impl<'a> ParseContext<'a> {
    pub fn new(kind: ReplyKind, source_prompt: &'a str, category: PromptCategory) -> Self {
        Self {
            kind,
            source_prompt,
            category,
        }
    }
}

/// Strategy that produced a [`ParsedReply`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Structured,
    Heuristic,
    Fallback,
}

/// Structured view of one model reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedReply {
    pub thinking: Option<String>,
    /// Rewritten prompt for improvements, feedback text for reviews.
    /// Always non-empty once returned by the parser.
    pub payload: String,
    /// Clamped to 1-10 when present
    pub score: Option<f64>,
    pub feedback: Option<String>,
    pub strategy: StrategyKind,
}

impl ParsedReply {
    pub fn empty(strategy: StrategyKind) -> Self {
        Self {
            thinking: None,
            payload: String::new(),
            score: None,
            feedback: None,
            strategy,
        }
    }

    /// Whether this reply can be returned without falling back further
    pub fn is_usable(&self, ctx: &ParseContext<'_>) -> bool {
        let payload_len = trimmed_char_len(&self.payload);
        if payload_len == 0 {
            return false;
        }
        match ctx.kind {
            // Less than half the prior prompt is not a rewrite, it's a fragment
            ReplyKind::Improvement => payload_len * 2 >= trimmed_char_len(ctx.source_prompt),
            ReplyKind::Review => true,
        }
    }

    /// Fill fields missing from `self` with the ones in `other`
    pub fn merge(self, other: ParsedReply) -> ParsedReply {
        fn pick(a: Option<String>, b: Option<String>) -> Option<String> {
            a.filter(|s| !s.trim().is_empty()).or(b)
        }
        ParsedReply {
            thinking: pick(self.thinking, other.thinking),
            payload: if self.payload.trim().is_empty() {
                other.payload
            } else {
                self.payload
            },
            score: self.score.or(other.score),
            feedback: pick(self.feedback, other.feedback),
            strategy: self.strategy,
        }
    }

    /// Normalize fields before handing the reply out: trim text, drop empty
    /// optionals, clamp the score and default it when one was expected.
    pub(crate) fn finish(mut self, ctx: &ParseContext<'_>) -> ParsedReply {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
        }
        self.thinking = clean(self.thinking);
        self.feedback = clean(self.feedback);
        self.payload = self.payload.trim().to_string();
        self.score = self.score.map(|s| s.clamp(1.0, 10.0));
        if ctx.kind.expects_score() && self.score.is_none() {
            self.score = Some(DEFAULT_SCORE);
        }
        self
    }
}
