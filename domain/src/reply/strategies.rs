//! Named parsing strategies, tried in order by [`super::ReplyParser`]

use super::enhancement::enhance;
use super::parsed::{ParseContext, ParsedReply, ReplyKind, StrategyKind};
use super::score::{parse_score, parse_section_score};
use crate::core::string::{collapse_whitespace, strip_wrapping_quotes};
use regex::Regex;
use std::sync::LazyLock;

/// One way of reading a reply. `None` means "not applicable, try the next".
pub trait ParseStrategy: Send + Sync {
    fn parse(&self, raw: &str, ctx: &ParseContext<'_>) -> Option<ParsedReply>;
}

// ==================== Structured extraction ====================

static LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(THINKING|IMPROVED PROMPT|SCORE|FEEDBACK)[ \t]*:").expect("valid regex")
});

struct LabelMatch<'a> {
    label: &'a str,
    start: usize,
    end: usize,
}

/// Exact, upper-case labels at the start of a line, in the expected order
pub struct StructuredExtraction;

impl StructuredExtraction {
    /// Label matches that open a section of this kind of reply
    fn labels(raw: &str, kind: ReplyKind) -> Vec<LabelMatch<'_>> {
        let own = kind.section_labels();
        LABEL
            .captures_iter(raw)
            .filter_map(|c| {
                let whole = c.get(0)?;
                Some(LabelMatch {
                    label: c.get(1)?.as_str(),
                    start: whole.start(),
                    end: whole.end(),
                })
            })
            .filter(|m| own.contains(&m.label))
            .collect()
    }

    /// Body of the section opened by `labels[index]`, up to the next section
    fn body<'a>(raw: &'a str, labels: &[LabelMatch<'_>], index: usize) -> &'a str {
        let end = labels.get(index + 1).map(|m| m.start).unwrap_or(raw.len());
        &raw[labels[index].end..end]
    }

    /// Indices of the required labels, each found after the previous one
    fn walk(labels: &[LabelMatch<'_>], required: &[&'static str]) -> Option<Vec<(&'static str, usize)>> {
        let mut found = Vec::with_capacity(required.len());
        let mut next = 0;
        for label in required {
            let index = next + labels[next..].iter().position(|m| m.label == *label)?;
            found.push((*label, index));
            next = index + 1;
        }
        Some(found)
    }
}

impl ParseStrategy for StructuredExtraction {
    fn parse(&self, raw: &str, ctx: &ParseContext<'_>) -> Option<ParsedReply> {
        let labels = Self::labels(raw, ctx.kind);
        let walked = Self::walk(&labels, ctx.kind.required_labels())?;

        let section = |label: &str| {
            walked
                .iter()
                .find(|(l, _)| *l == label)
                .map(|(_, index)| *index)
                .or_else(|| labels.iter().position(|m| m.label == label))
                .map(|index| Self::body(raw, &labels, index))
        };

        let mut reply = ParsedReply::empty(StrategyKind::Structured);
        reply.thinking = section("THINKING").map(str::to_string);

        match ctx.kind {
            ReplyKind::Improvement => {
                let body = section("IMPROVED PROMPT").unwrap_or_default();
                reply.payload = strip_wrapping_quotes(body).to_string();
            }
            ReplyKind::Review => {
                reply.score = section("SCORE").and_then(parse_section_score);
                let feedback = section("FEEDBACK").unwrap_or_default();
                reply.payload = feedback.trim().to_string();
                reply.feedback = Some(reply.payload.clone());
            }
        }
        Some(reply)
    }
}

// ==================== Heuristic line scan ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Thinking,
    Payload,
    Score,
    Feedback,
}

const THINKING_WORDS: &[&str] = &["thinking", "reasoning", "analysis", "thought process"];
const PAYLOAD_WORDS: &[&str] = &[
    "improved prompt",
    "enhanced prompt",
    "refined prompt",
    "rewritten prompt",
    "revised prompt",
    "new prompt",
    "final prompt",
];
const SCORE_WORDS: &[&str] = &["score", "rating"];
const FEEDBACK_WORDS: &[&str] = &["feedback", "critique", "suggestions", "comments"];

/// Longest label text (before a colon) still treated as a header
const MAX_HEADER_LEN: usize = 40;

/// Case-insensitive scan that switches section on lines that look like labels
pub struct HeuristicScan;

impl HeuristicScan {
    fn candidates(kind: ReplyKind) -> &'static [(Section, &'static [&'static str])] {
        match kind {
            ReplyKind::Improvement => &[
                (Section::Payload, PAYLOAD_WORDS),
                (Section::Thinking, THINKING_WORDS),
            ],
            ReplyKind::Review => &[
                (Section::Score, SCORE_WORDS),
                (Section::Feedback, FEEDBACK_WORDS),
                (Section::Thinking, THINKING_WORDS),
            ],
        }
    }

    /// If `line` is a header, return its section and any text after the colon
    fn header(line: &str, kind: ReplyKind) -> Option<(Section, &str)> {
        let trimmed = line.trim();
        let (head, rest) = match trimmed.split_once(':') {
            Some((head, rest)) => (head, Some(rest)),
            None => (trimmed, None),
        };
        let decorated = trimmed.starts_with('#') || trimmed.starts_with("**");
        let clean = head
            .trim_matches(|c: char| matches!(c, '#' | '*' | '_' | '-' | ' ' | '\t'))
            .to_lowercase();
        if clean.is_empty() || clean.chars().count() > MAX_HEADER_LEN {
            return None;
        }
        if rest.is_none() && !decorated {
            return None;
        }

        Self::candidates(kind)
            .iter()
            .find(|(_, words)| words.iter().any(|w| clean.contains(w)))
            .map(|(section, _)| {
                let rest = rest.unwrap_or_default().trim().trim_matches('*').trim();
                (*section, rest)
            })
    }
}

impl ParseStrategy for HeuristicScan {
    fn parse(&self, raw: &str, ctx: &ParseContext<'_>) -> Option<ParsedReply> {
        let mut current: Option<Section> = None;
        let mut seen_header = false;
        let mut thinking = Vec::new();
        let mut payload = Vec::new();
        let mut score = Vec::new();
        let mut feedback = Vec::new();

        for line in raw.lines() {
            let text = match Self::header(line, ctx.kind) {
                Some((section, rest)) => {
                    current = Some(section);
                    seen_header = true;
                    rest
                }
                None => line.trim(),
            };
            if text.is_empty() {
                continue;
            }
            match current {
                Some(Section::Thinking) => thinking.push(text),
                Some(Section::Payload) => payload.push(text),
                Some(Section::Score) => score.push(text),
                Some(Section::Feedback) => feedback.push(text),
                None => {}
            }
        }

        if !seen_header {
            return None;
        }

        let mut reply = ParsedReply::empty(StrategyKind::Heuristic);
        reply.thinking = Some(thinking.join("\n")).filter(|s| !s.is_empty());
        match ctx.kind {
            ReplyKind::Improvement => {
                reply.payload = strip_wrapping_quotes(&payload.join("\n")).to_string();
            }
            ReplyKind::Review => {
                reply.score = parse_section_score(&score.join("\n"));
                reply.payload = feedback.join("\n");
                reply.feedback = Some(reply.payload.clone()).filter(|s| !s.is_empty());
            }
        }
        Some(reply)
    }
}

// ==================== Template fallback ====================

const NO_FEEDBACK: &str = "The reviewer returned no feedback.";

/// Last resort: never fails.
///
/// Improvements get a category-specific templated enhancement of the source
/// prompt. Reviews keep whatever prose came back as feedback; a score is
/// only taken from explicit forms (`8/10`, `score: 8`, JSON), never from a
/// bare number in the prose.
pub struct TemplateFallback;

impl TemplateFallback {
    pub fn complete(
        &self,
        raw: &str,
        ctx: &ParseContext<'_>,
        partial: Option<ParsedReply>,
    ) -> ParsedReply {
        let mut reply = partial.unwrap_or_else(|| ParsedReply::empty(StrategyKind::Fallback));
        reply.strategy = StrategyKind::Fallback;

        match ctx.kind {
            ReplyKind::Improvement => {
                reply.payload = enhance(ctx.source_prompt, ctx.category);
            }
            ReplyKind::Review => {
                if reply.payload.trim().is_empty() {
                    let prose = collapse_whitespace(raw);
                    reply.payload = if prose.is_empty() {
                        NO_FEEDBACK.to_string()
                    } else {
                        prose
                    };
                }
                if reply.feedback.is_none() {
                    reply.feedback = Some(reply.payload.clone());
                }
                if reply.score.is_none() {
                    reply.score = parse_score(raw);
                }
            }
        }
        reply
    }
}

impl ParseStrategy for TemplateFallback {
    fn parse(&self, raw: &str, ctx: &ParseContext<'_>) -> Option<ParsedReply> {
        Some(self.complete(raw, ctx, None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::category::PromptCategory;

    fn ctx(kind: ReplyKind) -> ParseContext<'static> {
        ParseContext::new(kind, "Write about AI", PromptCategory::Creative)
    }

    #[test]
    fn test_structured_requires_order() {
        let raw = "IMPROVED PROMPT: Write an essay on AI.\nTHINKING: backwards";
        assert!(StructuredExtraction.parse(raw, &ctx(ReplyKind::Improvement)).is_none());
    }

    #[test]
    fn test_structured_requires_all_labels() {
        let raw = "SCORE: 8";
        assert!(StructuredExtraction.parse(raw, &ctx(ReplyKind::Review)).is_none());
    }

    #[test]
    fn test_structured_strips_quotes() {
        let raw = "THINKING: ok\nIMPROVED PROMPT: \"Write an essay on AI ethics.\"";
        let reply = StructuredExtraction
            .parse(raw, &ctx(ReplyKind::Improvement))
            .unwrap();
        assert_eq!(reply.payload, "Write an essay on AI ethics.");
    }

    #[test]
    fn test_structured_review_with_trailing_thinking() {
        let raw = "SCORE: 7/10\nFEEDBACK: Tighter.\nTHINKING: second thoughts";
        let reply = StructuredExtraction.parse(raw, &ctx(ReplyKind::Review)).unwrap();
        assert_eq!(reply.score, Some(7.0));
        assert_eq!(reply.payload, "Tighter.");
        assert_eq!(reply.thinking.as_deref(), Some(" second thoughts"));
    }

    #[test]
    fn test_structured_improvement_keeps_review_labels_in_prompt() {
        let raw = "THINKING: Make the grader explicit.\n\
                   IMPROVED PROMPT: Review my 800-word essay on climate policy as a teacher would.\n\
                   FEEDBACK: list three strengths and three weaknesses.\n\
                   SCORE: give a grade from 1 to 10.";
        let reply = StructuredExtraction
            .parse(raw, &ctx(ReplyKind::Improvement))
            .unwrap();
        assert!(reply.payload.starts_with("Review my 800-word essay"));
        assert!(reply.payload.contains("FEEDBACK: list three strengths"));
        assert!(reply.payload.ends_with("SCORE: give a grade from 1 to 10."));
    }

    #[test]
    fn test_structured_review_uses_sections_in_walk_order() {
        let raw = "FEEDBACK: scratch note\nSCORE: 8\nFEEDBACK: Clear audience, add a length.";
        let reply = StructuredExtraction.parse(raw, &ctx(ReplyKind::Review)).unwrap();
        assert_eq!(reply.score, Some(8.0));
        assert_eq!(reply.payload, "Clear audience, add a length.");
    }

    #[test]
    fn test_structured_improvement_ignores_stray_labels() {
        let raw = "SCORE: 3\nTHINKING: ok\nIMPROVED PROMPT: Write an essay on AI ethics.";
        let reply = StructuredExtraction
            .parse(raw, &ctx(ReplyKind::Improvement))
            .unwrap();
        assert_eq!(reply.thinking.as_deref(), Some(" ok\n"));
        assert_eq!(reply.payload, "Write an essay on AI ethics.");
    }

    #[test]
    fn test_heuristic_review_inline_values() {
        let raw = "## Rating: 8.5/10\n\n**Critique**\n- Good structure\n- Needs an example";
        let reply = HeuristicScan.parse(raw, &ctx(ReplyKind::Review)).unwrap();
        assert_eq!(reply.score, Some(8.5));
        assert_eq!(reply.payload, "- Good structure\n- Needs an example");
    }

    #[test]
    fn test_heuristic_ignores_long_lines() {
        let raw = "This sentence mentions the improved prompt: but it is far too long to be a header line.";
        assert!(HeuristicScan.parse(raw, &ctx(ReplyKind::Improvement)).is_none());
    }

    #[test]
    fn test_heuristic_review_ignores_prompt_words() {
        let raw = "Feedback: The new prompt: is clearer.";
        let reply = HeuristicScan.parse(raw, &ctx(ReplyKind::Review)).unwrap();
        assert_eq!(reply.payload, "The new prompt: is clearer.");
    }

    #[test]
    fn test_fallback_review_finds_score_in_prose() {
        let reply = TemplateFallback
            .parse("I'd give it 8/10, solid work.", &ctx(ReplyKind::Review))
            .unwrap();
        assert_eq!(reply.score, Some(8.0));
        assert_eq!(reply.payload, "I'd give it 8/10, solid work.");
    }

    #[test]
    fn test_fallback_review_empty() {
        let reply = TemplateFallback.parse("", &ctx(ReplyKind::Review)).unwrap();
        assert_eq!(reply.payload, NO_FEEDBACK);
        assert_eq!(reply.score, None);
    }

    #[test]
    fn test_fallback_improvement_uses_template() {
        let reply = TemplateFallback
            .parse("garbage", &ctx(ReplyKind::Improvement))
            .unwrap();
        assert_eq!(reply.payload, enhance("Write about AI", PromptCategory::Creative));
    }
}
