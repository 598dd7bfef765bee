//! Score extraction from reviewer prose.
//!
//! Supports several formats, tried in order:
//!
//! 1. **JSON**: `{"score": 8.5, "feedback": "..."}`
//! 2. **Fraction**: `8/10`, `Score: 7.5 / 10`
//! 3. **Keyword**: `score of 9`, `Rating - 6`
//! 4. **Leading number**: `9.6` at the start of the text. Only
//!    [`parse_section_score`] accepts this form; in prose a leading number
//!    is a list marker or a count, not a score.

use regex::Regex;
use std::sync::LazyLock;

/// Neutral score used when a review carries no readable number
pub const DEFAULT_SCORE: f64 = 7.0;

static FRACTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+(?:\.\d+)?)\s*/\s*10\b").expect("valid regex"));

static KEYWORD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:score|rating|rate)\b[^0-9\n]{0,15}?(\d+(?:\.\d+)?)").expect("valid regex")
});

static LEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\**\s*(\d+(?:\.\d+)?)").expect("valid regex"));

/// Parse a 1-10 score from free text, clamped to range.
///
/// Returns `None` when nothing score-like is found; callers decide the
/// default.
///
/// # Examples
///
/// ```
/// use arena_domain::reply::score::parse_score;
///
/// assert_eq!(parse_score(r#"{"score": 8, "feedback": "Good"}"#), Some(8.0));
/// assert_eq!(parse_score("I rate this 7.5/10"), Some(7.5));
/// assert_eq!(parse_score("Score: 9"), Some(9.0));
/// assert_eq!(parse_score("No numbers here"), None);
/// ```
pub fn parse_score(text: &str) -> Option<f64> {
    json_score(text)
        .or_else(|| capture(&FRACTION, text))
        .or_else(|| capture(&KEYWORD, text))
        .filter(|s| s.is_finite())
        .map(|s| s.clamp(1.0, 10.0))
}

/// Parse the body of a `SCORE:` section, where a bare leading number is the
/// score itself.
pub fn parse_section_score(text: &str) -> Option<f64> {
    parse_score(text).or_else(|| {
        capture(&LEADING, text)
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(1.0, 10.0))
    })
}

fn json_score(text: &str) -> Option<f64> {
    let start = text.find('{')?;
    let end = text[start..].rfind('}')?;
    let parsed: serde_json::Value = serde_json::from_str(&text[start..start + end + 1]).ok()?;
    parsed.get("score").and_then(|v| v.as_f64())
}

fn capture(pattern: &Regex, text: &str) -> Option<f64> {
    pattern
        .captures(text)
        .and_then(|c| c.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
}
