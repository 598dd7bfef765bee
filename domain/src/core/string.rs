//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// Uses byte length for max_len but ensures truncation occurs at valid
/// UTF-8 character boundaries.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        let target = max_len.saturating_sub(3);
        let mut end = target.min(s.len());
        while end > 0 && !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &s[..end])
    }
}

/// Collapse every run of whitespace (including newlines) into one space.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Length in characters after trimming, used for "implausibly short" checks.
pub fn trimmed_char_len(s: &str) -> usize {
    s.trim().chars().count()
}

/// Strip one layer of wrapping quotes or backticks that models like to add
/// around a rewritten prompt.
pub fn strip_wrapping_quotes(s: &str) -> &str {
    let trimmed = s.trim();
    for (open, close) in [("\"", "\""), ("'", "'"), ("```", "```"), ("`", "`"), ("“", "”")] {
        if trimmed.len() >= open.len() + close.len()
            && let Some(inner) = trimmed
                .strip_prefix(open)
                .and_then(|rest| rest.strip_suffix(close))
            && !inner.contains(close)
        {
            return inner.trim();
        }
    }
    trimmed
}
