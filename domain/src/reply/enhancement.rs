//! Deterministic, category-specific prompt enhancement.
//!
//! Used when no usable rewrite could be read from a model reply. The result
//! always contains the original prompt verbatim, followed by guidance that
//! suits the category, so it is never shorter than the input.

use crate::core::category::PromptCategory;

/// Guidance appended to a prompt for each category
fn guidance(category: PromptCategory) -> &'static [&'static str] {
    match category {
        PromptCategory::Creative => &[
            "Give the piece a clear point of view and a distinctive voice.",
            "Use concrete, sensory detail instead of abstractions.",
            "Open with a strong hook and end with a deliberate, memorable close.",
            "Aim for roughly 400-600 words unless a different length is stated.",
        ],
        PromptCategory::Technical => &[
            "State the assumptions and constraints you are working under.",
            "Structure the answer with headings: overview, design, trade-offs, risks.",
            "Include concrete examples, numbers or diagrams in text where they help.",
            "Call out failure modes and how to detect them.",
        ],
        PromptCategory::Coding => &[
            "Specify the language, version and any libraries that may be used.",
            "Provide complete, runnable code with error handling.",
            "Explain the approach briefly before the code and note its complexity.",
            "Include a few test cases covering edge cases.",
        ],
        PromptCategory::Business => &[
            "Identify the target audience and the decision this should support.",
            "Lead with a one-paragraph executive summary.",
            "Back claims with measurable outcomes, metrics or examples.",
            "Close with clear, prioritized next steps.",
        ],
        PromptCategory::Educational => &[
            "Assume a motivated beginner and define new terms when first used.",
            "Build from intuition to detail, with one worked example.",
            "Use short sections and a brief recap at the end.",
            "Finish with three questions the learner can use to check understanding.",
        ],
        PromptCategory::General => &[
            "Be specific about the desired format and length.",
            "State who the answer is for and what it will be used for.",
            "Prefer concrete examples over generalities.",
            "Summarize the key points at the end.",
        ],
    }
}

/// Build the templated enhancement of `prompt` for `category`
pub fn enhance(prompt: &str, category: PromptCategory) -> String {
    let base = prompt.trim();
    let mut out = String::with_capacity(base.len() + 320);
    if base.is_empty() {
        out.push_str("Respond to the following request thoroughly.");
    } else {
        out.push_str(base);
    }
    out.push_str("\n\nRequirements:\n");
    for line in guidance(category) {
        out.push_str("- ");
        out.push_str(line);
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enhance_keeps_original_prompt() {
        let out = enhance("Write about AI", PromptCategory::Creative);
        assert!(out.starts_with("Write about AI\n\nRequirements:\n- "));
        assert!(out.contains("sensory detail"));
    }

    #[test]
    fn test_enhance_is_deterministic_per_category() {
        for category in PromptCategory::all() {
            assert_eq!(enhance("x", category), enhance("x", category));
        }
        assert_ne!(
            enhance("x", PromptCategory::Coding),
            enhance("x", PromptCategory::Business)
        );
    }

    #[test]
    fn test_enhance_empty_prompt_still_has_text() {
        let out = enhance("   ", PromptCategory::General);
        assert!(out.starts_with("Respond to the following request"));
    }
}
