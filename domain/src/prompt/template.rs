//! Prompt templates for the battle flow

use crate::core::category::PromptCategory;

/// Templates for generating the requests sent at each step
pub struct PromptTemplate;

impl PromptTemplate {
    /// Request sent to the improver
    ///
    /// `feedback` is the previous reviewer's feedback, if any round has been
    /// scored yet.
    pub fn improve_prompt(
        original: &str,
        current: &str,
        category: PromptCategory,
        feedback: Option<&str>,
    ) -> String {
        let mut prompt = format!(
            r#"You are an expert prompt engineer competing to write the best possible {category} prompt.

Original request:
{original}

Current version:
{current}
"#
        );

        if let Some(feedback) = feedback.filter(|f| !f.trim().is_empty()) {
            prompt.push_str(&format!(
                "\nThe other reviewer said about the current version:\n{}\n",
                feedback.trim()
            ));
        }

        prompt.push_str(
            r#"
Rewrite the current version so it is clearer, more specific and more useful, while keeping the original intent.

Reply in exactly this format:
THINKING: <your reasoning about what to change and why>
IMPROVED PROMPT: <the complete rewritten prompt, nothing else>"#,
        );

        prompt
    }

    /// Request sent to the reviewer
    pub fn review_prompt(original: &str, improved: &str, category: PromptCategory) -> String {
        format!(
            r#"You are a strict judge of {category} prompts.

Original prompt:
{original}

Improved prompt:
{improved}

Score the improved prompt from 1 to 10 for clarity, specificity and how well it preserves the original intent. Reserve 9.5 and above for prompts you would not change at all.

Reply in exactly this format:
THINKING: <your reasoning>
SCORE: <number from 1 to 10>
FEEDBACK: <concrete suggestions for the next revision>"#
        )
    }

    /// Minimal request used to check whether a model answers at all
    pub fn health_check() -> &'static str {
        "Reply with the single word OK."
    }
}
