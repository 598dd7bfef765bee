//! Prompt value object

use super::error::DomainError;
use serde::{Deserialize, Serialize};

/// A prompt submitted for refinement (Value Object)
///
/// Always non-empty after trimming. The original spacing is preserved,
/// since prompt formatting is part of what the models refine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptText {
    content: String,
}

impl PromptText {
    /// Try to create a prompt, rejecting empty or whitespace-only text
    pub fn try_new(content: impl Into<String>) -> Result<Self, DomainError> {
        let content = content.into();
        if content.trim().is_empty() {
            Err(DomainError::EmptyPrompt)
        } else {
            Ok(Self { content })
        }
    }

    /// Get the prompt content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Consume and return the inner content
    pub fn into_content(self) -> String {
        self.content
    }
}

impl std::fmt::Display for PromptText {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl TryFrom<&str> for PromptText {
    type Error = DomainError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        PromptText::try_new(s)
    }
}

impl TryFrom<String> for PromptText {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        PromptText::try_new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_creation() {
        let prompt = PromptText::try_new("Write about AI").unwrap();
        assert_eq!(prompt.content(), "Write about AI");
        assert_eq!(prompt.to_string(), "Write about AI");
    }

    #[test]
    fn test_empty_prompt_rejected() {
        assert_eq!(PromptText::try_new(""), Err(DomainError::EmptyPrompt));
        assert_eq!(PromptText::try_new("  \n\t"), Err(DomainError::EmptyPrompt));
    }

    #[test]
    fn test_try_from_string() {
        let prompt: PromptText = String::from("Explain TCP").try_into().unwrap();
        assert_eq!(prompt.into_content(), "Explain TCP");
    }
}
