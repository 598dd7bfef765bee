//! Model pairing and role rotation

use crate::core::category::PromptCategory;
use crate::core::error::DomainError;
use crate::core::model::Model;
use serde::{Deserialize, Serialize};

/// The two roles of a round, kept as data so swapping is a value operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RolePair {
    pub improver: Model,
    pub reviewer: Model,
}

impl RolePair {
    /// Create a pair, rejecting a model paired with itself
    pub fn new(improver: Model, reviewer: Model) -> Result<Self, DomainError> {
        if improver == reviewer {
            return Err(DomainError::IdenticalModels(improver.to_string()));
        }
        Ok(Self { improver, reviewer })
    }

    /// Rotate roles in place: the reviewer becomes the improver
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.improver, &mut self.reviewer);
    }

    /// Return the rotated pair, leaving `self` untouched
    pub fn swapped(&self) -> Self {
        Self {
            improver: self.reviewer.clone(),
            reviewer: self.improver.clone(),
        }
    }
}

/// Pick the two models that battle over a prompt of the given category.
///
/// Fixed lookup table: technical prompts pair a large general model with a
/// reasoning specialist, coding prompts pair a code model with one, and so on.
/// The first model of the pair improves first.
pub fn select_pair(category: PromptCategory) -> RolePair {
    let (improver, reviewer) = match category {
        PromptCategory::Technical => (Model::Llama33, Model::DeepSeekR1),
        PromptCategory::Coding => (Model::QwenCoder32b, Model::DeepSeekR1),
        PromptCategory::Creative => (Model::ClaudeHaiku35, Model::Gpt4oMini),
        PromptCategory::Business => (Model::Gpt4oMini, Model::MistralLarge),
        PromptCategory::Educational => (Model::Gemini20Flash, Model::QwQ32b),
        PromptCategory::General => (Model::Llama33, Model::Gemini20Flash),
    };
    RolePair { improver, reviewer }
}
