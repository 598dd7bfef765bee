//! Model value object representing an LLM model

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// LLM models reachable through the completion endpoint (Value Object)
///
/// The endpoint forwards the identifier verbatim, so any model it knows
/// about can be used through [`Model::Custom`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Model {
    // General-purpose models
    Llama33,
    Gpt4oMini,
    Gemini20Flash,
    MistralLarge,
    ClaudeHaiku35,
    // Reasoning specialists
    DeepSeekR1,
    QwQ32b,
    // Code specialists
    QwenCoder32b,
    // Custom
    Custom(String),
}

impl Model {
    /// Get the string identifier for this model
    pub fn as_str(&self) -> &str {
        match self {
            Model::Llama33 => "llama-3.3-70b",
            Model::Gpt4oMini => "gpt-4o-mini",
            Model::Gemini20Flash => "gemini-2.0-flash",
            Model::MistralLarge => "mistral-large",
            Model::ClaudeHaiku35 => "claude-3.5-haiku",
            Model::DeepSeekR1 => "deepseek-r1",
            Model::QwQ32b => "qwq-32b",
            Model::QwenCoder32b => "qwen-2.5-coder-32b",
            Model::Custom(s) => s,
        }
    }

    /// Models covered by a health check when none are named explicitly
    pub fn default_models() -> Vec<Model> {
        vec![
            Model::Llama33,
            Model::DeepSeekR1,
            Model::Gpt4oMini,
            Model::Gemini20Flash,
        ]
    }

    /// Check if this model is tuned for step-by-step reasoning
    pub fn is_reasoning(&self) -> bool {
        matches!(self, Model::DeepSeekR1 | Model::QwQ32b)
    }

    /// Check if this model is tuned for source code
    pub fn is_coder(&self) -> bool {
        matches!(self, Model::QwenCoder32b)
    }

    /// Short display name, e.g. "deepseek-r1" -> "deepseek"
    pub fn short_name(&self) -> &str {
        let id = self.as_str();
        id.split(['-', '_']).next().unwrap_or(id)
    }
}

impl Default for Model {
    /// Returns the default model (Llama 3.3 70B)
    fn default() -> Self {
        Model::Llama33
    }
}

impl std::fmt::Display for Model {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Model {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match s {
            "llama-3.3-70b" => Model::Llama33,
            "gpt-4o-mini" => Model::Gpt4oMini,
            "gemini-2.0-flash" => Model::Gemini20Flash,
            "mistral-large" => Model::MistralLarge,
            "claude-3.5-haiku" => Model::ClaudeHaiku35,
            "deepseek-r1" => Model::DeepSeekR1,
            "qwq-32b" => Model::QwQ32b,
            "qwen-2.5-coder-32b" => Model::QwenCoder32b,
            other => Model::Custom(other.to_string()),
        })
    }
}

impl From<&str> for Model {
    fn from(s: &str) -> Self {
        match s.parse() {
            Ok(model) => model,
            Err(never) => match never {},
        }
    }
}

impl Serialize for Model {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Model {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Model::from(s.as_str()))
    }
}
