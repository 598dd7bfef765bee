//! CLI command definitions

use arena_domain::{Model, PromptCategory};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for battle results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Round-by-round report with the final prompt
    Full,
    /// Only the final prompt, suitable for piping
    Prompt,
    /// The complete battle result as JSON
    Json,
}

impl From<arena_domain::OutputFormat> for OutputFormat {
    fn from(format: arena_domain::OutputFormat) -> Self {
        match format {
            arena_domain::OutputFormat::Full => OutputFormat::Full,
            arena_domain::OutputFormat::Prompt => OutputFormat::Prompt,
            arena_domain::OutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// CLI arguments for prompt-arena
#[derive(Parser, Debug)]
#[command(name = "prompt-arena")]
#[command(author, version, about = "Prompt battles - two LLMs take turns refining a prompt")]
#[command(long_about = r#"
Prompt Arena hands your prompt to two models that take turns improving it.

Each round one model rewrites the prompt and the other scores the rewrite
from 1 to 10. Then the roles swap. The battle stops when a reviewer scores
9.5 or higher, when scores stop improving, or at the round limit. The best
version wins.

Configuration files are loaded from (in priority order):
1. ARENA_* environment variables (e.g. ARENA_BATTLE__MAX_ROUNDS=3)
2. --config <path>     Explicit config file
3. ./arena.toml        Project-level config
4. ~/.config/prompt-arena/config.toml   Global config

Example:
  prompt-arena "Write about AI"
  prompt-arena --category coding --max-rounds 3 "Write a function that parses dates"
  prompt-arena --improver gpt-4o-mini --reviewer gemini-2.0-flash -o prompt "Pitch my startup"
  prompt-arena --health
"#)]
pub struct Cli {
    /// The prompt to refine (not required with --health)
    pub prompt: Option<String>,

    /// Prompt category; detected from keywords when omitted
    #[arg(long, value_name = "CATEGORY")]
    pub category: Option<PromptCategory>,

    /// Maximum number of round attempts
    #[arg(long, value_name = "N")]
    pub max_rounds: Option<usize>,

    /// Model that improves first (requires --reviewer)
    #[arg(long, value_name = "MODEL", requires = "reviewer")]
    pub improver: Option<String>,

    /// Model that reviews first (requires --improver)
    #[arg(long, value_name = "MODEL", requires = "improver")]
    pub reviewer: Option<String>,

    /// Output format (defaults to the config file, then "full")
    #[arg(short, long, value_enum)]
    pub output: Option<OutputFormat>,

    /// Append battle events as JSON lines to this file
    #[arg(long, value_name = "PATH")]
    pub battle_log: Option<PathBuf>,

    /// Check model health instead of running a battle (default models when none given)
    #[arg(long, value_name = "MODEL", num_args = 0.., conflicts_with = "prompt")]
    pub health: Option<Vec<String>>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long)]
    pub no_color: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,
}

impl Cli {
    /// Explicit improver/reviewer pair, if both were given
    pub fn role_models(&self) -> Option<(Model, Model)> {
        match (&self.improver, &self.reviewer) {
            (Some(improver), Some(reviewer)) => {
                Some((Model::from(improver.as_str()), Model::from(reviewer.as_str())))
            }
            _ => None,
        }
    }

    /// Models to check for `--health`, falling back to the defaults
    pub fn health_models(&self) -> Option<Vec<Model>> {
        self.health.as_ref().map(|names| {
            if names.is_empty() {
                Model::default_models()
            } else {
                names.iter().map(|n| Model::from(n.as_str())).collect()
            }
        })
    }
}
