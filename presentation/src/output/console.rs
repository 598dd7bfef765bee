//! Console output formatter for battle results

use crate::output::formatter::OutputFormatter;
use arena_application::{HealthReport, HealthStatus};
use arena_domain::{BattleResult, Round};
use colored::{ColoredString, Colorize};

/// Formats battle results for console display
pub struct ConsoleFormatter;

impl ConsoleFormatter {
    /// Turn colored output on or off for the whole process
    pub fn set_color(enabled: bool) {
        if enabled {
            colored::control::unset_override();
        } else {
            colored::control::set_override(false);
        }
    }

    /// Format the complete battle result
    pub fn format(result: &BattleResult) -> String {
        let mut output = String::new();

        output.push_str(&Self::header("Prompt Battle Results"));
        output.push('\n');

        output.push_str(&format!(
            "{} {}\n",
            "Original:".cyan().bold(),
            result.original_prompt
        ));
        output.push_str(&format!(
            "{} {}   {} {} vs {}\n\n",
            "Category:".cyan().bold(),
            result.category,
            "Models:".cyan().bold(),
            result.model_a,
            result.model_b
        ));

        output.push_str(&Self::section_header("Rounds"));
        for round in &result.rounds {
            output.push_str(&Self::format_round(round));
        }

        output.push_str(&Self::section_header("Final Prompt"));
        output.push_str(&format!("\n{}\n", result.final_prompt));

        output.push_str(&Self::section_header("Summary"));
        output.push_str(&format!(
            "\n{} {} ({})\n",
            "Score:".bold(),
            Self::score(result.final_score),
            result.outcome
        ));
        output.push_str(&format!(
            "{} {}\n",
            "Winner:".bold(),
            result.winner_model.to_string().yellow().bold()
        ));
        if let Some(round) = result.winning_round() {
            output.push_str(&format!(
                "{} round {} ({} improving)\n",
                "Best:".bold(),
                round.index,
                round.improver_model
            ));
        }
        output.push_str(&format!(
            "{} {} rounds, {} improvements, {} tokens, cost {:.4}, {:.1}s\n",
            "Stats:".bold(),
            result.total_rounds,
            result.improvement_count,
            result.total_tokens,
            result.total_cost,
            result.duration().num_milliseconds() as f64 / 1000.0
        ));
        output.push_str(&format!("\n{}\n", result.narrative.dimmed()));

        output.push_str(&Self::footer());

        output
    }

    /// Format as JSON
    pub fn format_json(result: &BattleResult) -> String {
        serde_json::to_string_pretty(result).unwrap_or_else(|_| "{}".to_string())
    }

    /// Final prompt only (for piping)
    pub fn format_prompt_only(result: &BattleResult) -> String {
        format!("{}\n", result.final_prompt)
    }

    /// Format health check results, one model per line
    pub fn format_health(reports: &[HealthReport]) -> String {
        let mut output = Self::section_header("Model Health");
        output.push('\n');

        for report in reports {
            let status = match report.status {
                HealthStatus::Healthy => report.status.as_str().green().bold(),
                HealthStatus::Degraded => report.status.as_str().yellow().bold(),
                HealthStatus::Unavailable => report.status.as_str().red().bold(),
            };
            output.push_str(&format!(
                "{:<24} {:<12} {:>6} ms  breaker {}\n",
                report.model.to_string(),
                status,
                report.response_time_ms,
                report.breaker_state
            ));
            output.push_str(&format!("  {}\n", report.recommendation.dimmed()));
            if let Some(error) = &report.error {
                output.push_str(&format!("  {} {}\n", "error:".red(), error));
            }
        }

        output
    }

    pub fn format_health_json(reports: &[HealthReport]) -> String {
        serde_json::to_string_pretty(reports).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_round(round: &Round) -> String {
        let marker = if round.consensus {
            "*".green().bold()
        } else if round.is_improvement {
            "+".green()
        } else {
            "=".dimmed()
        };

        let mut output = format!(
            "\n{} {} {} improved, {} scored {}\n",
            marker,
            format!("Round {}:", round.index).yellow().bold(),
            round.improver_model,
            round.reviewer_model,
            Self::score(round.reviewer_score)
        );
        output.push_str(&Self::indent(&round.prompt_after, "    "));
        output.push('\n');
        if !round.reviewer_feedback.trim().is_empty() {
            output.push_str(&format!(
                "    {} {}\n",
                "Feedback:".dimmed(),
                round.reviewer_feedback
            ));
        }
        output
    }

    fn score(score: f64) -> ColoredString {
        let text = format!("{:.1}/10", score);
        if score >= 9.0 {
            text.green().bold()
        } else if score >= 7.0 {
            text.yellow()
        } else {
            text.red()
        }
    }

    fn header(title: &str) -> String {
        let line = "=".repeat(60);
        format!("{}\n{:^60}\n{}", line.cyan(), title.bold(), line.cyan())
    }

    fn section_header(title: &str) -> String {
        format!("\n{}\n{}\n", title.cyan().bold(), "-".repeat(40))
    }

    fn footer() -> String {
        format!("\n{}\n", "=".repeat(60).cyan())
    }

    /// Indent a multi-line string
    pub fn indent(text: &str, prefix: &str) -> String {
        text.lines()
            .map(|line| format!("{}{}", prefix, line))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format(&self, result: &BattleResult) -> String {
        Self::format(result)
    }

    fn format_json(&self, result: &BattleResult) -> String {
        Self::format_json(result)
    }

    fn format_prompt_only(&self, result: &BattleResult) -> String {
        Self::format_prompt_only(result)
    }

    fn format_health(&self, reports: &[HealthReport]) -> String {
        Self::format_health(reports)
    }
}
