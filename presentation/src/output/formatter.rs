//! Output formatter trait

use arena_application::HealthReport;
use arena_domain::BattleResult;

/// Trait for formatting battle results
pub trait OutputFormatter {
    /// Round-by-round report
    fn format(&self, result: &BattleResult) -> String;

    /// Format as JSON
    fn format_json(&self, result: &BattleResult) -> String;

    /// Final prompt only
    fn format_prompt_only(&self, result: &BattleResult) -> String;

    /// Table of health check results
    fn format_health(&self, reports: &[HealthReport]) -> String;
}
