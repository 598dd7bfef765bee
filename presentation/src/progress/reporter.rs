//! Progress reporting for battle execution

use arena_application::{BattleProgressNotifier, ProgressUpdate};
use arena_domain::{BattlePhase, Model};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

/// Reports battle progress with a single percentage bar
pub struct ProgressReporter {
    bar: ProgressBar,
}

impl ProgressReporter {
    pub fn new() -> Self {
        Self::with_bar(ProgressBar::with_draw_target(
            Some(100),
            ProgressDrawTarget::stderr(),
        ))
    }

    /// Reporter that tracks state without drawing anything
    pub fn hidden() -> Self {
        Self::with_bar(ProgressBar::hidden())
    }

    fn with_bar(bar: ProgressBar) -> Self {
        bar.set_length(100);
        bar.set_style(Self::style());
        bar.set_prefix("Battle");
        bar.enable_steady_tick(std::time::Duration::from_millis(120));
        Self { bar }
    }

    fn style() -> ProgressStyle {
        ProgressStyle::default_bar()
            .template("{spinner:.green} {prefix:.bold.cyan} [{bar:40.cyan/blue}] {pos:>3}% {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-")
    }

    fn phase_display_name(phase: BattlePhase) -> &'static str {
        match phase {
            BattlePhase::SelectPair => "Selecting models",
            BattlePhase::Improve => "Improving",
            BattlePhase::Review => "Reviewing",
            BattlePhase::Evaluate => "Evaluating",
            BattlePhase::Finalize => "Finalizing",
        }
    }

    fn message(update: &ProgressUpdate) -> String {
        let name = Self::phase_display_name(update.phase);
        if update.round == 0 {
            format!("{} {}: {}", update.phase.emoji(), name, update.status)
        } else {
            format!(
                "{} Round {} {}: {}",
                update.phase.emoji(),
                update.round,
                name,
                update.status
            )
        }
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

impl BattleProgressNotifier for ProgressReporter {
    fn on_progress(&self, update: &ProgressUpdate) {
        self.bar.set_position(u64::from(update.percent));
        self.bar.set_message(Self::message(update));
        if update.phase == BattlePhase::Finalize {
            self.bar
                .finish_with_message(format!("{}", "Battle complete!".green()));
        }
    }

    fn on_round_failed(&self, round: usize, improver: &Model, error: &str) {
        self.bar.println(format!(
            "  {} round {} failed for {}: {}",
            "x".red(),
            round,
            improver,
            error
        ));
    }
}

/// Simple line-based progress (no fancy UI)
pub struct SimpleProgress;

impl BattleProgressNotifier for SimpleProgress {
    fn on_progress(&self, update: &ProgressUpdate) {
        eprintln!(
            "{} [{:>3}%] {}",
            "->".cyan(),
            update.percent,
            ProgressReporter::message(update)
        );
    }

    fn on_round_failed(&self, round: usize, improver: &Model, error: &str) {
        eprintln!("  {} round {} failed for {}: {}", "x".red(), round, improver, error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update(phase: BattlePhase, round: usize, percent: u8) -> ProgressUpdate {
        ProgressUpdate {
            phase,
            round,
            percent,
            status: "working".to_string(),
        }
    }

    #[test]
    fn test_position_follows_percent() {
        let reporter = ProgressReporter::hidden();
        reporter.on_progress(&update(BattlePhase::SelectPair, 0, 0));
        assert_eq!(reporter.position(), 0);
        reporter.on_progress(&update(BattlePhase::Review, 1, 35));
        assert_eq!(reporter.position(), 35);
        reporter.on_progress(&update(BattlePhase::Finalize, 3, 100));
        assert_eq!(reporter.position(), 100);
    }

    #[test]
    fn test_message_mentions_round() {
        let message = ProgressReporter::message(&update(BattlePhase::Improve, 2, 40));
        assert!(message.contains("Round 2 Improving: working"));

        let message = ProgressReporter::message(&update(BattlePhase::SelectPair, 0, 0));
        assert!(message.contains("Selecting models"));
        assert!(!message.contains("Round"));
    }
}
