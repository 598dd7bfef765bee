//! Progress notification port
//!
//! Defines the interface for reporting progress during a battle.

use arena_domain::{BattlePhase, Model};
use tokio::sync::mpsc;

/// One progress update
#[derive(Debug, Clone, PartialEq)]
pub struct ProgressUpdate {
    pub phase: BattlePhase,
    /// Round attempt the update belongs to (0 before the first round)
    pub round: usize,
    /// Monotonically non-decreasing, 0 to 100
    pub percent: u8,
    pub status: String,
}

/// Callback for progress updates during a battle
///
/// Implementations live in the presentation layer. Calls happen inline on
/// the battle task, so implementations must return promptly and never wait
/// on I/O.
pub trait BattleProgressNotifier: Send + Sync {
    /// Called at every phase transition
    fn on_progress(&self, update: &ProgressUpdate);

    /// Called when a round attempt fails and the roles are swapped
    fn on_round_failed(&self, _round: usize, _improver: &Model, _error: &str) {}
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl BattleProgressNotifier for NoProgress {
    fn on_progress(&self, _update: &ProgressUpdate) {}
}

/// Forwards updates over an unbounded channel, for consumers on another task
pub struct ChannelProgress {
    sender: mpsc::UnboundedSender<ProgressUpdate>,
}

impl ChannelProgress {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<ProgressUpdate>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl BattleProgressNotifier for ChannelProgress {
    fn on_progress(&self, update: &ProgressUpdate) {
        // A closed receiver just means nobody is watching anymore
        let _ = self.sender.send(update.clone());
    }
}

/// Turns phase transitions into a monotonic percentage.
///
/// Each round attempt gets an equal slice of 5..95; select-pair sits at 0
/// and finalize at 100.
pub(crate) struct ProgressTracker<'a> {
    notifier: &'a dyn BattleProgressNotifier,
    max_rounds: usize,
    last_percent: u8,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(notifier: &'a dyn BattleProgressNotifier, max_rounds: usize) -> Self {
        Self {
            notifier,
            max_rounds: max_rounds.max(1),
            last_percent: 0,
        }
    }

    pub(crate) fn report(&mut self, phase: BattlePhase, round: usize, status: impl Into<String>) {
        let percent = self.percent_for(phase, round).max(self.last_percent);
        self.last_percent = percent;
        self.notifier.on_progress(&ProgressUpdate {
            phase,
            round,
            percent,
            status: status.into(),
        });
    }

    pub(crate) fn notifier(&self) -> &dyn BattleProgressNotifier {
        self.notifier
    }

    fn percent_for(&self, phase: BattlePhase, round: usize) -> u8 {
        match phase {
            BattlePhase::SelectPair => 0,
            BattlePhase::Finalize => 100,
            _ => {
                let step = phase.step_in_round().unwrap_or(0) as usize;
                let done = round.saturating_sub(1).min(self.max_rounds) * 3 + step;
                (5 + done * 90 / (self.max_rounds * 3)).min(95) as u8
            }
        }
    }
}
