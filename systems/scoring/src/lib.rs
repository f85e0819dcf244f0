#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Score keeping driven by contest results.

use biscuit_battle_core::Event;

/// Notification emitted whenever the score changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScoreChanged {
    /// Score after the change.
    pub score: i64,
}

/// Running player score.
#[derive(Debug, Default)]
pub struct Scoreboard {
    score: i64,
}

impl Scoreboard {
    /// Creates a scoreboard starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current score.
    #[must_use]
    pub fn score(&self) -> i64 {
        self.score
    }

    /// Adds `delta` points and reports the new total.
    pub fn add(&mut self, delta: i64) -> ScoreChanged {
        self.score = self.score.saturating_add(delta);
        ScoreChanged { score: self.score }
    }

    /// Starts a new round at zero.
    pub fn reset(&mut self) -> ScoreChanged {
        self.score = 0;
        ScoreChanged { score: self.score }
    }

    /// Awards points for every win in `events`.
    pub fn handle(&mut self, events: &[Event], out: &mut Vec<ScoreChanged>) {
        for event in events {
            if let Event::PlayerWon { points, .. } = event {
                out.push(self.add(i64::from(*points)));
            }
        }
    }
}
