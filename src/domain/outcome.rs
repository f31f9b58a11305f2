/// Session outcome: IN_PROGRESS → WIN | LOSE, decided by an arrest.
///
/// ```text
///                 arrest near culprit
///   InProgress ────────────────────────▶ Win
///        │
///        │        arrest near anyone else
///        └─────────────────────────────▶ Lose
/// ```
///
/// Win and Lose are terminal. An arrest with nobody in range changes nothing.

use glam::Vec3;
use serde::Deserialize;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Outcome {
    #[default]
    InProgress,
    Win,
    Lose,
}

/// When player movement stops responding.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FreezePolicy {
    /// Freeze on both Win and Lose.
    #[default]
    Terminal,
    /// Freeze only after a wrong arrest; the winner may keep walking.
    LoseOnly,
    /// Freeze only after the right arrest.
    WinOnly,
}

/// A completed arrest: who was taken in, and what it decided.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Arrest {
    pub suspect: usize,
    pub outcome: Outcome,
}

impl Outcome {
    pub fn is_terminal(self) -> bool {
        self != Outcome::InProgress
    }

    pub fn allows_movement(self, policy: FreezePolicy) -> bool {
        match (self, policy) {
            (Outcome::InProgress, _) => true,
            (_, FreezePolicy::Terminal) => false,
            (Outcome::Win, FreezePolicy::LoseOnly) => true,
            (Outcome::Lose, FreezePolicy::WinOnly) => true,
            _ => false,
        }
    }

    /// Arrest the first suspect (list order) within `radius` of `player`.
    ///
    /// Returns `None` when the session is already decided or nobody is in
    /// range; in both cases the outcome is left untouched.
    pub fn attempt_arrest(
        &mut self,
        player: Vec3,
        suspects: &[Vec3],
        radius: f32,
        culprit: usize,
    ) -> Option<Arrest> {
        if self.is_terminal() {
            return None;
        }
        let suspect = suspects.iter().position(|s| player.distance(*s) <= radius)?;
        *self = if suspect == culprit { Outcome::Win } else { Outcome::Lose };
        Some(Arrest { suspect, outcome: *self })
    }

    /// On-screen message for this state.
    pub fn status_line(self) -> &'static str {
        match self {
            Outcome::InProgress => "Arrows/WASD move; Space arrests whoever is close; Q quits",
            Outcome::Win => "You arrested the culprit!",
            Outcome::Lose => "You arrested the wrong person. :(",
        }
    }
}
