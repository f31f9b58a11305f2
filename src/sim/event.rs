/// Events emitted while a session runs.
/// The host consumes these for logging and the message bar.

use crate::domain::collision::CueGroup;
use crate::domain::outcome::Outcome;

#[allow(dead_code)]
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GameEvent {
    CueStarted { group: CueGroup, index: usize },
    /// The evidence item that recorded the crime just started playing.
    CrimeRecordingHeard,
    Arrested { suspect: usize, outcome: Outcome },
    /// Arrest pressed with nobody close enough.
    ArrestMissed,
}
