/// The seam between gameplay and whatever makes noise.
///
/// Gameplay only ever sees `SampleId`s (loaded once by the backend) and the
/// backend's own playback handle type. Playback is fire-and-forget; the
/// only thing gameplay asks of a handle afterwards is whether it stopped.

use glam::Vec3;

/// Index of a clip the backend has already loaded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct SampleId(pub usize);

/// Every clip a session needs, resolved before the session starts.
#[derive(Clone, Copy, Debug)]
pub struct SampleBank {
    pub alibis: [SampleId; 4],
    pub recordings: [SampleId; 5],
    pub ambience: SampleId,
}

pub trait AudioBackend {
    type Playback;

    /// Start a one-shot clip heard from `emitter`. `None` if the backend
    /// could not start it.
    fn play(&mut self, sample: SampleId, emitter: Vec3) -> Option<Self::Playback>;

    /// Start a clip that loops until the handle is dropped.
    fn play_looped(&mut self, sample: SampleId, volume: f32, pitch: f32) -> Option<Self::Playback>;

    fn is_stopped(&self, playback: &Self::Playback) -> bool;

    /// Move the ears: `right` points from the left ear to the right one.
    fn set_listener(&mut self, position: Vec3, right: Vec3);
}
