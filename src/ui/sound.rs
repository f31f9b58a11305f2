/// Audio backends.
///
/// `SoundEngine` plays the generated clips through rodio: cues are
/// positioned in space around the listener, the ambience loops on a plain
/// sink. `SilentAudio` plays nothing but keeps the same timing, so cue
/// slots fill and empty exactly as they would with sound.
///
/// Compile without the "sound" feature to drop rodio entirely (the stub
/// SoundEngine never opens, and the game runs on SilentAudio).

use std::time::{Duration, Instant};

use glam::Vec3;

use crate::sim::audio::{AudioBackend, SampleId};
use super::clips::ClipLibrary;

#[cfg(feature = "sound")]
mod inner {
    use std::io::Cursor;
    use std::rc::{Rc, Weak};
    use std::sync::Arc;

    use glam::Vec3;
    use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, SpatialSink};
    use tracing::warn;

    use crate::sim::audio::{AudioBackend, SampleId};
    use crate::ui::clips::{make_wav, ClipLibrary};

    /// Half the distance between the ears, in world units.
    const EAR_OFFSET: f32 = 1.0;
    /// rodio attenuates by 1/distance², which is far too steep at room scale.
    const WORLD_TO_AUDIO: f32 = 0.1;

    /// A clip's WAV bytes, shared between the engine and every decoder
    /// reading them.
    #[derive(Clone)]
    struct WavBytes(Arc<Vec<u8>>);

    impl AsRef<[u8]> for WavBytes {
        fn as_ref(&self) -> &[u8] {
            &self.0
        }
    }

    pub enum SoundPlayback {
        Cue(Rc<SpatialSink>),
        Loop(Sink),
    }

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        wavs: Vec<WavBytes>,
        left_ear: [f32; 3],
        right_ear: [f32; 3],
        /// Cues that may still be playing; ears follow the listener.
        live: Vec<Weak<SpatialSink>>,
    }

    fn audio_space(v: Vec3) -> [f32; 3] {
        (v * WORLD_TO_AUDIO).to_array()
    }

    impl SoundEngine {
        pub fn new(clips: &ClipLibrary) -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;
            let wavs = clips.iter().map(|c| WavBytes(Arc::new(make_wav(c)))).collect();
            Some(SoundEngine {
                _stream: stream,
                handle,
                wavs,
                left_ear: audio_space(-Vec3::X * EAR_OFFSET),
                right_ear: audio_space(Vec3::X * EAR_OFFSET),
                live: Vec::new(),
            })
        }

        fn reader(&self, sample: SampleId) -> Option<Cursor<WavBytes>> {
            self.wavs.get(sample.0).cloned().map(Cursor::new)
        }

        fn decoder(&self, sample: SampleId) -> Option<Decoder<Cursor<WavBytes>>> {
            match Decoder::new(self.reader(sample)?) {
                Ok(src) => Some(src),
                Err(e) => {
                    warn!(?sample, "clip failed to decode: {e}");
                    None
                }
            }
        }
    }

    impl AudioBackend for SoundEngine {
        type Playback = SoundPlayback;

        fn play(&mut self, sample: SampleId, emitter: Vec3) -> Option<SoundPlayback> {
            let src = self.decoder(sample)?;
            let sink = SpatialSink::try_new(&self.handle, audio_space(emitter), self.left_ear, self.right_ear)
                .map_err(|e| warn!("no spatial sink: {e}"))
                .ok()?;
            sink.append(src);
            let sink = Rc::new(sink);
            self.live.retain(|w| w.strong_count() > 0);
            self.live.push(Rc::downgrade(&sink));
            Some(SoundPlayback::Cue(sink))
        }

        fn play_looped(&mut self, sample: SampleId, volume: f32, pitch: f32) -> Option<SoundPlayback> {
            let src = Decoder::new_looped(self.reader(sample)?)
                .map_err(|e| warn!(?sample, "loop failed to decode: {e}"))
                .ok()?;
            let sink = Sink::try_new(&self.handle)
                .map_err(|e| warn!("no sink: {e}"))
                .ok()?;
            sink.set_volume(volume);
            sink.set_speed(pitch);
            sink.append(src);
            Some(SoundPlayback::Loop(sink))
        }

        fn is_stopped(&self, playback: &SoundPlayback) -> bool {
            match playback {
                SoundPlayback::Cue(sink) => sink.empty(),
                SoundPlayback::Loop(sink) => sink.empty(),
            }
        }

        fn set_listener(&mut self, position: Vec3, right: Vec3) {
            let right = right.normalize_or_zero() * EAR_OFFSET;
            self.left_ear = audio_space(position - right);
            self.right_ear = audio_space(position + right);
            self.live.retain(|w| match w.upgrade() {
                Some(sink) => {
                    sink.set_left_ear_position(self.left_ear);
                    sink.set_right_ear_position(self.right_ear);
                    true
                }
                None => false,
            });
        }
    }

}

// ════════════════════════════════════════════════════════════
//  Public API
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::{SoundEngine, SoundPlayback};

/// Stand-in when rodio is compiled out: never opens.
#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new(_clips: &ClipLibrary) -> Option<Self> { None }
}

#[cfg(not(feature = "sound"))]
impl AudioBackend for SoundEngine {
    type Playback = ();
    fn play(&mut self, _: SampleId, _: Vec3) -> Option<()> { None }
    fn play_looped(&mut self, _: SampleId, _: f32, _: f32) -> Option<()> { None }
    fn is_stopped(&self, _: &()) -> bool { true }
    fn set_listener(&mut self, _: Vec3, _: Vec3) {}
}

// ── Silent backend ──

/// A playback that ends when its clip would have.
#[derive(Clone, Copy, Debug)]
pub struct SilentPlayback {
    /// `None` for loops.
    ends: Option<Instant>,
}

pub struct SilentAudio {
    durations: Vec<Duration>,
}

impl SilentAudio {
    pub fn new(clips: &ClipLibrary) -> Self {
        SilentAudio { durations: clips.iter().map(super::clips::duration_of).collect() }
    }

    fn stopped_at(&self, playback: &SilentPlayback, now: Instant) -> bool {
        playback.ends.map_or(false, |end| now >= end)
    }
}

impl AudioBackend for SilentAudio {
    type Playback = SilentPlayback;

    fn play(&mut self, sample: SampleId, _emitter: Vec3) -> Option<SilentPlayback> {
        let length = *self.durations.get(sample.0)?;
        Some(SilentPlayback { ends: Some(Instant::now() + length) })
    }

    fn play_looped(&mut self, sample: SampleId, _volume: f32, _pitch: f32) -> Option<SilentPlayback> {
        self.durations.get(sample.0)?;
        Some(SilentPlayback { ends: None })
    }

    fn is_stopped(&self, playback: &SilentPlayback) -> bool {
        self.stopped_at(playback, Instant::now())
    }

    fn set_listener(&mut self, _position: Vec3, _right: Vec3) {}
}
