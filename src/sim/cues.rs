/// Audio cue slots: one in-flight playback per suspect and per evidence item.
///
/// Slot lifecycle:
///   empty ──trigger──▶ playing ──backend reports stopped──▶ (retire) empty
///
/// A trigger on a playing slot does nothing, so standing next to a suspect
/// plays the alibi once, then again only after it has finished.

use glam::Vec3;
use tracing::{debug, warn};

use crate::domain::collision::CueGroup;
use super::audio::{AudioBackend, SampleBank, SampleId};

struct Track<P> {
    samples: Vec<SampleId>,
    slots: Vec<Option<P>>,
}

impl<P> Track<P> {
    fn new(samples: &[SampleId]) -> Self {
        Track {
            samples: samples.to_vec(),
            slots: samples.iter().map(|_| None).collect(),
        }
    }
}

pub struct CueManager<P> {
    alibis: Track<P>,
    recordings: Track<P>,
}

impl<P> CueManager<P> {
    pub fn new(bank: &SampleBank) -> Self {
        CueManager {
            alibis: Track::new(&bank.alibis),
            recordings: Track::new(&bank.recordings),
        }
    }

    fn track(&self, group: CueGroup) -> &Track<P> {
        match group {
            CueGroup::Alibi => &self.alibis,
            CueGroup::Recording => &self.recordings,
        }
    }

    fn track_mut(&mut self, group: CueGroup) -> &mut Track<P> {
        match group {
            CueGroup::Alibi => &mut self.alibis,
            CueGroup::Recording => &mut self.recordings,
        }
    }

    /// Start the cue for `(group, index)` unless it is already playing.
    /// Returns true if a new playback started. Unknown indices are ignored.
    pub fn trigger<B>(&mut self, audio: &mut B, group: CueGroup, index: usize, emitter: Vec3) -> bool
    where
        B: AudioBackend<Playback = P>,
    {
        let track = self.track_mut(group);
        let Some(&sample) = track.samples.get(index) else { return false };
        if track.slots[index].is_some() {
            return false;
        }
        match audio.play(sample, emitter) {
            Some(playback) => {
                track.slots[index] = Some(playback);
                debug!(?group, index, "cue started");
                true
            }
            None => {
                warn!(?group, index, "audio backend could not start cue");
                false
            }
        }
    }

    /// Empty every slot whose playback has finished. Returns how many.
    pub fn retire_finished<B>(&mut self, audio: &B) -> usize
    where
        B: AudioBackend<Playback = P>,
    {
        let mut retired = 0;
        for track in [&mut self.alibis, &mut self.recordings] {
            for slot in &mut track.slots {
                if slot.as_ref().map_or(false, |p| audio.is_stopped(p)) {
                    *slot = None;
                    retired += 1;
                }
            }
        }
        retired
    }

    pub fn is_active(&self, group: CueGroup, index: usize) -> bool {
        self.track(group).slots.get(index).map_or(false, Option::is_some)
    }

    #[allow(dead_code)]
    pub fn active_count(&self) -> usize {
        [&self.alibis, &self.recordings]
            .iter()
            .map(|t| t.slots.iter().filter(|s| s.is_some()).count())
            .sum()
    }
}
