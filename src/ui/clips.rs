/// Procedural clips: every sound the game plays, generated at startup.
///
/// ```text
///   SampleId   clip
///   0..4       alibi, one murmured phrase per suspect (pitch rises with index)
///   4..9       evidence recording, crackly tape with a tone per item
///   9          dusty-floor ambience, loops seamlessly
/// ```
///
/// Generators produce mono f32 samples at SAMPLE_RATE. `make_wav` wraps
/// them for rodio's decoder.

use std::f32::consts::PI;
use std::time::Duration;

use crate::sim::audio::{SampleBank, SampleId};

pub const SAMPLE_RATE: u32 = 22050;

pub struct ClipLibrary {
    clips: Vec<Vec<f32>>,
}

impl ClipLibrary {
    /// Generate every clip and the bank that names them.
    pub fn generate() -> (ClipLibrary, SampleBank) {
        let mut clips = Vec::with_capacity(10);
        let mut next = |samples: Vec<f32>| {
            clips.push(samples);
            SampleId(clips.len() - 1)
        };
        let alibis = [0, 1, 2, 3].map(|i| next(gen_alibi(i)));
        let recordings = [0, 1, 2, 3, 4].map(|i| next(gen_recording(i)));
        let ambience = next(gen_ambience());
        (ClipLibrary { clips }, SampleBank { alibis, recordings, ambience })
    }

    pub fn samples(&self, id: SampleId) -> Option<&[f32]> {
        self.clips.get(id.0).map(Vec::as_slice)
    }

    #[allow(dead_code)]
    pub fn duration(&self, id: SampleId) -> Option<Duration> {
        self.samples(id).map(duration_of)
    }

    #[allow(dead_code)]
    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f32]> {
        self.clips.iter().map(Vec::as_slice)
    }
}

pub fn duration_of(samples: &[f32]) -> Duration {
    Duration::from_secs_f64(samples.len() as f64 / SAMPLE_RATE as f64)
}

// ════════════════════════════════════════════════════════════
//  Waveform generators (mono f32 samples)
// ════════════════════════════════════════════════════════════

/// Small LCG, good enough for noise.
struct Noise(u32);

impl Noise {
    fn sample(&mut self) -> f32 {
        self.0 = self.0.wrapping_mul(1103515245).wrapping_add(12345);
        (self.0 as f32 / u32::MAX as f32) * 2.0 - 1.0
    }
}

/// Voice-like murmur: a buzzy glottal tone through two wobbling formants,
/// chopped into syllables. Suspect 0 speaks lowest.
fn gen_alibi(suspect: usize) -> Vec<f32> {
    let base = 110.0 + suspect as f32 * 35.0;
    let syllables = 6 + suspect % 3;
    let syllable_dur = 0.22;
    let gap_dur = 0.06;

    let mut samples = Vec::new();
    for s in 0..syllables {
        // Intonation: rise, then fall on the last syllables.
        let contour = 1.0 + 0.15 * ((s as f32 / syllables as f32) * PI).sin();
        let pitch = base * contour;
        let n = (SAMPLE_RATE as f32 * syllable_dur) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = (i as f32 / n as f32 * PI).sin().powf(0.6);
            let glottal = (t * pitch * 2.0 * PI).sin().signum() * 0.3 + (t * pitch * 2.0 * PI).sin() * 0.7;
            let f1 = 500.0 + 200.0 * ((s as f32) * 1.7).sin();
            let f2 = 1500.0 + 400.0 * ((s as f32) * 2.3).cos();
            let formants = (t * f1 * 2.0 * PI).sin() * 0.5 + (t * f2 * 2.0 * PI).sin() * 0.2;
            samples.push(glottal * (0.6 + 0.4 * formants) * env * 0.25);
        }
        samples.extend(std::iter::repeat(0.0).take((SAMPLE_RATE as f32 * gap_dur) as usize));
    }
    samples
}

/// Old tape: hiss and pops under a steady tone, with a click at each end.
fn gen_recording(item: usize) -> Vec<f32> {
    let duration = 1.4 + item as f32 * 0.15;
    let freq = 330.0 * 2f32.powf(item as f32 / 5.0);
    let n = (SAMPLE_RATE as f32 * duration) as usize;
    let mut noise = Noise(9001 + item as u32);
    let click = (SAMPLE_RATE as f32 * 0.01) as usize;

    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let hiss = noise.sample() * 0.08;
            let pop = if noise.sample() > 0.995 { noise.sample() * 0.35 } else { 0.0 };
            let wow = 1.0 + 0.01 * (t * 0.7 * 2.0 * PI).sin();
            let tone = (t * freq * wow * 2.0 * PI).sin() * 0.2;
            let edge = if i < click || i + click >= n { noise.sample() * 0.3 } else { 0.0 };
            hiss + pop + tone + edge
        })
        .collect()
}

/// Dusty floor: low filtered rumble. Starts and ends on silence so the loop
/// point is inaudible.
fn gen_ambience() -> Vec<f32> {
    let duration = 4.0;
    let n = (SAMPLE_RATE as f32 * duration) as usize;
    let mut noise = Noise(4242);
    let mut low = 0.0f32;
    (0..n)
        .map(|i| {
            // One-pole low-pass over white noise.
            low += (noise.sample() - low) * 0.02;
            let fade = (i as f32 / n as f32 * PI).sin();
            low * fade * 0.6
        })
        .collect()
}

// ════════════════════════════════════════════════════════════
//  WAV encoder
// ════════════════════════════════════════════════════════════

pub fn make_wav(samples: &[f32]) -> Vec<u8> {
    let num_channels: u16 = 1;
    let bits_per_sample: u16 = 16;
    let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
    let block_align = num_channels * bits_per_sample / 8;
    let data_size = samples.len() as u32 * 2;
    let file_size = 36 + data_size;

    let mut buf = Vec::with_capacity(44 + data_size as usize);

    buf.extend_from_slice(b"RIFF");
    buf.extend_from_slice(&file_size.to_le_bytes());
    buf.extend_from_slice(b"WAVE");

    buf.extend_from_slice(b"fmt ");
    buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
    buf.extend_from_slice(&1u16.to_le_bytes());  // PCM format
    buf.extend_from_slice(&num_channels.to_le_bytes());
    buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
    buf.extend_from_slice(&byte_rate.to_le_bytes());
    buf.extend_from_slice(&block_align.to_le_bytes());
    buf.extend_from_slice(&bits_per_sample.to_le_bytes());

    buf.extend_from_slice(b"data");
    buf.extend_from_slice(&data_size.to_le_bytes());

    for &s in samples {
        let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&val.to_le_bytes());
    }

    buf
}
