/// Sound engine: procedural sound effects via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time and
/// played fire-and-forget. The engine reacts to `GameEvent`s only, so
/// it never needs to look at controller state.
///
/// Compile without the "sound" feature to disable audio entirely
/// (the stub SoundEngine does nothing).

use blockroll::sim::event::GameEvent;

#[cfg(feature = "sound")]
mod inner {
    use std::f32::consts::TAU;
    use std::io::Cursor;
    use std::sync::Arc;

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    pub(super) const SAMPLE_RATE: u32 = 22050;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_roll: Arc<Vec<u8>>,
        sfx_switch_on: Arc<Vec<u8>>,
        sfx_switch_off: Arc<Vec<u8>>,
        sfx_explode: Arc<Vec<u8>>,
        sfx_clear: Arc<Vec<u8>>,
        sfx_load: Arc<Vec<u8>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(pair) => pair,
                Err(e) => {
                    log::warn!("audio output unavailable: {e}");
                    return None;
                }
            };

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_roll: Arc::new(make_wav(&gen_roll())),
                sfx_switch_on: Arc::new(make_wav(&gen_switch(880.0, 1320.0))),
                sfx_switch_off: Arc::new(make_wav(&gen_switch(1320.0, 660.0))),
                sfx_explode: Arc::new(make_wav(&gen_explode())),
                sfx_clear: Arc::new(make_wav(&gen_clear())),
                sfx_load: Arc::new(make_wav(&gen_load())),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        pub fn play_roll(&self) { self.play(&self.sfx_roll); }
        pub fn play_switch(&self, now_on: bool) {
            if now_on {
                self.play(&self.sfx_switch_on);
            } else {
                self.play(&self.sfx_switch_off);
            }
        }
        pub fn play_explode(&self) { self.play(&self.sfx_explode); }
        pub fn play_clear(&self) { self.play(&self.sfx_clear); }
        pub fn play_load(&self) { self.play(&self.sfx_load); }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators (mono f32 samples)
    // ════════════════════════════════════════════════════════════

    fn seconds(dur: f32) -> usize {
        (SAMPLE_RATE as f32 * dur) as usize
    }

    /// Roll: low thump with a short wooden knock on top
    pub(super) fn gen_roll() -> Vec<f32> {
        let n = seconds(0.09);
        let mut rng: u32 = 0x5eed;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                let freq = 140.0 - t * 60.0;
                let body = (ti * freq * TAU).sin();
                rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                let knock = if t < 0.15 { noise * (1.0 - t / 0.15) } else { 0.0 };
                (body * 0.7 + knock * 0.3) * (1.0 - t).powi(2) * 0.4
            })
            .collect()
    }

    /// Switch: two-step click, rising when a trigger turns on
    fn gen_switch(from: f32, to: f32) -> Vec<f32> {
        let mut samples = Vec::new();
        for &freq in &[from, to] {
            let n = seconds(0.04);
            for i in 0..n {
                let ti = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                // square wave for a mechanical edge
                let wave = if (ti * freq * TAU).sin() >= 0.0 { 1.0 } else { -1.0 };
                samples.push(wave * env * 0.15);
            }
        }
        samples
    }

    /// Explosion: long noise burst under a falling tone
    fn gen_explode() -> Vec<f32> {
        let n = seconds(0.6);
        let mut rng: u32 = 0x9e37_79b9;
        let mut lp = 0.0_f32;
        (0..n)
            .map(|i| {
                let t = i as f32 / n as f32;
                let ti = i as f32 / SAMPLE_RATE as f32;
                rng = rng.wrapping_mul(1664525).wrapping_add(1013904223);
                let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
                // one-pole low-pass that closes over time
                let k = 0.6 - t * 0.5;
                lp += (noise - lp) * k;
                let tone = (ti * (220.0 - t * 170.0) * TAU).sin();
                (lp * 0.75 + tone * 0.25) * (1.0 - t).powf(1.5) * 0.45
            })
            .collect()
    }

    /// Level clear: rising arpeggio ending on a held octave
    fn gen_clear() -> Vec<f32> {
        let notes = [392.0_f32, 523.0, 659.0, 784.0]; // G4→C5→E5→G5
        let mut samples = Vec::new();
        for (k, &freq) in notes.iter().enumerate() {
            let n = seconds(if k + 1 == notes.len() { 0.3 } else { 0.08 });
            for i in 0..n {
                let ti = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                let wave = (ti * freq * TAU).sin() * 0.7
                    + (ti * freq * 2.0 * TAU).sin() * 0.3;
                samples.push(wave * env * 0.3);
            }
        }
        samples
    }

    /// Level load: single soft chime
    fn gen_load() -> Vec<f32> {
        let n = seconds(0.12);
        (0..n)
            .map(|i| {
                let ti = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - i as f32 / n as f32;
                (ti * 1047.0 * TAU).sin() * env * env * 0.2
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder (16-bit PCM mono)
    // ════════════════════════════════════════════════════════════

    pub(super) fn make_wav(samples: &[f32]) -> Vec<u8> {
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
        buf.extend_from_slice(&16u32.to_le_bytes());
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM
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
}

// ════════════════════════════════════════════════════════════
//  Public API (no-ops when the sound feature is off)
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> { Some(SoundEngine) }
    pub fn play_roll(&self) {}
    pub fn play_switch(&self, _now_on: bool) {}
    pub fn play_explode(&self) {}
    pub fn play_clear(&self) {}
    pub fn play_load(&self) {}
}

impl SoundEngine {
    pub fn on_event(&self, event: &GameEvent) {
        match *event {
            GameEvent::LevelLoaded { .. } => self.play_load(),
            GameEvent::Rolled { .. } => self.play_roll(),
            GameEvent::TriggerToggled { now, .. } => self.play_switch(now),
            GameEvent::Exploded { .. } => self.play_explode(),
            GameEvent::LevelCleared { .. } => self.play_clear(),
        }
    }
}

#[cfg(all(test, feature = "sound"))]
mod tests {
    use super::inner::*;

    #[test]
    fn wav_header_matches_payload() {
        let samples = gen_roll();
        let wav = make_wav(&samples);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + samples.len() * 2);
        let data_size = u32::from_le_bytes([wav[40], wav[41], wav[42], wav[43]]);
        assert_eq!(data_size as usize, samples.len() * 2);
    }

    #[test]
    fn samples_stay_in_range() {
        assert!(gen_roll().iter().all(|s| s.abs() <= 1.0));
    }
}
