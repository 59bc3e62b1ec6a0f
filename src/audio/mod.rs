//! Best-effort audio playback
//!
//! One `Playback` instance is constructed by the application root and
//! passed by reference to whoever needs sound. All music and effects
//! are generated procedurally so the game ships no audio assets. If no
//! output device is available the service stays silent for the whole
//! process; callers never see an error.

use std::cell::Cell;
use std::time::Duration;

use rodio::{OutputStream, OutputStreamHandle, Sink};
use tracing::warn;

use crate::store::AudioSettings;

/// UI effect chimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Click,
    Wrong,
    Success,
}

/// The one logical audio channel of the process: a pausable background
/// music loop plus fire-and-forget effect chimes.
pub struct Playback {
    backend: Option<Backend>,
    effects_volume: Cell<f32>,
}

struct Backend {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    music: Option<Sink>,
    music_running: Cell<bool>,
}

impl Playback {
    /// Open the default output device. If that fails the returned
    /// service is permanently silent.
    pub fn new(settings: AudioSettings) -> Self {
        let backend = match OutputStream::try_default() {
            Ok((stream, handle)) => {
                let music = Sink::try_new(&handle).ok().map(|sink| {
                    sink.set_volume(settings.background as f32 / 100.0);
                    sink.append(MusicLoop::new());
                    sink.pause();
                    sink
                });
                Some(Backend {
                    _stream: stream,
                    handle,
                    music,
                    music_running: Cell::new(false),
                })
            }
            Err(err) => {
                warn!(%err, "audio disabled: no output device");
                None
            }
        };
        Self {
            backend,
            effects_volume: Cell::new(settings.effects as f32 / 100.0),
        }
    }

    /// A service with no device at all, for `--mute` and for tests.
    pub fn disabled() -> Self {
        Self {
            backend: None,
            effects_volume: Cell::new(0.0),
        }
    }

    /// Play one effect chime, fire-and-forget.
    pub fn play(&self, effect: Effect) {
        let Some(backend) = &self.backend else {
            return;
        };
        let Ok(sink) = Sink::try_new(&backend.handle) else {
            return;
        };
        sink.set_volume(self.effects_volume.get());
        sink.append(Chime::new(effect));
        sink.detach();
    }

    /// Start the background loop. Idempotent while already running.
    pub fn play_background(&self) {
        let Some(backend) = &self.backend else {
            return;
        };
        if backend.music_running.get() {
            return;
        }
        if let Some(music) = &backend.music {
            music.play();
            backend.music_running.set(true);
        }
    }

    /// Pause the background loop.
    pub fn stop_background(&self) {
        let Some(backend) = &self.backend else {
            return;
        };
        if let Some(music) = &backend.music {
            music.pause();
        }
        backend.music_running.set(false);
    }

    /// Re-apply volumes, in percent. Takes effect immediately for the
    /// background loop and on the next chime for effects.
    pub fn set_volumes(&self, background: u8, effects: u8) {
        self.effects_volume.set(effects as f32 / 100.0);
        if let Some(backend) = &self.backend {
            if let Some(music) = &backend.music {
                music.set_volume(background as f32 / 100.0);
            }
        }
    }
}

const SAMPLE_RATE: u32 = 48_000;

/// Infinite background loop: a slow minor arpeggio with a soft
/// envelope so note boundaries don't click.
struct MusicLoop {
    frame: u64,
}

impl MusicLoop {
    fn new() -> Self {
        Self { frame: 0 }
    }
}

impl Iterator for MusicLoop {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        const NOTES_HZ: [f32; 8] = [110.0, 130.81, 164.81, 146.83, 110.0, 123.47, 164.81, 196.0];
        let note_len: u64 = (SAMPLE_RATE as u64) / 2; // 0.5s per note

        let note_i = ((self.frame / note_len) % NOTES_HZ.len() as u64) as usize;
        let pos = self.frame % note_len;
        let sample = voiced_sample(NOTES_HZ[note_i], pos, note_len) * 0.18;

        self.frame = self.frame.wrapping_add(1);
        Some(sample)
    }
}

impl rodio::Source for MusicLoop {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}

/// Finite effect chime: a short note sequence per effect.
struct Chime {
    notes: &'static [f32],
    note_len: u64,
    frame: u64,
}

impl Chime {
    fn new(effect: Effect) -> Self {
        let (notes, note_ms): (&'static [f32], u64) = match effect {
            Effect::Click => (&[880.0], 45),
            Effect::Wrong => (&[196.0, 146.83], 120),
            Effect::Success => (&[523.25, 659.25, 783.99], 95),
        };
        Self {
            notes,
            note_len: SAMPLE_RATE as u64 * note_ms / 1000,
            frame: 0,
        }
    }

    fn total_frames(&self) -> u64 {
        self.note_len * self.notes.len() as u64
    }
}

impl Iterator for Chime {
    type Item = f32;

    fn next(&mut self) -> Option<f32> {
        if self.frame >= self.total_frames() {
            return None;
        }
        let note_i = (self.frame / self.note_len) as usize;
        let pos = self.frame % self.note_len;
        let sample = voiced_sample(self.notes[note_i], pos, self.note_len) * 0.35;
        self.frame += 1;
        Some(sample)
    }
}

impl rodio::Source for Chime {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        Some(Duration::from_micros(
            self.total_frames() * 1_000_000 / SAMPLE_RATE as u64,
        ))
    }
}

/// One sample of a note with a 10ms attack / 25ms release envelope and
/// a quiet second harmonic.
fn voiced_sample(freq_hz: f32, pos_in_note: u64, note_len: u64) -> f32 {
    let t = pos_in_note as f32 / SAMPLE_RATE as f32;
    let phase = 2.0 * std::f32::consts::PI * freq_hz * t;

    let attack: u64 = (SAMPLE_RATE as u64) / 100;
    let release: u64 = (SAMPLE_RATE as u64) / 40;
    let release_start = note_len.saturating_sub(release);

    let env = if pos_in_note < attack {
        pos_in_note as f32 / attack.max(1) as f32
    } else if pos_in_note >= release_start {
        let remaining = note_len.saturating_sub(pos_in_note);
        remaining as f32 / release.max(1) as f32
    } else {
        1.0
    };

    (phase.sin() + (phase * 2.0).sin() * 0.25) * env
}
