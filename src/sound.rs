use crate::agent::scanner::{Pitch, SOUND_CHARS};
use rodio::source::{SineWave, Source};
use std::time::Duration;

pub const BASE_FREQUENCY: f32 = 100.0;
pub const TONE_DURATION: Duration = Duration::from_millis(50);
const TONE_VOLUME: f32 = 0.3;

/// Frequency for a sound character: `100·2^(i/6)` Hz, halved for low pitch
/// and doubled for high pitch.
pub fn tone_frequency(c: char, pitch: Option<Pitch>) -> Option<f32> {
    let index = SOUND_CHARS.chars().position(|s| s == c)?;
    let base = BASE_FREQUENCY * 2f32.powf(index as f32 / 6.0);
    Some(match pitch {
        None => base,
        Some(Pitch::Low) => base * 0.5,
        Some(Pitch::High) => base * 2.0,
    })
}

pub trait SoundSink {
    fn play_tone(&mut self, frequency: f32, duration: Duration);
}

/// Discards every tone.
#[derive(Debug, Default)]
pub struct NullSink;

impl SoundSink for NullSink {
    fn play_tone(&mut self, _frequency: f32, _duration: Duration) {}
}

/// Remembers requested frequencies.
#[derive(Debug, Default)]
pub struct RecordingSink {
    pub tones: Vec<f32>,
}

impl SoundSink for RecordingSink {
    fn play_tone(&mut self, frequency: f32, _duration: Duration) {
        self.tones.push(frequency);
    }
}

/// Plays sine tones on the default output device.
pub struct RodioSink {
    _stream: rodio::OutputStream,
    handle: rodio::OutputStreamHandle,
}

impl RodioSink {
    pub fn try_default() -> Option<Self> {
        match rodio::OutputStream::try_default() {
            Ok((stream, handle)) => Some(Self {
                _stream: stream,
                handle,
            }),
            Err(e) => {
                tracing::warn!("audio output unavailable: {e}");
                None
            }
        }
    }
}

impl SoundSink for RodioSink {
    fn play_tone(&mut self, frequency: f32, duration: Duration) {
        let source = SineWave::new(frequency)
            .take_duration(duration)
            .amplify(TONE_VOLUME);
        match rodio::Sink::try_new(&self.handle) {
            Ok(sink) => {
                sink.append(source);
                sink.detach();
            }
            Err(e) => tracing::debug!("failed to open audio sink: {e}"),
        }
    }
}
