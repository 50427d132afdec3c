use std::io::Cursor;
use std::sync::Arc;

use hound::{SampleFormat, WavSpec, WavWriter};
use tracing::debug;

use crate::application::ports::{AudioSink, ChimePlayer};
use crate::shared::error::AppError;

const SAMPLE_RATE: u32 = 44_100;
/// Two-tone cue: a higher "ding" then a lower "dong".
const SEGMENTS: [(f32, f32); 2] = [(800.0, 0.15), (600.0, 0.20)];
const PEAK_GAIN: f32 = 0.4;
const FLOOR_GAIN: f32 = 0.01;

/// Synthesize the notification cue as mono 16-bit WAV bytes. Each tone
/// decays exponentially from the peak gain to the floor over its duration.
pub fn render_chime_wav() -> Result<Vec<u8>, AppError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    let mut writer = WavWriter::new(&mut cursor, spec)
        .map_err(|err| AppError::Internal(format!("Failed to start WAV stream: {err}")))?;

    for (frequency, duration) in SEGMENTS {
        let samples = (duration * SAMPLE_RATE as f32) as u32;
        let decay = (FLOOR_GAIN / PEAK_GAIN).ln() / duration;
        for n in 0..samples {
            let t = n as f32 / SAMPLE_RATE as f32;
            let amplitude = PEAK_GAIN * (decay * t).exp();
            let sample = amplitude * (2.0 * std::f32::consts::PI * frequency * t).sin();
            writer
                .write_sample((sample * f32::from(i16::MAX)) as i16)
                .map_err(|err| AppError::Internal(format!("Failed to write WAV sample: {err}")))?;
        }
    }

    writer
        .finalize()
        .map_err(|err| AppError::Internal(format!("Failed to finalize WAV stream: {err}")))?;
    Ok(cursor.into_inner())
}

/// Chime player backed by the synthesized waveform. The cue is rendered once
/// at construction, so playback has no asset or network dependency; only an
/// unavailable audio sink can fail, and that failure is swallowed.
pub struct SynthChime {
    wav: Vec<u8>,
    sink: Arc<dyn AudioSink>,
}

impl SynthChime {
    pub fn new(sink: Arc<dyn AudioSink>) -> Result<Self, AppError> {
        Ok(Self {
            wav: render_chime_wav()?,
            sink,
        })
    }

    pub fn wav_bytes(&self) -> &[u8] {
        &self.wav
    }
}

impl ChimePlayer for SynthChime {
    fn play(&self) {
        if let Err(err) = self.sink.play_wav(&self.wav) {
            debug!("notification chime unavailable: {err}");
        }
    }
}
