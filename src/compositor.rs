use std::fmt;
use std::io::Cursor;
use std::path::Path;
use log::{warn, debug};
use crate::errors::AudioError;

// @module: Timeline composition over 16-bit PCM buffers

/// Sample format shared by the track and every clip overlaid onto it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackSpec {
    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Channel count (1 = mono, 2 = stereo)
    pub channels: u16,
}

impl TrackSpec {
    /// Create a new track spec
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        TrackSpec {
            sample_rate,
            channels,
        }
    }

    /// Convert a millisecond offset to a frame offset
    pub fn ms_to_frames(&self, ms: u64) -> usize {
        (ms * self.sample_rate as u64 / 1000) as usize
    }

    /// Convert a frame count back to milliseconds (rounded down)
    pub fn frames_to_ms(&self, frames: usize) -> u64 {
        frames as u64 * 1000 / self.sample_rate as u64
    }
}

impl Default for TrackSpec {
    fn default() -> Self {
        // The common synthesis output format: 24 kHz mono
        TrackSpec {
            sample_rate: 24_000,
            channels: 1,
        }
    }
}

/// One synthesized utterance, decoded to PCM
#[derive(Debug, Clone)]
pub struct SynthesizedClip {
    /// Interleaved 16-bit samples
    pub samples: Vec<i16>,

    /// Sample rate in Hz
    pub sample_rate: u32,

    /// Channel count
    pub channels: u16,
}

impl SynthesizedClip {
    /// Decode a WAV byte buffer into a clip.
    ///
    /// Integer sources of any supported bit depth and 32-bit float sources
    /// are converted to 16-bit.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, AudioError> {
        let reader = hound::WavReader::new(Cursor::new(bytes))
            .map_err(|e| AudioError::DecodeFailed(e.to_string()))?;
        let spec = reader.spec();

        let samples = match spec.sample_format {
            hound::SampleFormat::Int => {
                if spec.bits_per_sample == 16 {
                    reader
                        .into_samples::<i16>()
                        .collect::<Result<Vec<i16>, _>>()
                        .map_err(|e| AudioError::DecodeFailed(e.to_string()))?
                } else {
                    // Shift wider integer samples down to 16 bits
                    let shift = spec.bits_per_sample.saturating_sub(16) as u32;
                    reader
                        .into_samples::<i32>()
                        .map(|s| s.map(|v| (v >> shift) as i16))
                        .collect::<Result<Vec<i16>, _>>()
                        .map_err(|e| AudioError::DecodeFailed(e.to_string()))?
                }
            }
            hound::SampleFormat::Float => reader
                .into_samples::<f32>()
                .map(|s| {
                    s.map(|v| (v.clamp(-1.0, 1.0) * i16::MAX as f32).round() as i16)
                })
                .collect::<Result<Vec<i16>, _>>()
                .map_err(|e| AudioError::DecodeFailed(e.to_string()))?,
        };

        Ok(SynthesizedClip {
            samples,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        })
    }

    /// A silent clip of the given duration - used by tests and demos
    #[allow(dead_code)]
    pub fn silent(duration_ms: u64, spec: TrackSpec) -> Self {
        let frames = spec.ms_to_frames(duration_ms);
        SynthesizedClip {
            samples: vec![0i16; frames * spec.channels as usize],
            sample_rate: spec.sample_rate,
            channels: spec.channels,
        }
    }

    /// Number of frames in the clip
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels as usize
    }

    /// Clip duration in milliseconds (rounded down)
    pub fn duration_ms(&self) -> u64 {
        self.frames() as u64 * 1000 / self.sample_rate as u64
    }
}

/// The single growing output track.
///
/// The track starts silent with zero duration, is padded with silence up to
/// each cue's end time, and receives each clip as an additive overlay at its
/// cue's begin offset. It only ever grows; overlay never truncates content.
#[derive(Debug)]
pub struct Track {
    /// Interleaved 16-bit samples
    samples: Vec<i16>,

    /// Shared sample format
    spec: TrackSpec,
}

impl Track {
    /// Create an empty (zero-duration) track
    pub fn new(spec: TrackSpec) -> Self {
        Track {
            samples: Vec::new(),
            spec,
        }
    }

    /// The track's sample format
    pub fn spec(&self) -> TrackSpec {
        self.spec
    }

    /// Number of frames currently in the track
    pub fn frames(&self) -> usize {
        self.samples.len() / self.spec.channels as usize
    }

    /// Current duration in milliseconds (rounded down)
    pub fn duration_ms(&self) -> u64 {
        self.spec.frames_to_ms(self.frames())
    }

    /// Borrow the raw interleaved samples
    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    /// Append silence so the track duration becomes exactly `end_ms`.
    ///
    /// A track already at or past `end_ms` is left untouched.
    pub fn pad_to(&mut self, end_ms: u64) {
        let target = self.spec.ms_to_frames(end_ms) * self.spec.channels as usize;
        if self.samples.len() < target {
            self.samples.resize(target, 0);
        }
    }

    /// Mix a clip into the track starting at `begin_ms`.
    ///
    /// The mix is additive with saturation; existing content at the offset is
    /// kept. A clip reaching past the current end extends the track.
    pub fn overlay(&mut self, clip: &SynthesizedClip, begin_ms: u64) -> Result<(), AudioError> {
        if clip.sample_rate != self.spec.sample_rate || clip.channels != self.spec.channels {
            return Err(AudioError::FormatMismatch {
                clip_rate: clip.sample_rate,
                clip_channels: clip.channels,
                track_rate: self.spec.sample_rate,
                track_channels: self.spec.channels,
            });
        }

        let offset = self.spec.ms_to_frames(begin_ms) * self.spec.channels as usize;
        let required = offset + clip.samples.len();
        if self.samples.len() < required {
            self.samples.resize(required, 0);
        }

        for (i, &sample) in clip.samples.iter().enumerate() {
            let slot = &mut self.samples[offset + i];
            *slot = (*slot as i32 + sample as i32)
                .clamp(i16::MIN as i32, i16::MAX as i32) as i16;
        }

        debug!(
            "Overlaid {} ms clip at offset {} ms (track now {} ms)",
            clip.duration_ms(),
            begin_ms,
            self.duration_ms()
        );
        Ok(())
    }

    /// Write the track to an uncompressed 16-bit PCM WAV file.
    ///
    /// Called exactly once, at the end of a successful run.
    pub fn write_wav<P: AsRef<Path>>(&self, path: P) -> Result<(), AudioError> {
        let path = path.as_ref();

        if self.samples.is_empty() {
            warn!("Writing an empty track to {:?}", path);
        }

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| AudioError::WriteFailed(e.to_string()))?;
            }
        }

        let wav_spec = hound::WavSpec {
            channels: self.spec.channels,
            sample_rate: self.spec.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut writer = hound::WavWriter::create(path, wav_spec)
            .map_err(|e| AudioError::WriteFailed(e.to_string()))?;
        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .map_err(|e| AudioError::WriteFailed(e.to_string()))?;
        }
        writer
            .finalize()
            .map_err(|e| AudioError::WriteFailed(e.to_string()))?;

        Ok(())
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "Track: {} ms @ {} Hz / {} ch",
            self.duration_ms(),
            self.spec.sample_rate,
            self.spec.channels
        )
    }
}
