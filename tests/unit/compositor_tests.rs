/*!
 * Tests for timeline composition
 */

use std::fs;
use audiodesc::compositor::{SynthesizedClip, Track, TrackSpec};
use audiodesc::errors::AudioError;
use crate::common;

const SPEC: TrackSpec = TrackSpec {
    sample_rate: 24_000,
    channels: 1,
};

#[test]
fn test_trackSpec_conversions_shouldRoundTrip() {
    assert_eq!(SPEC.ms_to_frames(1000), 24_000);
    assert_eq!(SPEC.ms_to_frames(0), 0);
    assert_eq!(SPEC.frames_to_ms(24_000), 1000);
    assert_eq!(SPEC.frames_to_ms(SPEC.ms_to_frames(2500)), 2500);
}

#[test]
fn test_track_new_shouldStartSilentWithZeroDuration() {
    let track = Track::new(SPEC);
    assert_eq!(track.duration_ms(), 0);
    assert_eq!(track.frames(), 0);
}

#[test]
fn test_pad_to_shouldGrowToExactDuration() {
    let mut track = Track::new(SPEC);
    track.pad_to(1500);
    assert_eq!(track.duration_ms(), 1500);
    assert!(track.samples().iter().all(|&s| s == 0));
}

#[test]
fn test_pad_to_withShorterTarget_shouldNotTruncate() {
    let mut track = Track::new(SPEC);
    track.pad_to(2000);
    track.pad_to(1000);
    assert_eq!(track.duration_ms(), 2000);
}

#[test]
fn test_overlay_withClipLongerThanSlot_shouldExtendTrack() {
    // One cue {begin 1000, end 2000} whose synthesis came back 1500 ms long:
    // the track must reach 2500 ms.
    let mut track = Track::new(SPEC);
    let clip = SynthesizedClip::silent(1500, SPEC);

    track.pad_to(2000);
    track.overlay(&clip, 1000).unwrap();

    assert!(track.duration_ms() >= 2500);
    assert_eq!(track.duration_ms(), 2500);
}

#[test]
fn test_overlay_withExactFits_shouldProduceGaplessTrack() {
    // Two sequential cues, each synthesized at exactly its slot length:
    // the final duration is exactly the second cue's end.
    let mut track = Track::new(SPEC);
    let clip = SynthesizedClip::silent(1000, SPEC);

    track.pad_to(1000);
    track.overlay(&clip, 0).unwrap();
    track.pad_to(2000);
    track.overlay(&clip, 1000).unwrap();

    assert_eq!(track.duration_ms(), 2000);
}

#[test]
fn test_overlay_withNonOverlappingCues_shouldCoverBothSpans() {
    let mut track = Track::new(SPEC);
    let clip = SynthesizedClip::silent(800, SPEC);

    // C1 ends at 1000, C2 begins at 1500 and ends at 2500
    track.pad_to(1000);
    track.overlay(&clip, 200).unwrap();
    track.pad_to(2500);
    track.overlay(&clip, 1500).unwrap();

    assert!(track.duration_ms() >= 2500);
}

#[test]
fn test_overlay_shouldMixAdditively() {
    let mut track = Track::new(SPEC);
    let quiet = SynthesizedClip {
        samples: vec![100i16; 2400],
        sample_rate: 24_000,
        channels: 1,
    };
    let louder = SynthesizedClip {
        samples: vec![250i16; 2400],
        sample_rate: 24_000,
        channels: 1,
    };

    track.overlay(&quiet, 0).unwrap();
    track.overlay(&louder, 0).unwrap();

    // Both contributions survive: samples sum instead of replacing
    assert!(track.samples().iter().all(|&s| s == 350));
}

#[test]
fn test_overlay_withExtremeAmplitudes_shouldSaturateNotWrap() {
    let mut track = Track::new(SPEC);
    let loud = SynthesizedClip {
        samples: vec![i16::MAX; 240],
        sample_rate: 24_000,
        channels: 1,
    };

    track.overlay(&loud, 0).unwrap();
    track.overlay(&loud, 0).unwrap();

    assert!(track.samples().iter().all(|&s| s == i16::MAX));
}

#[test]
fn test_overlay_withMismatchedFormat_shouldFail() {
    let mut track = Track::new(SPEC);
    let clip = SynthesizedClip {
        samples: vec![0i16; 100],
        sample_rate: 44_100,
        channels: 1,
    };

    let result = track.overlay(&clip, 0);
    assert!(matches!(result, Err(AudioError::FormatMismatch { .. })));

    let stereo = SynthesizedClip {
        samples: vec![0i16; 100],
        sample_rate: 24_000,
        channels: 2,
    };
    assert!(track.overlay(&stereo, 0).is_err());
}

#[test]
fn test_overlay_shouldNotDisturbExistingContent() {
    let mut track = Track::new(SPEC);
    let first = SynthesizedClip {
        samples: vec![500i16; SPEC.ms_to_frames(1000)],
        sample_rate: 24_000,
        channels: 1,
    };

    track.overlay(&first, 0).unwrap();
    let silent = SynthesizedClip::silent(500, SPEC);
    track.overlay(&silent, 2000).unwrap();

    // The original second of audio is untouched by a later overlay elsewhere
    assert!(track.samples()[..SPEC.ms_to_frames(1000)].iter().all(|&s| s == 500));
}

#[test]
fn test_synthesizedClip_fromWavBytes_shouldDecodePcm() {
    let bytes = common::wav_bytes_constant(750, 24_000, 1, 123);
    let clip = SynthesizedClip::from_wav_bytes(&bytes).unwrap();

    assert_eq!(clip.sample_rate, 24_000);
    assert_eq!(clip.channels, 1);
    assert_eq!(clip.duration_ms(), 750);
    assert!(clip.samples.iter().all(|&s| s == 123));
}

#[test]
fn test_synthesizedClip_fromWavBytes_withGarbage_shouldFail() {
    let result = SynthesizedClip::from_wav_bytes(b"definitely not a wav file");
    assert!(matches!(result, Err(AudioError::DecodeFailed(_))));
}

#[test]
fn test_synthesizedClip_fromWavBytes_withFloatSource_shouldConvert() {
    // Build a 32-bit float WAV and check it decodes to 16-bit PCM
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate: 24_000,
        bits_per_sample: 32,
        sample_format: hound::SampleFormat::Float,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for _ in 0..2400 {
            writer.write_sample(0.5f32).unwrap();
        }
        writer.finalize().unwrap();
    }

    let clip = SynthesizedClip::from_wav_bytes(&cursor.into_inner()).unwrap();
    assert_eq!(clip.duration_ms(), 100);
    // 0.5 of full scale lands near i16::MAX / 2
    assert!(clip.samples.iter().all(|&s| (s - i16::MAX / 2).abs() <= 1));
}

/// A silent track of duration D, exported and re-read, has duration D
#[test]
fn test_track_writeWav_roundTrip_shouldPreserveDuration() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("silence.wav");

    let mut track = Track::new(SPEC);
    track.pad_to(1200);
    track.write_wav(&path).unwrap();

    let bytes = fs::read(&path).unwrap();
    let clip = SynthesizedClip::from_wav_bytes(&bytes).unwrap();
    assert_eq!(clip.duration_ms(), 1200);
    assert_eq!(clip.sample_rate, SPEC.sample_rate);
    assert_eq!(clip.channels, SPEC.channels);
}

#[test]
fn test_track_writeWav_withMissingParentDir_shouldCreateIt() {
    let temp_dir = common::create_temp_dir().unwrap();
    let path = temp_dir.path().join("nested").join("out.wav");

    let mut track = Track::new(SPEC);
    track.pad_to(100);
    track.write_wav(&path).unwrap();

    assert!(path.exists());
}

#[test]
fn test_stereo_track_shouldAccountForChannels() {
    let stereo = TrackSpec::new(24_000, 2);
    let mut track = Track::new(stereo);
    track.pad_to(1000);

    assert_eq!(track.frames(), 24_000);
    assert_eq!(track.samples().len(), 48_000);
    assert_eq!(track.duration_ms(), 1000);
}
