//! In-memory PCM clips and their WAV container encoding.

use std::io::Cursor;
use std::path::Path;

use anyhow::{Context, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// A PCM clip held in memory, interleaved at the 16-bit signed depth
/// clips are persisted with.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioClip {
    /// Interleaved samples, `channels` per frame.
    pub samples: Vec<i16>,
    pub channels: u16,
    pub sample_rate: u32,
}

impl AudioClip {
    /// Number of frames (one sample per channel) in the clip.
    pub fn frames(&self) -> usize {
        if self.channels == 0 {
            return 0;
        }
        self.samples.len() / self.channels as usize
    }

    /// Clip length in seconds.
    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    fn spec(&self) -> WavSpec {
        WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        }
    }

    /// Decode the WAV file at `path`.
    ///
    /// Integer samples of any depth and float samples are normalized to
    /// the 16-bit signed range; channel count and sample rate are taken
    /// from the header.
    pub fn read_wav(path: &Path) -> Result<AudioClip> {
        let mut reader = WavReader::open(path)
            .with_context(|| format!("failed to open WAV file {}", path.display()))?;
        let spec = reader.spec();

        let samples: Vec<i16> = match spec.sample_format {
            SampleFormat::Int if spec.bits_per_sample == 16 => reader
                .samples::<i16>()
                .collect::<Result<Vec<_>, _>>()
                .context("failed to read WAV samples")?,
            SampleFormat::Int => {
                let max_val = (1u32 << (spec.bits_per_sample - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|s| s.map(|v| f32_to_i16(v as f32 / max_val)))
                    .collect::<Result<Vec<_>, _>>()
                    .context("failed to read WAV samples")?
            }
            SampleFormat::Float => reader
                .samples::<f32>()
                .map(|s| s.map(f32_to_i16))
                .collect::<Result<Vec<_>, _>>()
                .context("failed to read WAV samples")?,
        };

        Ok(AudioClip {
            samples,
            channels: spec.channels,
            sample_rate: spec.sample_rate,
        })
    }

    /// Encode the clip as a complete WAV file in memory.
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        let mut writer =
            WavWriter::new(&mut cursor, self.spec()).context("failed to start WAV encoder")?;
        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .context("failed to encode WAV sample")?;
        }
        writer.finalize().context("failed to finalize WAV data")?;
        Ok(cursor.into_inner())
    }

    /// Write the clip to `path` as a standard PCM WAV file, replacing
    /// any previous content at that path.
    pub fn write_wav(&self, path: &Path) -> Result<()> {
        let mut writer = WavWriter::create(path, self.spec())
            .with_context(|| format!("failed to create WAV file {}", path.display()))?;
        for &sample in &self.samples {
            writer
                .write_sample(sample)
                .context("failed to write WAV sample")?;
        }
        writer.finalize().context("failed to finalize WAV file")?;
        Ok(())
    }
}

/// Clamp-and-scale a normalized float sample to 16-bit signed.
pub(crate) fn f32_to_i16(sample: f32) -> i16 {
    (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_clip(frames: usize, sample_rate: u32, value: i16) -> AudioClip {
        AudioClip {
            samples: vec![value; frames * 2],
            channels: 2,
            sample_rate,
        }
    }

    #[test]
    fn test_f32_to_i16() {
        assert_eq!(f32_to_i16(0.0), 0);
        assert_eq!(f32_to_i16(1.0), i16::MAX);
        assert_eq!(f32_to_i16(-1.0), -i16::MAX);

        // Out-of-range input clamps instead of wrapping
        assert_eq!(f32_to_i16(2.0), i16::MAX);
        assert_eq!(f32_to_i16(-2.0), -i16::MAX);
    }

    #[test]
    fn test_written_file_has_clip_shape() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        let clip = stereo_clip(8_000, 8_000, 100);
        clip.write_wav(&path).unwrap();

        let reader = WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_rate, 8_000);
        assert_eq!(reader.duration(), 8_000);

        let back = AudioClip::read_wav(&path).unwrap();
        assert_eq!(back, clip);
        assert!((back.duration_seconds() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_write_wav_truncates_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");

        stereo_clip(4_000, 8_000, 42).write_wav(&path).unwrap();
        let small = stereo_clip(100, 8_000, 7);
        small.write_wav(&path).unwrap();

        let back = AudioClip::read_wav(&path).unwrap();
        assert_eq!(back, small, "old samples must not survive a rewrite");
    }

    #[test]
    fn test_to_wav_bytes_round_trips() {
        let clip = AudioClip {
            samples: vec![0, 1000, -1000, i16::MAX, i16::MIN, 3],
            channels: 2,
            sample_rate: 16_000,
        };

        let bytes = clip.to_wav_bytes().unwrap();
        let mut reader = WavReader::new(Cursor::new(bytes)).unwrap();
        assert_eq!(reader.spec(), clip.spec());
        let samples: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(samples, clip.samples);
    }

    #[test]
    fn test_read_wav_normalizes_float_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("float.wav");

        let spec = WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for value in [0.0f32, 0.5, -0.5, 1.0] {
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();

        let clip = AudioClip::read_wav(&path).unwrap();
        assert_eq!(clip.channels, 1);
        assert_eq!(clip.samples.len(), 4);
        assert_eq!(clip.samples[0], 0);
        assert!((clip.samples[1] - i16::MAX / 2).abs() <= 1);
        assert!((clip.samples[2] + i16::MAX / 2).abs() <= 1);
        assert_eq!(clip.samples[3], i16::MAX);
    }

    #[test]
    fn test_read_wav_normalizes_24_bit_samples() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("deep.wav");

        let spec = WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 24,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        // Half of the 24-bit positive range
        writer.write_sample(1i32 << 22).unwrap();
        writer.write_sample(0i32).unwrap();
        writer.finalize().unwrap();

        let clip = AudioClip::read_wav(&path).unwrap();
        assert!((clip.samples[0] - i16::MAX / 2).abs() <= 1);
        assert_eq!(clip.samples[1], 0);
    }

    #[test]
    fn test_read_wav_missing_file_is_error() {
        let err = AudioClip::read_wav(Path::new("/nonexistent/clip.wav")).unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn test_write_wav_unwritable_destination_is_error() {
        let clip = stereo_clip(10, 8_000, 1);
        let err = clip
            .write_wav(Path::new("/nonexistent/dir/clip.wav"))
            .unwrap_err();
        assert!(err.to_string().contains("clip.wav"));
    }
}
