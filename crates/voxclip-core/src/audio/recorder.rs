//! Fixed-duration microphone capture.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, Device, SampleFormat, Stream, StreamConfig};
use thiserror::Error;

use super::devices;
use super::wav::{self, AudioClip};

/// Channels captured and written to disk.
pub const CHANNELS: u16 = 2;

/// Default clip length in seconds.
pub const DEFAULT_DURATION_SECS: f64 = 15.0;

/// Default capture rate in Hz.
pub const DEFAULT_SAMPLE_RATE: u32 = 44_100;

/// Extra wall-clock time granted beyond the clip duration before a
/// capture that has not delivered enough samples is declared stalled.
const CAPTURE_GRACE: Duration = Duration::from_secs(2);

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Most interleaved samples a clip buffer may hold. `Vec` allocations
/// are capped at `isize::MAX` bytes.
const MAX_CLIP_SAMPLES: usize = isize::MAX as usize / size_of::<i16>();

/// Global counter for stream errors (reset per capture).
/// Used to provide rate-limited, user-friendly error reporting.
static STREAM_ERROR_COUNT: AtomicU64 = AtomicU64::new(0);

fn reset_stream_error_count() {
    STREAM_ERROR_COUNT.store(0, Ordering::Relaxed);
}

/// Errors that can occur while capturing a clip.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordingError {
    #[error("invalid recording parameters: {0}")]
    InvalidParameters(String),

    #[error("no audio input device found")]
    NoInputDevice,

    #[error("audio input device not found: {0}")]
    DeviceNotFound(String),

    #[error("audio device error: {0}")]
    Device(String),

    #[error("unsupported sample format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to open audio stream: {0}")]
    Stream(String),

    #[error("audio capture stalled after {got} of {want} samples")]
    Stalled { got: usize, want: usize },

    #[error("failed to write WAV file: {0}")]
    Wav(String),
}

/// Configuration for a capture.
#[derive(Debug, Clone)]
pub struct RecorderConfig {
    /// Device name to use (None = system default)
    pub device_name: Option<String>,

    /// Clip length in seconds.
    pub duration_secs: f64,

    /// Capture rate in Hz.
    pub sample_rate: u32,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            device_name: None,
            duration_secs: DEFAULT_DURATION_SECS,
            sample_rate: DEFAULT_SAMPLE_RATE,
        }
    }
}

impl RecorderConfig {
    /// Create a new recorder configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the device name.
    pub fn with_device(mut self, device_name: impl Into<String>) -> Self {
        self.device_name = Some(device_name.into());
        self
    }

    /// Set the clip length.
    pub fn with_duration(mut self, duration_secs: f64) -> Self {
        self.duration_secs = duration_secs;
        self
    }

    /// Set the capture rate.
    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

/// Record a clip of `duration_secs` seconds at `sample_rate` Hz from the
/// default input device and write it to `destination` as 16-bit WAV.
pub fn record(
    destination: &Path,
    duration_secs: f64,
    sample_rate: u32,
) -> Result<(), RecordingError> {
    record_with(
        destination,
        &RecorderConfig::new()
            .with_duration(duration_secs)
            .with_sample_rate(sample_rate),
    )
}

/// Record a clip per `config` and write it to `destination`.
///
/// The clip is buffered in memory for the whole capture and written out
/// once complete, so `destination` either holds a full clip or nothing.
///
/// # Errors
/// Returns an error if the parameters are invalid, no matching input
/// device exists, the stream cannot be opened, the device stops
/// delivering samples, or the WAV file cannot be written.
pub fn record_with(destination: &Path, config: &RecorderConfig) -> Result<(), RecordingError> {
    let frames = frames_for(config.duration_secs, config.sample_rate)?;
    let device = open_input_device(config.device_name.as_deref())?;
    let clip = capture(&device, config.sample_rate, frames)?;
    clip.write_wav(destination)
        .map_err(|e| RecordingError::Wav(format!("{e:#}")))
}

/// Number of frames a clip of `duration_secs` at `sample_rate` holds,
/// truncated to whole frames. Clips whose interleaved sample count
/// would not fit in a single allocation are rejected here, before any
/// device is touched.
fn frames_for(duration_secs: f64, sample_rate: u32) -> Result<usize, RecordingError> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 {
        return Err(RecordingError::InvalidParameters(format!(
            "duration must be positive, got {duration_secs}"
        )));
    }
    if sample_rate == 0 {
        return Err(RecordingError::InvalidParameters(
            "sample rate must be non-zero".to_string(),
        ));
    }

    // The f64 -> usize cast saturates, so an absurd duration shows up
    // here as a sample count that no longer fits the buffer bound.
    let frames = (duration_secs * sample_rate as f64) as usize;
    if frames == 0 {
        return Err(RecordingError::InvalidParameters(format!(
            "duration {duration_secs}s is shorter than one frame at {sample_rate} Hz"
        )));
    }
    if frames
        .checked_mul(CHANNELS as usize)
        .is_none_or(|samples| samples > MAX_CLIP_SAMPLES)
    {
        return Err(RecordingError::InvalidParameters(format!(
            "duration {duration_secs}s at {sample_rate} Hz exceeds the largest representable clip"
        )));
    }

    Ok(frames)
}

fn open_input_device(device_name: Option<&str>) -> Result<Device, RecordingError> {
    devices::init_platform();

    let host = cpal::default_host();
    let Some(wanted) = device_name else {
        return host.default_input_device().ok_or(RecordingError::NoInputDevice);
    };

    let devices = host
        .input_devices()
        .map_err(|e| RecordingError::Device(e.to_string()))?;
    for device in devices {
        if let Ok(desc) = device.description() {
            if desc.to_string() == wanted {
                return Ok(device);
            }
        }
    }

    Err(RecordingError::DeviceNotFound(wanted.to_string()))
}

fn capture(device: &Device, sample_rate: u32, frames: usize) -> Result<AudioClip, RecordingError> {
    // frames_for has already bounded frames, so this cannot overflow.
    let target_samples = frames * CHANNELS as usize;

    // The device's native format decides the callback sample type; the
    // stream itself is asked for the clip's channel count and rate.
    let default_config = device
        .default_input_config()
        .map_err(|e| RecordingError::Device(e.to_string()))?;
    let sample_format = default_config.sample_format();
    let config = requested_config(sample_rate);

    if let Ok(desc) = device.description() {
        crate::verbose!("Capturing from {desc}: {CHANNELS} channels at {sample_rate} Hz ({sample_format:?})");
    }

    reset_stream_error_count();

    let samples: Arc<Mutex<Vec<i16>>> = Arc::new(Mutex::new(Vec::with_capacity(target_samples)));
    let stream = match sample_format {
        SampleFormat::I16 => build_stream::<i16>(device, &config, samples.clone(), target_samples),
        SampleFormat::U16 => build_stream::<u16>(device, &config, samples.clone(), target_samples),
        SampleFormat::F32 => build_stream::<f32>(device, &config, samples.clone(), target_samples),
        other => return Err(RecordingError::UnsupportedFormat(format!("{other:?}"))),
    }?;

    stream
        .play()
        .map_err(|e| RecordingError::Stream(e.to_string()))?;

    // Completion is judged by sample count, not wall clock: hardware
    // delivers in its own buffer cadence and may run slightly behind.
    let deadline = Instant::now()
        + Duration::from_secs_f64(frames as f64 / sample_rate as f64)
        + CAPTURE_GRACE;
    loop {
        let collected = samples.lock().unwrap().len();
        if collected >= target_samples {
            break;
        }
        if Instant::now() >= deadline {
            drop(stream);
            let got = samples.lock().unwrap().len();
            return Err(RecordingError::Stalled {
                got,
                want: target_samples,
            });
        }
        std::thread::sleep(POLL_INTERVAL);
    }
    drop(stream);

    let mut captured = std::mem::take(&mut *samples.lock().unwrap());
    captured.truncate(target_samples);

    Ok(AudioClip {
        samples: captured,
        channels: CHANNELS,
        sample_rate,
    })
}

/// Stream configuration asking the device for the clip's shape.
fn requested_config(sample_rate: u32) -> StreamConfig {
    StreamConfig {
        channels: CHANNELS,
        sample_rate,
        buffer_size: BufferSize::Default,
    }
}

fn build_stream<T>(
    device: &Device,
    config: &StreamConfig,
    samples: Arc<Mutex<Vec<i16>>>,
    target_samples: usize,
) -> Result<Stream, RecordingError>
where
    T: cpal::Sample + cpal::SizedSample,
    f32: cpal::FromSample<T>,
{
    // Rate-limited error handler for ALSA stream errors.
    // These are common on Linux (especially with USB audio) and non-fatal.
    let err_fn = |err| {
        let count = STREAM_ERROR_COUNT.fetch_add(1, Ordering::Relaxed);
        if count == 0 {
            crate::verbose!(
                "Audio stream error (common on Linux, non-fatal): {err}\n\
                 Subsequent similar errors will be suppressed."
            );
        } else if count.is_multiple_of(1000) {
            crate::verbose!("Audio stream: {count} non-fatal errors (capture continues normally)");
        }
    };

    let stream = device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let mut buffer = samples.lock().unwrap();
                let room = target_samples.saturating_sub(buffer.len());
                if room == 0 {
                    return;
                }
                buffer.extend(data.iter().take(room).map(|&s| sample_to_i16(s)));
            },
            err_fn,
            None,
        )
        .map_err(|e| RecordingError::Stream(e.to_string()))?;

    Ok(stream)
}

/// Convert any captured sample type to i16 for WAV writing.
fn sample_to_i16<T>(sample: T) -> i16
where
    T: cpal::Sample,
    f32: cpal::FromSample<T>,
{
    wav::f32_to_i16(cpal::Sample::from_sample(sample))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_for_whole_clip() {
        assert_eq!(frames_for(15.0, 44_100).unwrap(), 661_500);
        assert_eq!(frames_for(1.0, 16_000).unwrap(), 16_000);
        // Partial frames truncate
        assert_eq!(frames_for(0.5, 3).unwrap(), 1);
    }

    #[test]
    fn test_frames_for_rejects_bad_parameters() {
        assert!(matches!(
            frames_for(0.0, 44_100),
            Err(RecordingError::InvalidParameters(_))
        ));
        assert!(matches!(
            frames_for(-1.0, 44_100),
            Err(RecordingError::InvalidParameters(_))
        ));
        assert!(matches!(
            frames_for(f64::NAN, 44_100),
            Err(RecordingError::InvalidParameters(_))
        ));
        assert!(matches!(
            frames_for(15.0, 0),
            Err(RecordingError::InvalidParameters(_))
        ));
        // Shorter than a single frame
        assert!(matches!(
            frames_for(1.0e-9, 44_100),
            Err(RecordingError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_frames_for_rejects_unrepresentable_clip() {
        // The saturating cast must surface as a parameter error, never
        // as a wrapped sample count reaching the capture buffer.
        assert!(matches!(
            frames_for(1.0e18, 44_100),
            Err(RecordingError::InvalidParameters(_))
        ));
        assert!(matches!(
            frames_for(f64::MAX, 2),
            Err(RecordingError::InvalidParameters(_))
        ));
    }

    #[test]
    fn test_requested_config_has_clip_shape() {
        let config = requested_config(48_000);
        assert_eq!(config.channels, CHANNELS);
        assert_eq!(config.sample_rate, 48_000);
        assert!(matches!(config.buffer_size, BufferSize::Default));
    }

    #[test]
    fn test_sample_to_i16() {
        assert_eq!(sample_to_i16(0.0f32), 0);
        assert_eq!(sample_to_i16(1.0f32), i16::MAX);
        assert_eq!(sample_to_i16(-1.0f32), -i16::MAX);

        // Out-of-range floats clamp instead of wrapping
        assert_eq!(sample_to_i16(2.0f32), i16::MAX);
        assert_eq!(sample_to_i16(-2.0f32), -i16::MAX);
    }

    #[test]
    fn test_recorder_config_defaults() {
        let config = RecorderConfig::new();
        assert_eq!(config.device_name, None);
        assert_eq!(config.duration_secs, DEFAULT_DURATION_SECS);
        assert_eq!(config.sample_rate, DEFAULT_SAMPLE_RATE);
    }

    #[test]
    fn test_recorder_config_builder() {
        let config = RecorderConfig::new()
            .with_device("USB Microphone")
            .with_duration(3.0)
            .with_sample_rate(16_000);
        assert_eq!(config.device_name.as_deref(), Some("USB Microphone"));
        assert_eq!(config.duration_secs, 3.0);
        assert_eq!(config.sample_rate, 16_000);
    }

    #[test]
    fn test_record_rejects_zero_duration_before_touching_device() {
        let err = record(Path::new("unused.wav"), 0.0, 44_100).unwrap_err();
        assert!(matches!(err, RecordingError::InvalidParameters(_)));
        assert!(!Path::new("unused.wav").exists());
    }

    #[test]
    fn test_record_rejects_oversized_duration_before_touching_device() {
        let err = record(Path::new("unused-oversized.wav"), 1.0e18, 44_100).unwrap_err();
        assert!(matches!(err, RecordingError::InvalidParameters(_)));
        assert!(!Path::new("unused-oversized.wav").exists());
    }
}
