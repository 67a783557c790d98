//! Ambient-noise calibration and the silence gate built on it.
//!
//! The opening second of every clip is treated as room tone: its RMS
//! energy becomes the noise floor, and the rest of the clip is only
//! worth sending to the recognition service if some part of it rises
//! clearly above that floor.

/// Seconds of leading audio consumed to measure ambient noise.
pub const CALIBRATION_WINDOW_SECS: f64 = 1.0;

/// Factor above the noise floor a window must reach to count as signal.
const ENERGY_RATIO: f32 = 1.5;

/// Floor for the energy threshold, so a perfectly silent calibration
/// window (all-zero samples) does not make every window count as signal.
const MIN_THRESHOLD: f32 = 1.0e-3;

/// Length of the windows the payload is scanned in.
const SCAN_WINDOW_SECS: f64 = 0.1;

/// Noise floor measured from the calibration window of a clip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseProfile {
    /// RMS energy of the calibration window, normalized to [0, 1].
    pub noise_rms: f32,

    /// Energy a scan window must exceed to count as signal.
    pub energy_threshold: f32,
}

impl NoiseProfile {
    /// Measure ambient noise from `samples` (the calibration window,
    /// interleaved i16).
    pub fn measure(samples: &[i16]) -> NoiseProfile {
        let noise_rms = rms(samples);
        let energy_threshold = (noise_rms * ENERGY_RATIO).max(MIN_THRESHOLD);
        NoiseProfile {
            noise_rms,
            energy_threshold,
        }
    }

    /// Whether any part of `samples` rises above the noise floor.
    ///
    /// The samples are scanned in short windows so a brief utterance in
    /// an otherwise quiet clip is still detected; an empty slice has no
    /// signal by definition.
    pub fn has_signal(&self, samples: &[i16], sample_rate: u32, channels: u16) -> bool {
        if samples.is_empty() {
            return false;
        }

        let window = scan_window_len(sample_rate, channels);
        samples
            .chunks(window)
            .any(|chunk| rms(chunk) > self.energy_threshold)
    }
}

fn scan_window_len(sample_rate: u32, channels: u16) -> usize {
    let per_channel = (sample_rate as f64 * SCAN_WINDOW_SECS) as usize;
    (per_channel * channels.max(1) as usize).max(1)
}

/// RMS energy of `samples`, normalized so full-scale input reads 1.0.
fn rms(samples: &[i16]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }

    let sum_squares: f64 = samples
        .iter()
        .map(|&s| {
            let normalized = s as f64 / i16::MAX as f64;
            normalized * normalized
        })
        .sum();

    (sum_squares / samples.len() as f64).sqrt() as f32
}
