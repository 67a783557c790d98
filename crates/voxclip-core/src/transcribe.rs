//! Clip-to-outcome transcription pipeline.
//!
//! A recorded clip is read back from disk, its opening second is spent
//! calibrating the ambient noise floor, and only the remainder is
//! submitted for recognition. Clips with nothing above the noise floor
//! never reach the service at all.

use std::path::Path;

use anyhow::Result;

use crate::audio::AudioClip;
use crate::calibration::{CALIBRATION_WINDOW_SECS, NoiseProfile};
use crate::outcome::RecognitionOutcome;
use crate::service::{RecognizeRequest, RemoteSpeechService, SpeechService};

/// Turns WAV clips into recognition outcomes via a speech service.
pub struct Transcriber {
    service: Box<dyn SpeechService>,
}

impl Transcriber {
    /// Create a transcriber on top of `service`.
    pub fn new(service: Box<dyn SpeechService>) -> Transcriber {
        Transcriber { service }
    }

    /// Create a transcriber backed by the remote service configured in
    /// the environment.
    pub fn from_env() -> Result<Transcriber> {
        Ok(Transcriber::new(Box::new(RemoteSpeechService::from_env()?)))
    }

    /// Transcribe the WAV clip at `audio_path`.
    ///
    /// The calibration window is consumed by noise measurement and not
    /// submitted. A clip shorter than the window has no payload and is
    /// reported as no speech. Failures of any kind are folded into the
    /// returned outcome; this never panics and never aborts the caller.
    pub fn transcribe(&self, audio_path: &Path) -> RecognitionOutcome {
        let clip = match AudioClip::read_wav(audio_path) {
            Ok(clip) => clip,
            Err(err) => return RecognitionOutcome::OtherError(format!("{err:#}")),
        };

        let head_len = calibration_samples(&clip).min(clip.samples.len());
        let (head, payload) = clip.samples.split_at(head_len);

        let profile = NoiseProfile::measure(head);
        crate::verbose!(
            "Calibrated on {} samples: noise floor {:.4}, threshold {:.4}",
            head.len(),
            profile.noise_rms,
            profile.energy_threshold
        );

        if !profile.has_signal(payload, clip.sample_rate, clip.channels) {
            crate::verbose!("Nothing above the noise floor; skipping service call");
            return RecognitionOutcome::NoSpeechDetected;
        }

        let payload_clip = AudioClip {
            samples: payload.to_vec(),
            channels: clip.channels,
            sample_rate: clip.sample_rate,
        };
        let audio_wav = match payload_clip.to_wav_bytes() {
            Ok(bytes) => bytes,
            Err(err) => return RecognitionOutcome::OtherError(format!("{err:#}")),
        };

        let filename = audio_path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("audio.wav")
            .to_string();

        crate::verbose!("Submitting clip to {}", self.service.name());
        self.service.recognize(RecognizeRequest {
            audio_wav,
            filename,
        })
    }
}

/// Number of interleaved samples covered by the calibration window.
fn calibration_samples(clip: &AudioClip) -> usize {
    (clip.sample_rate as f64 * CALIBRATION_WINDOW_SECS) as usize * clip.channels as usize
}

/// Transcribe the clip at `audio_path` with the environment-configured
/// remote service.
///
/// Configuration problems fold into the outcome like any other failure.
pub fn transcribe(audio_path: &Path) -> RecognitionOutcome {
    match Transcriber::from_env() {
        Ok(transcriber) => transcriber.transcribe(audio_path),
        Err(err) => RecognitionOutcome::OtherError(format!("{err:#}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calibration_samples_cover_one_second_of_frames() {
        let clip = AudioClip {
            samples: vec![0; 44_100 * 2 * 2],
            channels: 2,
            sample_rate: 44_100,
        };
        assert_eq!(calibration_samples(&clip), 88_200);
    }
}
