pub mod audio;
pub mod calibration;
pub mod config;
pub mod outcome;
pub mod service;
pub mod transcribe;
pub mod verbose;

pub use audio::{
    AudioClip, AudioDeviceInfo, CHANNELS, DEFAULT_DURATION_SECS, DEFAULT_SAMPLE_RATE,
    RecorderConfig, RecordingError, list_input_devices, record, record_with,
};
pub use calibration::NoiseProfile;
pub use config::ServiceConfig;
pub use outcome::RecognitionOutcome;
pub use service::{RecognizeRequest, RemoteSpeechService, SpeechService};
pub use transcribe::{Transcriber, transcribe};
pub use verbose::set_verbose;
