//! Microphone capture and WAV container handling.

mod devices;
mod recorder;
mod wav;

pub use devices::{AudioDeviceInfo, list_input_devices};
pub use recorder::{
    CHANNELS, DEFAULT_DURATION_SECS, DEFAULT_SAMPLE_RATE, RecorderConfig, RecordingError, record,
    record_with,
};
pub use wav::AudioClip;
