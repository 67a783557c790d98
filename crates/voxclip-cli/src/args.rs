//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

/// Record a short clip from the microphone, send it to a speech
/// recognition service, and print the transcript.
#[derive(Parser, Debug)]
#[command(name = "voxclip", version, about)]
pub struct Args {
    /// Clip length in seconds
    #[arg(long, default_value_t = voxclip_core::DEFAULT_DURATION_SECS)]
    pub duration: f64,

    /// Capture sample rate in Hz
    #[arg(long, default_value_t = voxclip_core::DEFAULT_SAMPLE_RATE)]
    pub sample_rate: u32,

    /// Where the recorded WAV clip is written
    #[arg(long, default_value = "recording.wav")]
    pub output: PathBuf,

    /// Input device to record from (default: system default)
    #[arg(long)]
    pub device: Option<String>,

    /// List available input devices and exit
    #[arg(long)]
    pub list_devices: bool,

    /// Keep the recorded clip instead of deleting it afterwards
    #[arg(long)]
    pub keep: bool,

    /// Print progress details to stderr
    #[arg(short, long)]
    pub verbose: bool,
}
