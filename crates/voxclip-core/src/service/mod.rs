//! Speech recognition services.

mod remote;

pub use remote::RemoteSpeechService;

use crate::outcome::RecognitionOutcome;

/// A complete WAV clip handed to a recognition service.
#[derive(Debug, Clone)]
pub struct RecognizeRequest {
    /// Complete WAV file contents.
    pub audio_wav: Vec<u8>,

    /// File name reported to the service.
    pub filename: String,
}

/// A speech recognition backend.
///
/// Implementations do not panic and do not fail out through `Result`:
/// every failure mode is folded into a [`RecognitionOutcome`] variant,
/// so callers always get a reportable result.
pub trait SpeechService {
    /// Short identifier for logs.
    fn name(&self) -> &'static str;

    /// Recognize speech in a WAV clip.
    fn recognize(&self, request: RecognizeRequest) -> RecognitionOutcome;
}
