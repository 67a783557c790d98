//! Tagged outcome of one recognition attempt.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Everything one end-to-end recognition attempt can produce.
///
/// Failure modes are folded into variants instead of being raised, so
/// callers handle each case by inspection. Exactly one variant describes
/// any given attempt, and the whole thing round-trips through JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "detail", rename_all = "kebab-case")]
pub enum RecognitionOutcome {
    /// The service recognized speech and returned a transcript.
    Success(String),
    /// No speech could be matched in the clip, either by the service or
    /// because nothing in the clip rose above its own noise floor.
    NoSpeechDetected,
    /// The service could not be reached, or answered with a failure status.
    ServiceUnavailable(String),
    /// Any other failure: unreadable file, bad WAV data, malformed reply.
    OtherError(String),
}

impl fmt::Display for RecognitionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecognitionOutcome::Success(text) => write!(f, "{text}"),
            RecognitionOutcome::NoSpeechDetected => write!(f, "Could not understand audio"),
            RecognitionOutcome::ServiceUnavailable(detail) => {
                write!(f, "API unavailable: {detail}")
            }
            RecognitionOutcome::OtherError(detail) => write!(f, "Error: {detail}"),
        }
    }
}
