//! Recognition over blocking HTTP against OpenAI-compatible servers.
//!
//! The request format is the OpenAI Whisper API one, shared by several
//! hosted providers and by self-hosted servers such as
//! faster-whisper-server:
//! - Multipart form upload with `model` and `file` fields
//! - Authorization via `Bearer` token
//! - JSON response with `text` field

use anyhow::{Context, Result};
use reqwest::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use serde::Deserialize;

use super::{RecognizeRequest, SpeechService};
use crate::config::ServiceConfig;
use crate::outcome::RecognitionOutcome;

/// Placeholder bearer token for servers that don't check authentication.
/// The API format expects the header even when no key is configured.
const NO_AUTH: &str = "no-auth";

/// Response structure for OpenAI-compatible APIs
#[derive(Deserialize)]
struct TranscriptionReply {
    text: String,
}

/// Recognizer backed by an OpenAI-compatible transcription endpoint.
pub struct RemoteSpeechService {
    config: ServiceConfig,
    client: reqwest::blocking::Client,
}

impl RemoteSpeechService {
    /// Create a service talking to `config`'s endpoint.
    ///
    /// No request timeout is configured; the client keeps reqwest's
    /// default.
    pub fn new(config: ServiceConfig) -> Result<RemoteSpeechService> {
        let client = reqwest::blocking::Client::builder()
            .build()
            .context("Failed to create HTTP client")?;
        Ok(RemoteSpeechService { config, client })
    }

    /// Create a service configured from the environment.
    pub fn from_env() -> Result<RemoteSpeechService> {
        Self::new(ServiceConfig::from_env()?)
    }
}

impl SpeechService for RemoteSpeechService {
    fn name(&self) -> &'static str {
        "remote-speech"
    }

    fn recognize(&self, request: RecognizeRequest) -> RecognitionOutcome {
        crate::verbose!(
            "Uploading {} bytes to {} (model {})",
            request.audio_wav.len(),
            self.config.endpoint,
            self.config.model
        );

        let part = match Part::bytes(request.audio_wav)
            .file_name(request.filename)
            .mime_str("audio/wav")
        {
            Ok(part) => part,
            Err(err) => {
                return RecognitionOutcome::OtherError(format!("failed to build upload: {err}"));
            }
        };
        let form = Form::new()
            .text("model", self.config.model.clone())
            .part("file", part);

        let api_key = self.config.api_key.as_deref().unwrap_or(NO_AUTH);
        let response = match self
            .client
            .post(&self.config.endpoint)
            .header("Authorization", format!("Bearer {api_key}"))
            .multipart(form)
            .send()
        {
            Ok(response) => response,
            Err(err) => return RecognitionOutcome::ServiceUnavailable(err.to_string()),
        };

        let status = response.status();
        let body = match response.text() {
            Ok(body) => body,
            Err(err) => return RecognitionOutcome::ServiceUnavailable(err.to_string()),
        };

        classify_reply(status, &body)
    }
}

/// Fold an HTTP reply into a recognition outcome.
fn classify_reply(status: StatusCode, body: &str) -> RecognitionOutcome {
    if !status.is_success() {
        let detail = body.trim();
        let detail = if detail.is_empty() {
            "Unknown error"
        } else {
            detail
        };
        return RecognitionOutcome::ServiceUnavailable(format!("API error ({status}): {detail}"));
    }

    match serde_json::from_str::<TranscriptionReply>(body) {
        Ok(reply) => {
            // Whisper-style services answer silence with an empty
            // transcript rather than an error.
            let text = reply.text.trim();
            if text.is_empty() {
                RecognitionOutcome::NoSpeechDetected
            } else {
                RecognitionOutcome::Success(text.to_string())
            }
        }
        Err(err) => RecognitionOutcome::OtherError(format!("failed to parse service reply: {err}")),
    }
}
