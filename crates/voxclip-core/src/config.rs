//! Speech service configuration, resolved from the environment.

use anyhow::Result;

/// Base URL used when no service URL is configured.
pub const DEFAULT_SERVICE_URL: &str = "https://api.openai.com";

/// Model requested when none is configured.
pub const DEFAULT_MODEL: &str = "whisper-1";

/// Path of the OpenAI-compatible transcription endpoint.
const TRANSCRIPTIONS_PATH: &str = "/v1/audio/transcriptions";

/// Where and how to reach the speech recognition service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Full transcription endpoint URL.
    pub endpoint: String,

    /// Bearer token, if the service requires one. Self-hosted
    /// OpenAI-compatible servers typically accept any value.
    pub api_key: Option<String>,

    /// Model name sent with each request.
    pub model: String,
}

impl ServiceConfig {
    /// Resolve the configuration from the environment.
    ///
    /// `VOXCLIP_SERVICE_URL` overrides the service base URL,
    /// `VOXCLIP_API_KEY` (falling back to `OPENAI_API_KEY`) supplies the
    /// bearer token, and `VOXCLIP_MODEL` picks the model. Unset or empty
    /// variables fall back to the defaults.
    ///
    /// # Errors
    /// Returns an error if the configured service URL is malformed.
    pub fn from_env() -> Result<ServiceConfig> {
        let base_url =
            env_nonempty("VOXCLIP_SERVICE_URL").unwrap_or_else(|| DEFAULT_SERVICE_URL.to_string());
        let endpoint = build_endpoint(&base_url)?;

        let api_key = env_nonempty("VOXCLIP_API_KEY").or_else(|| env_nonempty("OPENAI_API_KEY"));
        let model = env_nonempty("VOXCLIP_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Ok(ServiceConfig {
            endpoint,
            api_key,
            model,
        })
    }
}

fn env_nonempty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Build the full transcription endpoint from a service base URL.
///
/// Accepts either a bare server URL (`http://localhost:8765`) or a full
/// endpoint; the transcriptions path is appended only when missing.
pub fn build_endpoint(base_url: &str) -> Result<String> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        anyhow::bail!(
            "Speech service URL is empty.\n\
             Set with: VOXCLIP_SERVICE_URL=https://api.openai.com"
        );
    }

    if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
        anyhow::bail!(
            "Invalid speech service URL: must start with http:// or https://\n\
             Got: {trimmed}\n\
             Example: VOXCLIP_SERVICE_URL=http://localhost:8765"
        );
    }

    // Basic validation: ensure there's a host after the scheme
    let after_scheme = trimmed
        .strip_prefix("http://")
        .or_else(|| trimmed.strip_prefix("https://"))
        .unwrap_or("");
    if after_scheme.is_empty() || after_scheme.starts_with('/') {
        anyhow::bail!(
            "Invalid speech service URL: missing host\n\
             Got: {trimmed}\n\
             Example: VOXCLIP_SERVICE_URL=http://localhost:8765"
        );
    }

    let base = trimmed.trim_end_matches('/');
    if base.ends_with(TRANSCRIPTIONS_PATH) {
        return Ok(base.to_string());
    }
    Ok(format!("{base}{TRANSCRIPTIONS_PATH}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_endpoint_appends_transcriptions_path() {
        assert_eq!(
            build_endpoint("https://api.openai.com").unwrap(),
            "https://api.openai.com/v1/audio/transcriptions"
        );
        assert_eq!(
            build_endpoint("http://localhost:8765").unwrap(),
            "http://localhost:8765/v1/audio/transcriptions"
        );
    }

    #[test]
    fn test_build_endpoint_trims_trailing_slash() {
        assert_eq!(
            build_endpoint("http://localhost:8765/").unwrap(),
            "http://localhost:8765/v1/audio/transcriptions"
        );
    }

    #[test]
    fn test_build_endpoint_keeps_full_endpoint() {
        assert_eq!(
            build_endpoint("https://api.openai.com/v1/audio/transcriptions").unwrap(),
            "https://api.openai.com/v1/audio/transcriptions"
        );
    }

    #[test]
    fn test_build_endpoint_rejects_missing_scheme() {
        let err = build_endpoint("localhost:8765").unwrap_err();
        assert!(err.to_string().contains("http://"));
    }

    #[test]
    fn test_build_endpoint_rejects_missing_host() {
        assert!(build_endpoint("http://").is_err());
        assert!(build_endpoint("https:///v1").is_err());
    }

    #[test]
    fn test_build_endpoint_rejects_empty() {
        assert!(build_endpoint("").is_err());
        assert!(build_endpoint("   ").is_err());
    }
}
