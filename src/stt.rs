use reqwest::blocking::multipart;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SttError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Response parsing error: {0}")]
    ParseError(String),
}

#[derive(Debug, Clone)]
pub struct SttConfig {
    pub model: String,
    pub language: Option<String>,
    pub temperature: Option<f32>,
}

impl Default for SttConfig {
    fn default() -> Self {
        Self {
            model: "whisper-large-v3".to_string(),
            language: None,
            temperature: Some(0.0),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

/// Blocking speech-to-text client for the Groq transcription endpoint.
///
/// Capture here is single-shot, so the whole utterance is uploaded as one
/// WAV file rather than streamed.
pub struct GroqStt {
    client: Client,
    api_key: String,
    base_url: String,
    config: SttConfig,
}

impl GroqStt {
    pub fn new(api_key: String) -> Self {
        Self::with_config(api_key, SttConfig::default())
    }

    pub fn with_config(api_key: String, config: SttConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            config,
        }
    }

    /// Transcribe a complete WAV utterance, blocking for the round trip.
    pub fn transcribe(&self, wav_bytes: &[u8]) -> Result<String, SttError> {
        let url = format!("{}/audio/transcriptions", self.base_url);

        let file_part = multipart::Part::bytes(wav_bytes.to_vec())
            .file_name("utterance.wav")
            .mime_str("audio/wav")?;

        let mut form = multipart::Form::new()
            .text("model", self.config.model.clone())
            .text("response_format", "json")
            .part("file", file_part);

        if let Some(language) = &self.config.language {
            form = form.text("language", language.clone());
        }
        if let Some(temperature) = self.config.temperature {
            form = form.text("temperature", temperature.to_string());
        }

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .multipart(form)
            .send()?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(SttError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response.text()?;
        let parsed: TranscriptionResponse = serde_json::from_str(&response_text)
            .map_err(|e| SttError::ParseError(format!("Invalid JSON: {}", e)))?;

        Ok(parsed.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = SttConfig::default();
        assert_eq!(config.model, "whisper-large-v3");
        assert_eq!(config.language, None);
        assert_eq!(config.temperature, Some(0.0));
    }

    #[test]
    fn test_stt_creation() {
        let stt = GroqStt::new("test_key".to_string());
        assert_eq!(stt.api_key, "test_key");
        assert_eq!(stt.base_url, "https://api.groq.com/openai/v1");
    }

    #[test]
    fn test_transcription_response_parsing() {
        let body = r#"{"text": "send an email to john"}"#;
        let parsed: TranscriptionResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.text, "send an email to john");
    }
}
