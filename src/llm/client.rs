use reqwest::blocking::Client;
use serde_json::{json, Value};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },
    #[error("Response parsing error: {0}")]
    ParseError(String),
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Ask the API to constrain the completion to a single JSON object.
    pub json_object_response: bool,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "llama-3.3-70b-versatile".to_string(),
            temperature: 0.1,
            max_tokens: Some(1024),
            json_object_response: true,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Message {
    pub role: String,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Blocking chat-completion client for the Groq API.
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
    config: LlmConfig,
}

impl GroqClient {
    pub fn new(api_key: String) -> Self {
        Self::with_config(api_key, LlmConfig::default())
    }

    pub fn with_config(api_key: String, config: LlmConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(60)) // LLM calls can be slow
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            config,
        }
    }

    /// Generate a completion and return the first choice's content.
    pub fn complete(&self, messages: Vec<Message>) -> Result<String, LlmError> {
        let url = format!("{}/chat/completions", self.base_url);

        let messages_json: Vec<Value> = messages
            .into_iter()
            .map(|msg| {
                json!({
                    "role": msg.role,
                    "content": msg.content
                })
            })
            .collect();

        let mut payload = json!({
            "model": self.config.model,
            "messages": messages_json,
            "temperature": self.config.temperature,
            "stream": false
        });

        if let Some(max_tokens) = self.config.max_tokens {
            payload["max_tokens"] = json!(max_tokens);
        }
        if self.config.json_object_response {
            payload["response_format"] = json!({"type": "json_object"});
        }

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(LlmError::ApiError {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let response_text = response.text()?;
        parse_content(&response_text)
    }

    /// Convenience for a single system + user exchange.
    pub fn ask_with_system(
        &self,
        system_prompt: &str,
        user_prompt: &str,
    ) -> Result<String, LlmError> {
        let messages = vec![Message::system(system_prompt), Message::user(user_prompt)];
        self.complete(messages)
    }
}

/// Pull the first choice's message content out of a chat-completion body.
fn parse_content(response_text: &str) -> Result<String, LlmError> {
    let json: Value = serde_json::from_str(response_text)
        .map_err(|e| LlmError::ParseError(format!("Invalid JSON: {}", e)))?;

    let choices = json["choices"]
        .as_array()
        .ok_or_else(|| LlmError::ParseError("Missing 'choices' field".to_string()))?;

    if choices.is_empty() {
        return Err(LlmError::ParseError("Empty choices array".to_string()));
    }

    let content = choices[0]["message"]["content"]
        .as_str()
        .ok_or_else(|| LlmError::ParseError("Missing message content".to_string()))?;

    Ok(content.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_creation() {
        let system_msg = Message::system("You are a helpful assistant");
        assert_eq!(system_msg.role, "system");
        assert_eq!(system_msg.content, "You are a helpful assistant");

        let user_msg = Message::user("Hello");
        assert_eq!(user_msg.role, "user");
        assert_eq!(user_msg.content, "Hello");
    }

    #[test]
    fn test_config_defaults() {
        let config = LlmConfig::default();
        assert_eq!(config.model, "llama-3.3-70b-versatile");
        assert_eq!(config.temperature, 0.1);
        assert_eq!(config.max_tokens, Some(1024));
        assert!(config.json_object_response);
    }

    #[test]
    fn test_parse_content() {
        let body = r#"{
            "choices": [{"message": {"role": "assistant", "content": "{\"intent\": \"unknown\"}"}}]
        }"#;
        let content = parse_content(body).unwrap();
        assert_eq!(content, r#"{"intent": "unknown"}"#);
    }

    #[test]
    fn test_parse_content_missing_choices() {
        let result = parse_content(r#"{"error": "nope"}"#);
        assert!(matches!(result, Err(LlmError::ParseError(_))));
    }

    #[test]
    fn test_parse_content_rejects_invalid_json() {
        assert!(matches!(
            parse_content("not json"),
            Err(LlmError::ParseError(_))
        ));
    }
}
