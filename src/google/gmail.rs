use super::auth::GoogleAuthenticator;
use super::{GoogleApiError, MailApi};
use base64::engine::general_purpose::URL_SAFE;
use base64::Engine as _;
use reqwest::blocking::Client;
use serde_json::json;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Blocking Gmail REST client, limited to sending messages.
pub struct GmailClient {
    client: Client,
    auth: Arc<Mutex<GoogleAuthenticator>>,
    base_url: String,
}

impl GmailClient {
    pub fn new(auth: Arc<Mutex<GoogleAuthenticator>>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            auth,
            base_url: "https://gmail.googleapis.com/gmail/v1".to_string(),
        }
    }
}

impl MailApi for GmailClient {
    fn send_raw(&self, raw_message: &[u8]) -> Result<String, GoogleApiError> {
        let token = self
            .auth
            .lock()
            .map_err(|_| GoogleApiError::LockPoisoned)?
            .access_token()?;

        let url = format!("{}/users/me/messages/send", self.base_url);
        let payload = json!({ "raw": URL_SAFE.encode(raw_message) });

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(&payload)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(GoogleApiError::Api {
                status: status.as_u16(),
                message: error_text,
            });
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| GoogleApiError::Parse(format!("Invalid JSON: {}", e)))?;
        let message_id = body["id"].as_str().unwrap_or_default().to_string();
        log::info!("📧 Gmail message sent (id: {})", message_id);
        Ok(message_id)
    }
}

/// Build a plain-text RFC 2822 message for the Gmail raw-send endpoint.
pub fn build_plain_text_message(to: &str, subject: &str, body: &str) -> Vec<u8> {
    format!(
        "To: {}\r\nSubject: {}\r\nMIME-Version: 1.0\r\nContent-Type: text/plain; charset=\"UTF-8\"\r\n\r\n{}",
        to, subject, body
    )
    .into_bytes()
}
