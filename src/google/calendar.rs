use super::auth::GoogleAuthenticator;
use super::{CalendarApi, GoogleApiError};
use reqwest::blocking::Client;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Calendar event body for the events.insert endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    pub summary: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EventTime {
    #[serde(rename = "dateTime")]
    pub date_time: String,
    #[serde(rename = "timeZone")]
    pub time_zone: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Attendee {
    pub email: String,
}

/// Blocking Google Calendar REST client, limited to inserting events on
/// the primary calendar.
pub struct CalendarClient {
    client: Client,
    auth: Arc<Mutex<GoogleAuthenticator>>,
    base_url: String,
}

impl CalendarClient {
    pub fn new(auth: Arc<Mutex<GoogleAuthenticator>>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            auth,
            base_url: "https://www.googleapis.com/calendar/v3".to_string(),
        }
    }
}

impl CalendarApi for CalendarClient {
    fn insert_event(&self, event: &Event) -> Result<String, GoogleApiError> {
        let token = self
            .auth
            .lock()
            .map_err(|_| GoogleApiError::LockPoisoned)?
            .access_token()?;

        let url = format!("{}/calendars/primary/events", self.base_url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", token))
            .json(event)
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
        let event_id = body["id"].as_str().unwrap_or_default().to_string();
        log::info!("📅 Calendar event created (id: {})", event_id);
        Ok(event_id)
    }
}
