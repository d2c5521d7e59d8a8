pub mod auth;
pub mod calendar;
pub mod gmail;

pub use auth::GoogleAuthenticator;
pub use calendar::CalendarClient;
pub use gmail::GmailClient;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum GoogleApiError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },
    #[error("Authentication error: {0}")]
    Auth(#[from] auth::AuthError),
    #[error("Response parsing error: {0}")]
    Parse(String),
    #[error("Authenticator lock poisoned")]
    LockPoisoned,
}

/// Seam over the mail-send API so action handlers can be exercised with
/// in-memory doubles.
pub trait MailApi {
    /// Submit a raw RFC 2822 message; returns the created message id.
    fn send_raw(&self, raw_message: &[u8]) -> Result<String, GoogleApiError>;
}

/// Seam over the calendar event-insert API.
pub trait CalendarApi {
    /// Insert an event on the primary calendar; returns the created event id.
    fn insert_event(&self, event: &calendar::Event) -> Result<String, GoogleApiError>;
}
