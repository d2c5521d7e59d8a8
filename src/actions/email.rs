use super::{str_param, ActionOutcome};
use crate::google::gmail::build_plain_text_message;
use crate::google::MailApi;
use crate::records::{ItemLog, SentEmail};
use serde_json::{Map, Value};

/// Send a plain-text email through the mail API.
///
/// A missing or invalid recipient is a handled failure; the mail client is
/// not invoked. API errors are caught and surfaced, never retried.
pub fn send_email(
    parameters: &Map<String, Value>,
    mail: &dyn MailApi,
    items: &mut ItemLog,
) -> ActionOutcome {
    let to_email = str_param(parameters, "to_email").unwrap_or("");
    let subject = str_param(parameters, "subject").unwrap_or("No subject");
    let body = str_param(parameters, "body").unwrap_or("");

    if to_email.is_empty() || !to_email.contains('@') {
        return ActionOutcome::failure("Valid recipient email address is required");
    }

    let raw = build_plain_text_message(to_email, subject, body);
    match mail.send_raw(&raw) {
        Ok(_) => {
            items.record_email(SentEmail::new(to_email, subject, body));
            ActionOutcome::success(format!("Email sent successfully to {}", to_email))
        }
        Err(e) => {
            log::error!("❌ Email send failed: {}", e);
            ActionOutcome::failure(format!("Failed to send email: {}", e))
        }
    }
}
