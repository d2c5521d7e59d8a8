pub mod email;
pub mod meeting;

use crate::google::{CalendarApi, MailApi};
use crate::llm::intent::Intent;
use crate::llm::prompts::ResponseTemplates;
use crate::records::{ItemLog, ItemScope};
use serde_json::{Map, Value};

/// Result of an action handler: a success flag plus the message shown and
/// spoken to the user. Failures here are always handled, never propagated.
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub success: bool,
    pub message: String,
}

impl ActionOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Read a string parameter, treating non-strings as absent.
pub(crate) fn str_param<'a>(parameters: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    parameters.get(key).and_then(Value::as_str)
}

/// Route an extracted intent to its handler.
pub fn dispatch(
    intent: Intent,
    parameters: &Map<String, Value>,
    mail: &dyn MailApi,
    calendar: &dyn CalendarApi,
    items: &mut ItemLog,
    timezone: &str,
) -> ActionOutcome {
    match intent {
        Intent::SendEmail => email::send_email(parameters, mail, items),
        Intent::ScheduleMeeting => meeting::schedule_meeting(parameters, calendar, items, timezone),
        Intent::ShowItems => show_items(parameters, items),
        Intent::Unknown => ActionOutcome::failure(ResponseTemplates::capabilities()),
    }
}

/// Report counts and recent entries from the in-memory log. Makes no API
/// calls.
fn show_items(parameters: &Map<String, Value>, items: &ItemLog) -> ActionOutcome {
    let scope = ItemScope::from_str(str_param(parameters, "items_to_show").unwrap_or("both"));
    ActionOutcome::success(items.summary(scope))
}
