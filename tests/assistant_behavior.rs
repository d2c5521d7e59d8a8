use serde_json::{json, Map, Value};
use std::cell::RefCell;

use voice_workspace::actions;
use voice_workspace::google::calendar::Event;
use voice_workspace::google::{CalendarApi, GoogleApiError, MailApi};
use voice_workspace::llm::intent::{fallback_intent, Intent};
use voice_workspace::records::ItemLog;

const TZ: &str = "America/New_York";

#[derive(Default)]
struct FakeMail {
    sent: RefCell<usize>,
}

impl MailApi for FakeMail {
    fn send_raw(&self, _raw_message: &[u8]) -> Result<String, GoogleApiError> {
        *self.sent.borrow_mut() += 1;
        Ok(format!("msg-{}", self.sent.borrow()))
    }
}

#[derive(Default)]
struct FakeCalendar {
    inserted: RefCell<Vec<Event>>,
}

impl CalendarApi for FakeCalendar {
    fn insert_event(&self, event: &Event) -> Result<String, GoogleApiError> {
        self.inserted.borrow_mut().push(event.clone());
        Ok("evt-1".to_string())
    }
}

fn email_params(to: &str) -> Map<String, Value> {
    let mut parameters = Map::new();
    parameters.insert("to_email".to_string(), json!(to));
    parameters.insert("subject".to_string(), json!("Status"));
    parameters.insert("body".to_string(), json!("All green."));
    parameters
}

fn meeting_params(title: &str, start_time: &str) -> Map<String, Value> {
    let mut parameters = Map::new();
    parameters.insert("title".to_string(), json!(title));
    parameters.insert("start_time".to_string(), json!(start_time));
    parameters
}

#[test]
fn utterances_without_keywords_fall_back_to_unknown() {
    for utterance in [
        "turn off the lights",
        "play some music",
        "how is the weather",
        "",
    ] {
        let result = fallback_intent(utterance);
        assert_eq!(result.intent, Intent::Unknown, "utterance: {:?}", utterance);
    }
}

#[test]
fn fallback_send_email_carries_fixed_clarification() {
    let result = fallback_intent("send an email");
    assert_eq!(result.intent, Intent::SendEmail);
    assert!(result.needs_clarification);
    assert_eq!(
        result.clarification_question.as_deref(),
        Some("I understand you want to send an email. Please tell me the recipient, subject, and message content.")
    );
}

#[test]
fn invalid_recipient_never_reaches_mail_client() {
    let mail = FakeMail::default();
    let calendar = FakeCalendar::default();
    let mut items = ItemLog::new();

    let outcome = actions::dispatch(
        Intent::SendEmail,
        &email_params("not-an-email"),
        &mail,
        &calendar,
        &mut items,
        TZ,
    );

    assert!(!outcome.success);
    assert_eq!(outcome.message, "Valid recipient email address is required");
    assert_eq!(*mail.sent.borrow(), 0);
    assert_eq!(items.email_count(), 0);
}

#[test]
fn scheduling_with_resolvable_phrase_confirms_with_weekday() {
    let mail = FakeMail::default();
    let calendar = FakeCalendar::default();
    let mut items = ItemLog::new();

    let outcome = actions::dispatch(
        Intent::ScheduleMeeting,
        &meeting_params("Sync", "tomorrow at 2pm"),
        &mail,
        &calendar,
        &mut items,
        TZ,
    );

    assert!(outcome.success, "unexpected failure: {}", outcome.message);
    assert!(outcome.message.contains("Sync"));
    // Confirmation carries a weekday name and a 12-hour time
    assert!(outcome.message.contains("at 02:00 PM"));
    assert_eq!(items.meeting_count(), 1);

    // Duration defaulted to one hour
    let inserted = calendar.inserted.borrow();
    assert!(inserted[0].start.date_time.contains("T14:00:00"));
    assert!(inserted[0].end.date_time.contains("T15:00:00"));
    assert_eq!(inserted[0].start.time_zone, TZ);
}

#[test]
fn show_items_reports_counts_and_last_five() {
    let mail = FakeMail::default();
    let calendar = FakeCalendar::default();
    let mut items = ItemLog::new();

    for i in 0..7 {
        let outcome = actions::dispatch(
            Intent::SendEmail,
            &email_params(&format!("user{}@example.com", i)),
            &mail,
            &calendar,
            &mut items,
            TZ,
        );
        assert!(outcome.success);
    }
    for i in 0..2 {
        let outcome = actions::dispatch(
            Intent::ScheduleMeeting,
            &meeting_params(&format!("Planning {}", i), "friday 9am"),
            &mail,
            &calendar,
            &mut items,
            TZ,
        );
        assert!(outcome.success, "unexpected failure: {}", outcome.message);
    }

    let mut parameters = Map::new();
    parameters.insert("items_to_show".to_string(), json!("both"));
    let outcome = actions::dispatch(
        Intent::ShowItems,
        &parameters,
        &mail,
        &calendar,
        &mut items,
        TZ,
    );

    assert!(outcome.success);
    assert!(outcome.message.contains("You've sent 7 emails:"));
    assert!(outcome.message.contains("You've scheduled 2 meetings:"));
    // At most the last five emails are listed
    assert!(!outcome.message.contains("user1@example.com"));
    assert!(outcome.message.contains("user2@example.com"));
    assert!(outcome.message.contains("user6@example.com"));
    // Show-items made no further API calls
    assert_eq!(*mail.sent.borrow(), 7);
    assert_eq!(calendar.inserted.borrow().len(), 2);
}

#[test]
fn unknown_intent_reports_capabilities() {
    let mail = FakeMail::default();
    let calendar = FakeCalendar::default();
    let mut items = ItemLog::new();

    let outcome = actions::dispatch(
        Intent::Unknown,
        &Map::new(),
        &mail,
        &calendar,
        &mut items,
        TZ,
    );

    assert!(!outcome.success);
    assert!(outcome
        .message
        .contains("I can help you send emails, schedule meetings, or show your recent items"));
}
