use super::{str_param, ActionOutcome};
use crate::google::calendar::{Attendee, Event, EventTime};
use crate::google::CalendarApi;
use crate::records::{ItemLog, ScheduledMeeting};
use chrono::{DateTime, Duration, Local};
use chrono_english::{parse_date_string, Dialect};
use serde_json::{Map, Value};

/// Schedule a meeting through the calendar API.
///
/// The start time arrives as a natural-language phrase and is parsed by a
/// date-phrase library; an unparseable phrase is a handled failure that
/// names the original input. API errors are caught and surfaced, never
/// retried.
pub fn schedule_meeting(
    parameters: &Map<String, Value>,
    calendar: &dyn CalendarApi,
    items: &mut ItemLog,
    timezone: &str,
) -> ActionOutcome {
    let title = str_param(parameters, "title").unwrap_or("Meeting");
    let start_phrase = str_param(parameters, "start_time").unwrap_or("");
    let duration_raw = str_param(parameters, "duration").unwrap_or("1 hour");
    let description = str_param(parameters, "description").unwrap_or("");

    if start_phrase.trim().is_empty() {
        return ActionOutcome::failure("Meeting time is required");
    }

    let normalized = normalize_time_phrase(start_phrase);
    let start: DateTime<Local> = match parse_date_string(&normalized, Local::now(), Dialect::Us) {
        Ok(parsed) => parsed,
        Err(_) => {
            return ActionOutcome::failure(format!(
                "Could not understand the meeting time: {}",
                start_phrase
            ));
        }
    };

    let end = start + parse_duration(duration_raw);
    let attendees = attendee_param(parameters);

    let event = Event {
        summary: title.to_string(),
        description: description.to_string(),
        start: EventTime {
            date_time: start.format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: timezone.to_string(),
        },
        end: EventTime {
            date_time: end.format("%Y-%m-%dT%H:%M:%S").to_string(),
            time_zone: timezone.to_string(),
        },
        attendees: attendees
            .iter()
            .map(|email| Attendee {
                email: email.clone(),
            })
            .collect(),
    };

    match calendar.insert_event(&event) {
        Ok(_) => {
            items.record_meeting(ScheduledMeeting {
                title: title.to_string(),
                start_time: start.format("%Y-%m-%d %H:%M").to_string(),
                duration: duration_raw.to_string(),
                attendees,
                description: description.to_string(),
            });
            ActionOutcome::success(format!(
                "Meeting '{}' scheduled for {}",
                title,
                start.format("%A, %B %d at %I:%M %p")
            ))
        }
        Err(e) => {
            log::error!("❌ Meeting scheduling failed: {}", e);
            ActionOutcome::failure(format!("Failed to schedule meeting: {}", e))
        }
    }
}

/// Derive a duration from the extracted phrase: "hour" with an embedded
/// integer means that many hours (default 1), "minute" that many minutes
/// (default 30), anything else one hour.
pub fn parse_duration(raw: &str) -> Duration {
    let lower = raw.to_lowercase();
    if lower.contains("hour") {
        Duration::hours(first_integer(&lower).unwrap_or(1))
    } else if lower.contains("minute") {
        Duration::minutes(first_integer(&lower).unwrap_or(30))
    } else {
        Duration::hours(1)
    }
}

/// Strip connective words the date-phrase grammar does not accept, so
/// spoken phrases like "tomorrow at 2pm" parse as "tomorrow 2pm".
fn normalize_time_phrase(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .filter(|word| !matches!(word.to_lowercase().as_str(), "at" | "on"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// First contiguous run of digits, if any.
fn first_integer(input: &str) -> Option<i64> {
    let digits: String = input
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

/// Attendee emails from the parameter mapping, filtered to plausible
/// addresses. The extractor usually hands back a list, but a bare string
/// is tolerated.
fn attendee_param(parameters: &Map<String, Value>) -> Vec<String> {
    let raw = match parameters.get("attendees") {
        Some(Value::Array(values)) => values
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        Some(Value::String(single)) => vec![single.clone()],
        _ => Vec::new(),
    };

    raw.into_iter()
        .map(|email| email.trim().to_string())
        .filter(|email| email.contains('@'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::google::GoogleApiError;
    use serde_json::json;
    use std::cell::RefCell;

    struct FakeCalendar {
        inserted: RefCell<Vec<Event>>,
        fail_with: Option<String>,
    }

    impl FakeCalendar {
        fn working() -> Self {
            Self {
                inserted: RefCell::new(Vec::new()),
                fail_with: None,
            }
        }

        fn broken(message: &str) -> Self {
            Self {
                inserted: RefCell::new(Vec::new()),
                fail_with: Some(message.to_string()),
            }
        }
    }

    impl CalendarApi for FakeCalendar {
        fn insert_event(&self, event: &Event) -> Result<String, GoogleApiError> {
            if let Some(message) = &self.fail_with {
                return Err(GoogleApiError::Api {
                    status: 500,
                    message: message.clone(),
                });
            }
            self.inserted.borrow_mut().push(event.clone());
            Ok("evt-1".to_string())
        }
    }

    fn params(start_time: &str) -> Map<String, Value> {
        let mut parameters = Map::new();
        parameters.insert("title".to_string(), json!("Sync"));
        parameters.insert("start_time".to_string(), json!(start_time));
        parameters
    }

    #[test]
    fn test_duration_hours() {
        assert_eq!(parse_duration("2 hours"), Duration::hours(2));
        assert_eq!(parse_duration("1 hour"), Duration::hours(1));
    }

    #[test]
    fn test_duration_hours_without_digit_defaults_to_one() {
        assert_eq!(parse_duration("an hour"), Duration::hours(1));
    }

    #[test]
    fn test_duration_minutes() {
        assert_eq!(parse_duration("45 minutes"), Duration::minutes(45));
    }

    #[test]
    fn test_duration_minutes_without_digit_defaults_to_thirty() {
        assert_eq!(parse_duration("a few minutes"), Duration::minutes(30));
    }

    #[test]
    fn test_duration_other_phrasing_defaults_to_one_hour() {
        assert_eq!(parse_duration("all afternoon"), Duration::hours(1));
        assert_eq!(parse_duration(""), Duration::hours(1));
    }

    #[test]
    fn test_normalize_time_phrase() {
        assert_eq!(normalize_time_phrase("tomorrow at 2pm"), "tomorrow 2pm");
        assert_eq!(normalize_time_phrase("on friday at 9am"), "friday 9am");
        assert_eq!(normalize_time_phrase("next tuesday"), "next tuesday");
    }

    #[test]
    fn test_first_integer() {
        assert_eq!(first_integer("2 hours"), Some(2));
        assert_eq!(first_integer("meeting in 90 minutes"), Some(90));
        assert_eq!(first_integer("no digits here"), None);
    }

    #[test]
    fn test_missing_time_is_handled_failure() {
        let calendar = FakeCalendar::working();
        let mut items = ItemLog::new();

        let outcome = schedule_meeting(&Map::new(), &calendar, &mut items, "America/New_York");
        assert!(!outcome.success);
        assert_eq!(outcome.message, "Meeting time is required");
        assert!(calendar.inserted.borrow().is_empty());
    }

    #[test]
    fn test_unparseable_time_names_the_phrase() {
        let calendar = FakeCalendar::working();
        let mut items = ItemLog::new();

        let outcome = schedule_meeting(
            &params("when the stars align"),
            &calendar,
            &mut items,
            "America/New_York",
        );
        assert!(!outcome.success);
        assert!(outcome
            .message
            .contains("Could not understand the meeting time: when the stars align"));
        assert!(calendar.inserted.borrow().is_empty());
        assert_eq!(items.meeting_count(), 0);
    }

    #[test]
    fn test_successful_schedule_appends_record() {
        let calendar = FakeCalendar::working();
        let mut items = ItemLog::new();

        let outcome = schedule_meeting(
            &params("tomorrow at 2pm"),
            &calendar,
            &mut items,
            "America/New_York",
        );
        assert!(outcome.success, "unexpected failure: {}", outcome.message);
        assert!(outcome.message.contains("Meeting 'Sync' scheduled for"));
        assert!(outcome.message.contains("at 02:00 PM"));
        assert_eq!(items.meeting_count(), 1);

        let inserted = calendar.inserted.borrow();
        assert_eq!(inserted[0].summary, "Sync");
        assert_eq!(inserted[0].start.time_zone, "America/New_York");
        // Default duration is one hour
        assert!(inserted[0].start.date_time.contains("T14:00:00"));
        assert!(inserted[0].end.date_time.contains("T15:00:00"));
    }

    #[test]
    fn test_attendees_filtered_to_addresses() {
        let mut parameters = params("tomorrow at 9am");
        parameters.insert(
            "attendees".to_string(),
            json!(["john@company.com", "the whole team", " mary@company.com "]),
        );

        let calendar = FakeCalendar::working();
        let mut items = ItemLog::new();
        let outcome = schedule_meeting(&parameters, &calendar, &mut items, "America/New_York");
        assert!(outcome.success);

        let inserted = calendar.inserted.borrow();
        let emails: Vec<&str> = inserted[0]
            .attendees
            .iter()
            .map(|a| a.email.as_str())
            .collect();
        assert_eq!(emails, vec!["john@company.com", "mary@company.com"]);
    }

    #[test]
    fn test_api_failure_is_handled() {
        let calendar = FakeCalendar::broken("backend unavailable");
        let mut items = ItemLog::new();

        let outcome = schedule_meeting(
            &params("tomorrow at 2pm"),
            &calendar,
            &mut items,
            "America/New_York",
        );
        assert!(!outcome.success);
        assert!(outcome.message.contains("Failed to schedule meeting"));
        assert!(outcome.message.contains("backend unavailable"));
        assert_eq!(items.meeting_count(), 0);
    }
}
