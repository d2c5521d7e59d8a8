use chrono::Local;

/// A successfully sent email, tracked for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct SentEmail {
    pub to: String,
    pub subject: String,
    pub body: String,
    pub timestamp: String,
}

impl SentEmail {
    pub fn new(to: &str, subject: &str, body: &str) -> Self {
        Self {
            to: to.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
            timestamp: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}

/// A successfully scheduled meeting, tracked for the lifetime of the process.
#[derive(Debug, Clone)]
pub struct ScheduledMeeting {
    pub title: String,
    pub start_time: String,
    pub duration: String,
    pub attendees: Vec<String>,
    pub description: String,
}

/// Which category of items a show request covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemScope {
    Emails,
    Meetings,
    Both,
}

impl ItemScope {
    pub fn from_str(value: &str) -> Self {
        match value {
            "emails" => ItemScope::Emails,
            "meetings" => ItemScope::Meetings,
            _ => ItemScope::Both,
        }
    }

    fn includes_emails(self) -> bool {
        matches!(self, ItemScope::Emails | ItemScope::Both)
    }

    fn includes_meetings(self) -> bool {
        matches!(self, ItemScope::Meetings | ItemScope::Both)
    }
}

/// In-memory, append-only log of what the assistant has done this session.
/// Nothing is persisted; both lists reset on restart. Only the GUI thread
/// touches this.
#[derive(Debug, Default)]
pub struct ItemLog {
    sent_emails: Vec<SentEmail>,
    scheduled_meetings: Vec<ScheduledMeeting>,
}

/// How many recent entries a summary lists per category.
const SUMMARY_LIMIT: usize = 5;

impl ItemLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_email(&mut self, email: SentEmail) {
        self.sent_emails.push(email);
    }

    pub fn record_meeting(&mut self, meeting: ScheduledMeeting) {
        self.scheduled_meetings.push(meeting);
    }

    pub fn email_count(&self) -> usize {
        self.sent_emails.len()
    }

    pub fn meeting_count(&self) -> usize {
        self.scheduled_meetings.len()
    }

    /// Format counts and the most recent entries for the requested scope.
    pub fn summary(&self, scope: ItemScope) -> String {
        let mut response = String::new();

        if scope.includes_emails() {
            if self.sent_emails.is_empty() {
                response.push_str("No emails sent yet.\n");
            } else {
                response.push_str(&format!(
                    "You've sent {} emails:\n",
                    self.sent_emails.len()
                ));
                let start = self.sent_emails.len().saturating_sub(SUMMARY_LIMIT);
                for (i, email) in self.sent_emails[start..].iter().enumerate() {
                    response.push_str(&format!(
                        "{}. To: {} - {}\n",
                        i + 1,
                        email.to,
                        email.subject
                    ));
                }
            }
        }

        if scope.includes_meetings() {
            if self.scheduled_meetings.is_empty() {
                response.push_str("No meetings scheduled yet.\n");
            } else {
                response.push_str(&format!(
                    "You've scheduled {} meetings:\n",
                    self.scheduled_meetings.len()
                ));
                let start = self.scheduled_meetings.len().saturating_sub(SUMMARY_LIMIT);
                for (i, meeting) in self.scheduled_meetings[start..].iter().enumerate() {
                    response.push_str(&format!(
                        "{}. {} at {}\n",
                        i + 1,
                        meeting.title,
                        meeting.start_time
                    ));
                }
            }
        }

        if response.is_empty() {
            "No items to show.".to_string()
        } else {
            response
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meeting(title: &str) -> ScheduledMeeting {
        ScheduledMeeting {
            title: title.to_string(),
            start_time: "2026-03-02 14:00".to_string(),
            duration: "1 hour".to_string(),
            attendees: vec![],
            description: String::new(),
        }
    }

    #[test]
    fn test_scope_parsing() {
        assert_eq!(ItemScope::from_str("emails"), ItemScope::Emails);
        assert_eq!(ItemScope::from_str("meetings"), ItemScope::Meetings);
        assert_eq!(ItemScope::from_str("both"), ItemScope::Both);
        assert_eq!(ItemScope::from_str("anything else"), ItemScope::Both);
    }

    #[test]
    fn test_empty_log_summary() {
        let log = ItemLog::new();
        let summary = log.summary(ItemScope::Both);
        assert!(summary.contains("No emails sent yet."));
        assert!(summary.contains("No meetings scheduled yet."));
    }

    #[test]
    fn test_summary_reports_counts() {
        let mut log = ItemLog::new();
        for i in 0..3 {
            log.record_email(SentEmail::new(
                &format!("user{}@example.com", i),
                "Update",
                "body",
            ));
        }
        log.record_meeting(meeting("Sync"));

        let summary = log.summary(ItemScope::Both);
        assert!(summary.contains("You've sent 3 emails:"));
        assert!(summary.contains("You've scheduled 1 meetings:"));
        assert!(summary.contains("To: user2@example.com - Update"));
        assert!(summary.contains("Sync at 2026-03-02 14:00"));
    }

    #[test]
    fn test_summary_lists_at_most_five() {
        let mut log = ItemLog::new();
        for i in 0..8 {
            log.record_email(SentEmail::new(
                &format!("user{}@example.com", i),
                "Update",
                "body",
            ));
        }

        let summary = log.summary(ItemScope::Emails);
        assert!(summary.contains("You've sent 8 emails:"));
        // Only the last five entries appear
        assert!(!summary.contains("user2@example.com"));
        assert!(summary.contains("user3@example.com"));
        assert!(summary.contains("user7@example.com"));
    }

    #[test]
    fn test_scoped_summary_omits_other_category() {
        let mut log = ItemLog::new();
        log.record_meeting(meeting("Standup"));

        let summary = log.summary(ItemScope::Emails);
        assert!(summary.contains("No emails sent yet."));
        assert!(!summary.contains("Standup"));
    }
}
