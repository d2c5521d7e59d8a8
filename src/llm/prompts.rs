// System prompts for intent extraction

pub struct SystemPrompts;

impl SystemPrompts {
    /// Fixed instruction prompt for mapping an utterance to a structured
    /// action request.
    pub fn intent_extraction() -> &'static str {
        "You are a helpful AI assistant that manages emails and calendar events.
Analyze the user's command and extract parameters for email or meeting creation.

Return a JSON object with:
- intent: \"send_email\", \"schedule_meeting\", \"show_items\", \"unknown\"
- parameters: object with extracted details
- needs_clarification: boolean
- clarification_question: string if clarification needed

For emails, extract:
- to_email: recipient email address
- subject: email subject
- body: email content

For meetings, extract:
- title: meeting title
- start_time: in natural language
- duration: meeting duration (default to 1 hour if not specified)
- attendees: list of email addresses
- description: meeting description

For showing items (when user says \"show my emails\", \"what meetings do I have\", etc.):
- items_to_show: \"emails\", \"meetings\", or \"both\"

Use natural language processing for times. If email domain is not specified, use @company.com as default."
    }
}

pub struct ResponseTemplates;

impl ResponseTemplates {
    /// Spoken when no speech began before the wait window closed.
    pub fn listen_timeout() -> &'static str {
        "I didn't hear anything. Please try again when you're ready."
    }

    /// Spoken when speech was captured but not recognized.
    pub fn speech_not_recognized() -> &'static str {
        "I couldn't understand what you said. Please try again."
    }

    /// Spoken on a device or recognition failure.
    pub fn capture_error() -> &'static str {
        "Sorry, something went wrong while listening. Please try again."
    }

    /// Spoken for an utterance that maps to no known intent.
    pub fn capabilities() -> &'static str {
        "I can help you send emails, schedule meetings, or show your recent items. What would you like to do?"
    }

    /// Quick-action guidance for the Send Email button.
    pub fn email_guidance() -> &'static str {
        "Please use voice command to send an email. Say something like 'Send an email to John about the project update'."
    }

    /// Quick-action guidance for the Schedule Meeting button.
    pub fn meeting_guidance() -> &'static str {
        "Please use voice command to schedule a meeting. Say something like 'Schedule a meeting with the team tomorrow at 2 PM'."
    }

    /// Fallback clarification for an email intent with no parameters.
    pub fn email_clarification() -> &'static str {
        "I understand you want to send an email. Please tell me the recipient, subject, and message content."
    }

    /// Fallback clarification for a meeting intent with no parameters.
    pub fn meeting_clarification() -> &'static str {
        "I understand you want to schedule a meeting. Please tell me the time, title, and any attendees."
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intent_extraction_prompt() {
        let prompt = SystemPrompts::intent_extraction();
        assert!(prompt.contains("send_email"));
        assert!(prompt.contains("schedule_meeting"));
        assert!(prompt.contains("show_items"));
        assert!(prompt.contains("needs_clarification"));
    }
}
