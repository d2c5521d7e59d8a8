use super::client::{GroqClient, LlmError};
use super::prompts::{ResponseTemplates, SystemPrompts};
use serde::Deserialize;
use serde_json::{Map, Value};

/// The classified action a user utterance maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    SendEmail,
    ScheduleMeeting,
    ShowItems,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Structured result of intent extraction: the intent tag, the extracted
/// parameter mapping, and an optional clarification request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IntentResult {
    #[serde(default)]
    pub intent: Intent,
    #[serde(default)]
    pub parameters: Map<String, Value>,
    #[serde(default)]
    pub needs_clarification: bool,
    #[serde(default)]
    pub clarification_question: Option<String>,
}

impl IntentResult {
    fn new(intent: Intent) -> Self {
        Self {
            intent,
            ..Default::default()
        }
    }

    fn with_clarification(intent: Intent, question: &str) -> Self {
        Self {
            intent,
            needs_clarification: true,
            clarification_question: Some(question.to_string()),
            ..Default::default()
        }
    }

    fn show_items(scope: &str) -> Self {
        let mut parameters = Map::new();
        parameters.insert(
            "items_to_show".to_string(),
            Value::String(scope.to_string()),
        );
        Self {
            intent: Intent::ShowItems,
            parameters,
            ..Default::default()
        }
    }
}

fn contains_any(input: &str, words: &[&str]) -> bool {
    words.iter().any(|word| input.contains(word))
}

/// Deterministic keyword classifier used when the LLM call fails.
///
/// Never consults the remote service and never errors; always returns a
/// well-formed result. Show-words are checked first so "show my emails"
/// does not classify as a send.
pub fn fallback_intent(utterance: &str) -> IntentResult {
    let input = utterance.to_lowercase();

    if contains_any(&input, &["show", "list", "what", "view", "see"]) {
        if contains_any(&input, &["email", "mail"]) {
            return IntentResult::show_items("emails");
        }
        if contains_any(&input, &["meeting", "event", "calendar"]) {
            return IntentResult::show_items("meetings");
        }
        return IntentResult::show_items("both");
    }

    if contains_any(&input, &["email", "send", "mail"]) {
        return IntentResult::with_clarification(
            Intent::SendEmail,
            ResponseTemplates::email_clarification(),
        );
    }

    if contains_any(&input, &["meeting", "schedule", "calendar", "appointment"]) {
        return IntentResult::with_clarification(
            Intent::ScheduleMeeting,
            ResponseTemplates::meeting_clarification(),
        );
    }

    IntentResult::new(Intent::Unknown)
}

/// Maps utterances to structured action requests via the hosted LLM,
/// falling back to the keyword classifier on any failure.
pub struct IntentExtractor {
    client: GroqClient,
}

impl IntentExtractor {
    pub fn new(client: GroqClient) -> Self {
        Self { client }
    }

    pub fn extract(&self, utterance: &str) -> IntentResult {
        match self.extract_with_llm(utterance) {
            Ok(result) => result,
            Err(e) => {
                log::error!("❌ LLM processing error: {}", e);
                fallback_intent(utterance)
            }
        }
    }

    fn extract_with_llm(&self, utterance: &str) -> Result<IntentResult, LlmError> {
        let content = self
            .client
            .ask_with_system(SystemPrompts::intent_extraction(), utterance)?;

        serde_json::from_str(&content)
            .map_err(|e| LlmError::ParseError(format!("Invalid intent JSON: {}", e)))
    }
}
