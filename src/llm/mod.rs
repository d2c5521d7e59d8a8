pub mod client;
pub mod intent;
pub mod prompts;

pub use client::{GroqClient, LlmError};
pub use intent::{fallback_intent, Intent, IntentExtractor, IntentResult};
