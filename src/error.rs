use thiserror::Error;

pub type Result<T> = std::result::Result<T, AssistantError>;

/// Startup-time failures. Runtime failures are handled where they occur
/// and surfaced to the user as messages, never propagated as this type.
#[derive(Error, Debug)]
pub enum AssistantError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Authentication error: {0}")]
    Auth(#[from] crate::google::auth::AuthError),

    #[error("Speech engine error: {0}")]
    Speech(String),

    #[error("GUI error: {0}")]
    Gui(String),
}
