use secrecy::{ExposeSecret, SecretBox};
use std::env;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid API key format for {service}: {reason}")]
    InvalidKeyFormat { service: String, reason: String },
    #[error("Environment error: {0}")]
    EnvError(#[from] env::VarError),
}

/// Runtime settings: the LLM/STT API key plus the two local file paths the
/// Google auth flow needs. Everything comes from the environment (with a
/// `.env` file honored in development); there are no command-line flags.
#[derive(Debug)]
pub struct Settings {
    pub groq_key: SecretBox<String>,
    pub credentials_file: PathBuf,
    pub token_file: PathBuf,
    pub timezone: String,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (for development)
        dotenvy::dotenv().ok();

        let groq_key = Self::load_api_key("GROQ_API_KEY", "Groq")?;

        let credentials_file = env::var("GOOGLE_CREDENTIALS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("credentials.json"));
        let token_file = env::var("GOOGLE_TOKEN_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("token.json"));
        let timezone =
            env::var("ASSISTANT_TIMEZONE").unwrap_or_else(|_| "America/New_York".to_string());

        Ok(Self {
            groq_key,
            credentials_file,
            token_file,
            timezone,
        })
    }

    /// Load and validate a single API key from environment
    fn load_api_key(env_var: &str, service_name: &str) -> Result<SecretBox<String>, ConfigError> {
        let key = env::var(env_var).map_err(|_| ConfigError::MissingEnvVar(env_var.to_string()))?;

        if key.trim().is_empty() {
            return Err(ConfigError::InvalidKeyFormat {
                service: service_name.to_string(),
                reason: "API key cannot be empty".to_string(),
            });
        }

        Self::validate_key_format(&key, service_name)?;

        Ok(SecretBox::new(Box::new(key)))
    }

    /// Validate API key format for each service
    fn validate_key_format(key: &str, service: &str) -> Result<(), ConfigError> {
        match service {
            "Groq" => {
                // Groq keys typically start with "gsk_"
                if !key.starts_with("gsk_") {
                    return Err(ConfigError::InvalidKeyFormat {
                        service: service.to_string(),
                        reason: "Groq keys should start with 'gsk_'".to_string(),
                    });
                }
            }
            _ => {}
        }
        Ok(())
    }

    /// Get Groq API key (use only when making API calls)
    pub fn groq_key(&self) -> &str {
        self.groq_key.expose_secret()
    }
}

/// Load settings with helpful error messages for development
pub fn load_settings() -> Result<Settings, ConfigError> {
    match Settings::load() {
        Ok(settings) => {
            log::info!("Successfully loaded configuration");
            Ok(settings)
        }
        Err(ConfigError::MissingEnvVar(var)) => {
            log::error!("Missing required environment variable: {}", var);
            log::error!("Create a .env file in the project root with:");
            log::error!("{}=your_api_key_here", var);
            Err(ConfigError::MissingEnvVar(var))
        }
        Err(e) => {
            log::error!("Configuration error: {}", e);
            Err(e)
        }
    }
}
