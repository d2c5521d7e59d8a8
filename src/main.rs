use std::sync::{Arc, Mutex};

use eframe::egui;
use voice_workspace::app::AssistantApp;
use voice_workspace::config;
use voice_workspace::error::AssistantError;
use voice_workspace::google::{CalendarClient, GmailClient, GoogleAuthenticator};
use voice_workspace::llm::{GroqClient, IntentExtractor};
use voice_workspace::tts::{SpeechConfig, SpeechEngine};

fn main() -> voice_workspace::Result<()> {
    // Initialize logging
    env_logger::init();
    log::info!("🚀 Starting Voice Workspace Assistant");

    let settings = match config::load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("❌ Configuration error: {}", e);
            eprintln!("   Set GROQ_API_KEY (and optionally GOOGLE_CREDENTIALS_FILE,");
            eprintln!("   GOOGLE_TOKEN_FILE, ASSISTANT_TIMEZONE) in the environment or .env");
            return Err(e.into());
        }
    };

    // Authenticate before the window opens; failures here are fatal
    let authenticator =
        GoogleAuthenticator::bootstrap(&settings.credentials_file, &settings.token_file).map_err(
            |e| {
                eprintln!("❌ Google authentication failed: {}", e);
                eprintln!("   Download OAuth client credentials from the Google Cloud Console");
                eprintln!("   and place them at {}", settings.credentials_file.display());
                e
            },
        )?;
    let auth = Arc::new(Mutex::new(authenticator));

    let mail = GmailClient::new(Arc::clone(&auth));
    let calendar = CalendarClient::new(Arc::clone(&auth));
    let extractor = IntentExtractor::new(GroqClient::new(settings.groq_key().to_string()));

    let speech = SpeechEngine::new(SpeechConfig::default())
        .map_err(|e| AssistantError::Speech(e.to_string()))?;

    let app = AssistantApp::new(
        extractor,
        speech,
        Box::new(mail),
        Box::new(calendar),
        settings.groq_key().to_string(),
        settings.timezone.clone(),
    );

    log::info!("✅ Initialized, opening window");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([800.0, 600.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Voice Workspace Assistant",
        options,
        Box::new(move |_cc| Ok(Box::new(app))),
    )
    .map_err(|e| AssistantError::Gui(e.to_string()))?;

    Ok(())
}
