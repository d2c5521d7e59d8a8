pub mod capture;

pub use capture::{CaptureConfig, CaptureError, CapturedUtterance, MicrophoneCapture};

use crate::stt::GroqStt;

/// Result of one listening activation, marshaled back to the GUI thread.
///
/// The three non-utterance variants are terminal for the activation: the GUI
/// turns listening off and speaks an apology, with no automatic retry.
#[derive(Debug, Clone)]
pub enum CaptureOutcome {
    /// A recognized utterance, lowercased.
    Utterance(String),
    /// No speech began within the wait window.
    Timeout,
    /// Speech was captured but not recognized.
    Unknown,
    /// Device or recognition failure.
    Error(String),
}

/// Capture a single utterance from the microphone and transcribe it.
///
/// Runs on the worker thread: both the microphone read and the
/// speech-to-text round trip block here, never on the GUI thread.
pub fn listen_once(stt: &GroqStt, config: CaptureConfig) -> CaptureOutcome {
    log::info!("🎤 Listening... Speak now!");

    let capture = MicrophoneCapture::new(config);
    let utterance = match capture.capture_utterance() {
        Ok(CapturedUtterance::Speech(wav)) => wav,
        Ok(CapturedUtterance::NoSpeech) => {
            log::info!("⏰ No speech detected before timeout");
            return CaptureOutcome::Timeout;
        }
        Err(e) => {
            log::error!("❌ Audio capture failed: {}", e);
            return CaptureOutcome::Error(e.to_string());
        }
    };

    match stt.transcribe(&utterance) {
        Ok(text) => {
            let text = text.trim().to_lowercase();
            if text.is_empty() {
                log::info!("🔇 Speech was not recognized");
                CaptureOutcome::Unknown
            } else {
                log::info!("🗣️ You said: {}", text);
                CaptureOutcome::Utterance(text)
            }
        }
        Err(e) => {
            log::error!("❌ Speech recognition error: {}", e);
            CaptureOutcome::Error(e.to_string())
        }
    }
}
