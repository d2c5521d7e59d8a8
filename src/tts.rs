use thiserror::Error;
use tts::Tts;

#[derive(Error, Debug)]
pub enum TtsInitError {
    #[error("Speech engine initialization failed: {0}")]
    Init(String),
}

#[derive(Debug, Clone)]
pub struct SpeechConfig {
    /// Fraction of the platform's normal speaking rate.
    pub rate_scale: f32,
    /// Fraction of the maximum volume.
    pub volume_scale: f32,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate_scale: 0.9,
            volume_scale: 0.8,
        }
    }
}

/// Wrapper around the platform-native speech synthesizer.
///
/// Synthesis failures are never fatal: the assistant always shows its
/// response in the GUI, so a broken speech backend only loses the audio.
pub struct SpeechEngine {
    engine: Tts,
}

impl SpeechEngine {
    pub fn new(config: SpeechConfig) -> Result<Self, TtsInitError> {
        let mut engine = Tts::default().map_err(|e| TtsInitError::Init(e.to_string()))?;

        // Rate and volume support varies by backend; configure best-effort.
        let features = engine.supported_features();
        if features.rate {
            let rate = engine.normal_rate() * config.rate_scale;
            if let Err(e) = engine.set_rate(rate) {
                log::warn!("Could not set speech rate: {}", e);
            }
        }
        if features.volume {
            let volume = engine.max_volume() * config.volume_scale;
            if let Err(e) = engine.set_volume(volume) {
                log::warn!("Could not set speech volume: {}", e);
            }
        }

        Ok(Self { engine })
    }

    /// Speak the text, interrupting anything still being spoken.
    pub fn speak(&mut self, text: &str) {
        log::info!("🤖 Assistant: {}", text);
        if let Err(e) = self.engine.speak(text, true) {
            log::warn!("Speech synthesis failed: {}", e);
        }
    }
}
