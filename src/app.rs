use crate::actions;
use crate::audio::{self, CaptureConfig, CaptureOutcome};
use crate::google::{CalendarApi, MailApi};
use crate::llm::intent::{Intent, IntentExtractor};
use crate::llm::prompts::ResponseTemplates;
use crate::records::{ItemLog, ItemScope};
use crate::stt::GroqStt;
use crate::tts::SpeechEngine;
use crossbeam_channel::{Receiver, TryRecvError};
use eframe::egui;
use std::time::Duration;

/// The desktop shell: one listening toggle, three quick-action buttons, a
/// status line, and two read-only panes.
///
/// Exactly one worker thread exists per listening activation; it captures
/// and transcribes, then hands a single `CaptureOutcome` over the channel.
/// Everything after that (intent extraction, dispatch, display, speech)
/// runs here on the GUI thread and blocks it for the round trip, so there
/// is never more than one command in flight.
pub struct AssistantApp {
    status: String,
    command_text: String,
    response_text: String,
    listening: bool,
    capture_rx: Option<Receiver<CaptureOutcome>>,
    groq_key: String,
    extractor: IntentExtractor,
    speech: SpeechEngine,
    mail: Box<dyn MailApi>,
    calendar: Box<dyn CalendarApi>,
    items: ItemLog,
    timezone: String,
}

impl AssistantApp {
    pub fn new(
        extractor: IntentExtractor,
        speech: SpeechEngine,
        mail: Box<dyn MailApi>,
        calendar: Box<dyn CalendarApi>,
        groq_key: String,
        timezone: String,
    ) -> Self {
        Self {
            status: "Ready to assist you!".to_string(),
            command_text: String::new(),
            response_text: String::new(),
            listening: false,
            capture_rx: None,
            groq_key,
            extractor,
            speech,
            mail,
            calendar,
            items: ItemLog::new(),
            timezone,
        }
    }

    fn set_status(&mut self, message: &str) {
        self.status = message.to_string();
    }

    /// Show the response in the pane and speak it.
    fn respond(&mut self, text: &str) {
        self.response_text = text.to_string();
        self.speech.speak(text);
    }

    fn toggle_listening(&mut self) {
        if self.listening {
            self.stop_listening();
        } else {
            self.start_listening();
        }
    }

    /// Spawn the capture worker for one activation.
    fn start_listening(&mut self) {
        let (outcome_tx, outcome_rx) = crossbeam_channel::bounded(1);
        let api_key = self.groq_key.clone();

        std::thread::spawn(move || {
            let stt = GroqStt::new(api_key);
            let outcome = audio::listen_once(&stt, CaptureConfig::default());
            // The GUI may have stopped listening and dropped the receiver
            let _ = outcome_tx.send(outcome);
        });

        self.capture_rx = Some(outcome_rx);
        self.listening = true;
        self.set_status("Listening... Speak now!");
    }

    /// Turn the listening state off. The worker is not interrupted; a
    /// result arriving after this is discarded with the dropped receiver.
    fn stop_listening(&mut self) {
        self.listening = false;
        self.capture_rx = None;
        self.set_status("Ready");
    }

    /// Drain the capture channel; a received outcome drives the whole
    /// process-command path.
    fn poll_capture(&mut self) {
        let Some(outcome_rx) = &self.capture_rx else {
            return;
        };

        match outcome_rx.try_recv() {
            Ok(outcome) => {
                self.capture_rx = None;
                self.process_outcome(outcome);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                log::error!("❌ Capture worker exited without a result");
                self.capture_rx = None;
                self.respond(ResponseTemplates::capture_error());
                self.stop_listening();
            }
        }
    }

    fn process_outcome(&mut self, outcome: CaptureOutcome) {
        match outcome {
            CaptureOutcome::Timeout => {
                self.respond(ResponseTemplates::listen_timeout());
                self.stop_listening();
            }
            CaptureOutcome::Unknown => {
                self.respond(ResponseTemplates::speech_not_recognized());
                self.stop_listening();
            }
            CaptureOutcome::Error(reason) => {
                log::error!("❌ Capture failed: {}", reason);
                self.respond(ResponseTemplates::capture_error());
                self.stop_listening();
            }
            CaptureOutcome::Utterance(command) => {
                self.command_text = command.clone();
                self.set_status("Processing your command...");
                self.process_command(&command);
                self.stop_listening();
            }
        }
    }

    fn process_command(&mut self, command: &str) {
        let result = self.extractor.extract(command);
        log::info!("Intent: {:?}", result.intent);

        if result.needs_clarification {
            let question = result
                .clarification_question
                .unwrap_or_else(|| ResponseTemplates::capabilities().to_string());
            self.respond(&question);
            return;
        }

        if result.intent == Intent::Unknown {
            self.respond(ResponseTemplates::capabilities());
            return;
        }

        let outcome = actions::dispatch(
            result.intent,
            &result.parameters,
            self.mail.as_ref(),
            self.calendar.as_ref(),
            &mut self.items,
            &self.timezone,
        );
        self.respond(&outcome.message);
    }

    /// The first two quick actions only emit spoken instructions; Show
    /// Items reads the in-memory log directly.
    fn quick_action(&mut self, intent: Intent) {
        match intent {
            Intent::SendEmail => self.respond(ResponseTemplates::email_guidance()),
            Intent::ScheduleMeeting => self.respond(ResponseTemplates::meeting_guidance()),
            _ => {
                let summary = self.items.summary(ItemScope::Both);
                self.respond(&summary);
            }
        }
    }
}

impl eframe::App for AssistantApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_capture();

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.add_space(8.0);
                ui.heading("Voice Workspace Assistant");
                ui.add_space(8.0);
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.label(format!("Status: {}", self.status));
            ui.separator();

            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Voice Control").strong());
                ui.add_space(4.0);
                let label = if self.listening {
                    "🔴 Stop Listening"
                } else {
                    "🎤 Start Listening"
                };
                if ui
                    .add_sized([220.0, 40.0], egui::Button::new(label))
                    .clicked()
                {
                    self.toggle_listening();
                }
            });

            ui.add_space(8.0);
            ui.label(egui::RichText::new("Last Command:").strong());
            ui.add(
                egui::TextEdit::multiline(&mut self.command_text)
                    .desired_rows(3)
                    .desired_width(f32::INFINITY)
                    .interactive(false),
            );

            ui.add_space(8.0);
            ui.label(egui::RichText::new("Assistant Response:").strong());
            ui.add(
                egui::TextEdit::multiline(&mut self.response_text)
                    .desired_rows(8)
                    .desired_width(f32::INFINITY)
                    .interactive(false),
            );

            ui.add_space(12.0);
            ui.vertical_centered(|ui| {
                ui.label(egui::RichText::new("Quick Actions").strong());
                ui.add_space(4.0);
                ui.horizontal(|ui| {
                    if ui.button("Send Email").clicked() {
                        self.quick_action(Intent::SendEmail);
                    }
                    if ui.button("Schedule Meeting").clicked() {
                        self.quick_action(Intent::ScheduleMeeting);
                    }
                    if ui.button("Show Items").clicked() {
                        self.quick_action(Intent::ShowItems);
                    }
                });
            });
        });

        // Keep polling while a capture worker is live
        if self.capture_rx.is_some() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }
    }
}
