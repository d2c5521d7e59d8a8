use crossbeam_channel::RecvTimeoutError;
use std::collections::VecDeque;
use std::io::Cursor;
use std::time::{Duration, Instant};
use thiserror::Error;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};

#[derive(Error, Debug)]
pub enum CaptureError {
    #[error("No default input device available")]
    NoInputDevice,
    #[error("Audio device error: {0}")]
    Device(String),
    #[error("Unsupported sample format: {0}")]
    UnsupportedFormat(String),
    #[error("Audio stream stalled: no data from input device")]
    Stalled,
    #[error("WAV encoding error: {0}")]
    Encode(#[from] hound::Error),
}

#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Ambient noise sampling window before listening begins.
    pub ambient_window: Duration,
    /// Maximum wait for speech to begin.
    pub start_timeout: Duration,
    /// Maximum phrase length once speech has begun.
    pub max_phrase: Duration,
    /// Trailing silence that ends the phrase.
    pub trailing_silence: Duration,
    /// Speech threshold = ambient mean RMS times this factor, floored.
    pub threshold_multiplier: f32,
    pub threshold_floor: f32,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ambient_window: Duration::from_millis(500),
            start_timeout: Duration::from_secs(15),
            max_phrase: Duration::from_secs(20),
            trailing_silence: Duration::from_millis(800),
            threshold_multiplier: 2.5,
            threshold_floor: 0.01,
        }
    }
}

/// Outcome of one microphone activation, before speech recognition.
#[derive(Debug)]
pub enum CapturedUtterance {
    /// Mono 16-bit WAV bytes at the device sample rate.
    Speech(Vec<u8>),
    /// No speech began within the start timeout.
    NoSpeech,
}

/// Single-utterance microphone capture with an energy gate.
///
/// Each call opens the default input device, calibrates against ambient
/// noise, waits for speech, records until trailing silence or the phrase
/// cap, and returns the utterance as WAV bytes. Blocking by design; always
/// run on the worker thread.
pub struct MicrophoneCapture {
    config: CaptureConfig,
}

impl MicrophoneCapture {
    pub fn new(config: CaptureConfig) -> Self {
        Self { config }
    }

    pub fn capture_utterance(&self) -> Result<CapturedUtterance, CaptureError> {
        let host = cpal::default_host();
        let device = host
            .default_input_device()
            .ok_or(CaptureError::NoInputDevice)?;

        let supported = device
            .default_input_config()
            .map_err(|e| CaptureError::Device(e.to_string()))?;
        let sample_rate = supported.sample_rate().0;
        let channels = supported.channels() as usize;

        log::debug!(
            "Input device: {} ch @ {} Hz, {:?}",
            channels,
            sample_rate,
            supported.sample_format()
        );

        let (chunk_tx, chunk_rx) = crossbeam_channel::unbounded::<Vec<f32>>();
        let err_fn = |e: cpal::StreamError| log::error!("❌ Input stream error: {}", e);

        let stream_config: cpal::StreamConfig = supported.config();
        let stream = match supported.sample_format() {
            cpal::SampleFormat::F32 => {
                let tx = chunk_tx.clone();
                device
                    .build_input_stream(
                        &stream_config,
                        move |data: &[f32], _| {
                            let _ = tx.send(data.to_vec());
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| CaptureError::Device(e.to_string()))?
            }
            cpal::SampleFormat::I16 => {
                let tx = chunk_tx.clone();
                device
                    .build_input_stream(
                        &stream_config,
                        move |data: &[i16], _| {
                            let samples = data.iter().map(|&s| s as f32 / 32768.0).collect();
                            let _ = tx.send(samples);
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| CaptureError::Device(e.to_string()))?
            }
            cpal::SampleFormat::U16 => {
                let tx = chunk_tx.clone();
                device
                    .build_input_stream(
                        &stream_config,
                        move |data: &[u16], _| {
                            let samples = data
                                .iter()
                                .map(|&s| (s as f32 - 32768.0) / 32768.0)
                                .collect();
                            let _ = tx.send(samples);
                        },
                        err_fn,
                        None,
                    )
                    .map_err(|e| CaptureError::Device(e.to_string()))?
            }
            other => {
                return Err(CaptureError::UnsupportedFormat(format!("{:?}", other)));
            }
        };

        // The stream's callback holds the only live sender from here on
        drop(chunk_tx);

        stream
            .play()
            .map_err(|e| CaptureError::Device(e.to_string()))?;

        let result = self.run_capture_loop(&chunk_rx, channels, sample_rate);
        drop(stream);

        let samples = match result? {
            Some(samples) => samples,
            None => return Ok(CapturedUtterance::NoSpeech),
        };

        let wav = encode_wav(&samples, sample_rate)?;
        log::debug!(
            "Captured {:.1}s of speech ({} bytes WAV)",
            samples.len() as f32 / sample_rate as f32,
            wav.len()
        );
        Ok(CapturedUtterance::Speech(wav))
    }

    /// Drain chunks from the stream through the three phases: calibrate,
    /// wait for speech, record until trailing silence or the phrase cap.
    fn run_capture_loop(
        &self,
        chunk_rx: &crossbeam_channel::Receiver<Vec<f32>>,
        channels: usize,
        sample_rate: u32,
    ) -> Result<Option<Vec<f32>>, CaptureError> {
        let recv_timeout = Duration::from_millis(250);

        // Phase 1: ambient noise calibration
        let calibration_start = Instant::now();
        let mut ambient_rms = Vec::new();
        while calibration_start.elapsed() < self.config.ambient_window {
            match chunk_rx.recv_timeout(recv_timeout) {
                Ok(chunk) => ambient_rms.push(rms(&downmix(&chunk, channels))),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Err(CaptureError::Stalled),
            }
        }
        let ambient_mean = if ambient_rms.is_empty() {
            0.0
        } else {
            ambient_rms.iter().sum::<f32>() / ambient_rms.len() as f32
        };
        let threshold =
            (ambient_mean * self.config.threshold_multiplier).max(self.config.threshold_floor);
        log::debug!(
            "Ambient RMS {:.4}, speech threshold {:.4}",
            ambient_mean,
            threshold
        );

        // Phase 2: wait for speech to begin, keeping a short pre-roll so the
        // first syllable is not clipped
        let preroll_chunks = 8;
        let mut preroll: VecDeque<Vec<f32>> = VecDeque::with_capacity(preroll_chunks);
        let wait_start = Instant::now();
        let mut stalled_since = Instant::now();
        let first_chunk = loop {
            if wait_start.elapsed() > self.config.start_timeout {
                return Ok(None);
            }
            match chunk_rx.recv_timeout(recv_timeout) {
                Ok(chunk) => {
                    stalled_since = Instant::now();
                    let mono = downmix(&chunk, channels);
                    if rms(&mono) > threshold {
                        break mono;
                    }
                    if preroll.len() == preroll_chunks {
                        preroll.pop_front();
                    }
                    preroll.push_back(mono);
                }
                Err(RecvTimeoutError::Timeout) => {
                    if stalled_since.elapsed() > Duration::from_secs(3) {
                        return Err(CaptureError::Stalled);
                    }
                }
                Err(RecvTimeoutError::Disconnected) => return Err(CaptureError::Stalled),
            }
        };

        // Phase 3: record until trailing silence or the phrase cap
        let mut samples: Vec<f32> = preroll.into_iter().flatten().collect();
        samples.extend_from_slice(&first_chunk);
        let phrase_start = Instant::now();
        let mut last_speech = Instant::now();
        let max_samples = (self.config.max_phrase.as_secs() as usize + 1) * sample_rate as usize;

        loop {
            if phrase_start.elapsed() > self.config.max_phrase || samples.len() > max_samples {
                log::debug!("Phrase cap reached after {:?}", phrase_start.elapsed());
                break;
            }
            if last_speech.elapsed() > self.config.trailing_silence {
                log::debug!("Trailing silence, ending phrase");
                break;
            }
            match chunk_rx.recv_timeout(recv_timeout) {
                Ok(chunk) => {
                    let mono = downmix(&chunk, channels);
                    if rms(&mono) > threshold {
                        last_speech = Instant::now();
                    }
                    samples.extend_from_slice(&mono);
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => return Err(CaptureError::Stalled),
            }
        }

        Ok(Some(samples))
    }
}

/// Average interleaved frames down to mono.
fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}

fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Encode mono f32 samples as 16-bit PCM WAV.
fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, hound::Error> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let sample_i16 = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
            writer.write_sample(sample_i16)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CaptureConfig::default();
        assert_eq!(config.ambient_window, Duration::from_millis(500));
        assert_eq!(config.start_timeout, Duration::from_secs(15));
        assert_eq!(config.max_phrase, Duration::from_secs(20));
    }

    #[test]
    fn test_downmix_stereo() {
        let interleaved = vec![0.5, -0.5, 1.0, 0.0];
        let mono = downmix(&interleaved, 2);
        assert_eq!(mono, vec![0.0, 0.5]);
    }

    #[test]
    fn test_downmix_mono_passthrough() {
        let samples = vec![0.1, 0.2, 0.3];
        assert_eq!(downmix(&samples, 1), samples);
    }

    #[test]
    fn test_rms() {
        assert_eq!(rms(&[]), 0.0);
        assert_eq!(rms(&[0.0, 0.0]), 0.0);
        let value = rms(&[0.5, -0.5]);
        assert!((value - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_encode_wav_header_and_length() {
        let samples = vec![0.0f32; 160];
        let wav = encode_wav(&samples, 16000).unwrap();
        // RIFF header plus 2 bytes per sample
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(wav.len(), 44 + samples.len() * 2);
    }

    #[test]
    fn test_encode_wav_clamps_out_of_range() {
        let samples = vec![2.0f32, -2.0f32];
        let wav = encode_wav(&samples, 16000).unwrap();
        let last = i16::from_le_bytes([wav[wav.len() - 2], wav[wav.len() - 1]]);
        assert_eq!(last, -i16::MAX);
    }
}
