//! Native TTS backend using the tts crate
//!
//! The `tts` crate gives one interface over:
//! - Speech Dispatcher on Linux
//! - AVFoundation on macOS/iOS
//! - WinRT / SAPI on Windows

use crate::config::SpeechConfig;
use crate::speech::{SpeechEngine, VoiceInfo};
use crate::{LangTtsError, Result};
use log::{debug, error, warn};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};
use tts::{Tts as TtsCrate, UtteranceId};

/// Default interval between "still speaking?" checks
pub const DEFAULT_WAIT_POLL: Duration = Duration::from_millis(100);

/// Default time allowed for queued speech to start playing
pub const DEFAULT_START_TIMEOUT: Duration = Duration::from_secs(2);

/// Platform speech engine backed by the tts crate
pub struct NativeEngine {
    tts: TtsCrate,

    /// Utterances queued by `say` that have not finished yet
    pending: Vec<UtteranceId>,

    /// Ids of finished or stopped utterances, when the backend reports them
    finished: Option<Receiver<UtteranceId>>,

    /// True if `say` queued speech that has no id to wait on
    untracked: bool,

    /// How often `run_and_wait` asks the backend whether it is done
    wait_poll: Duration,

    /// How long polling waits for queued speech to start
    start_timeout: Duration,
}

impl NativeEngine {
    /// Create a native engine with default settings
    pub fn new() -> Result<Self> {
        debug!("Creating native TTS engine");

        let tts = TtsCrate::default().map_err(|e| {
            error!("Failed to initialize TTS: {}", e);
            LangTtsError::EngineInit(e.to_string())
        })?;

        let finished = Self::watch_utterances(&tts);
        debug!(
            "Native TTS engine created successfully (utterance callbacks: {})",
            finished.is_some()
        );

        Ok(Self {
            tts,
            pending: Vec::new(),
            finished,
            untracked: false,
            wait_poll: DEFAULT_WAIT_POLL,
            start_timeout: DEFAULT_START_TIMEOUT,
        })
    }

    /// Route utterance end and stop callbacks into a channel
    fn watch_utterances(tts: &TtsCrate) -> Option<Receiver<UtteranceId>> {
        if !tts.supported_features().utterance_callbacks {
            return None;
        }

        let (end_tx, rx) = mpsc::channel();
        let stop_tx = end_tx.clone();
        let registered = tts
            .on_utterance_end(Some(Box::new(move |id: UtteranceId| {
                let _ = end_tx.send(id);
            })))
            .and_then(|_| {
                tts.on_utterance_stop(Some(Box::new(move |id: UtteranceId| {
                    let _ = stop_tx.send(id);
                })))
            });

        match registered {
            Ok(()) => Some(rx),
            Err(e) => {
                warn!("Failed to register utterance callbacks: {}", e);
                None
            }
        }
    }

    /// Create a native engine and apply rate, volume and polling settings
    pub fn with_config(config: &SpeechConfig) -> Result<Self> {
        let mut engine = Self::new()?;
        engine.wait_poll = config.wait_poll;
        engine.start_timeout = config.start_timeout;

        if let Some(rate) = config.rate {
            engine.set_rate(rate)?;
        }
        if let Some(volume) = config.volume {
            engine.set_volume(volume)?;
        }

        Ok(engine)
    }

    /// Set speech rate on a 0-100 scale spread over the backend's range
    pub fn set_rate(&mut self, rate: u8) -> Result<()> {
        debug!("Setting rate to {}", rate);

        let features = self.tts.supported_features();
        if !features.rate {
            warn!("Rate control not supported on this platform");
            return Ok(());
        }

        let converted = scale_percent(rate, self.tts.min_rate(), self.tts.max_rate());
        self.tts
            .set_rate(converted)
            .map_err(|e| LangTtsError::Speech(format!("Failed to set rate: {}", e)))?;

        Ok(())
    }

    /// Set speech volume on a 0-100 scale spread over the backend's range
    pub fn set_volume(&mut self, volume: u8) -> Result<()> {
        debug!("Setting volume to {}", volume);

        let features = self.tts.supported_features();
        if !features.volume {
            warn!("Volume control not supported on this platform");
            return Ok(());
        }

        let converted = scale_percent(volume, self.tts.min_volume(), self.tts.max_volume());
        self.tts
            .set_volume(converted)
            .map_err(|e| LangTtsError::Speech(format!("Failed to set volume: {}", e)))?;

        Ok(())
    }
}

impl SpeechEngine for NativeEngine {
    fn voices(&self) -> Result<Vec<VoiceInfo>> {
        let voices = self
            .tts
            .voices()
            .map_err(|e| LangTtsError::Speech(format!("Failed to get voices: {}", e)))?;

        Ok(voices
            .iter()
            .map(|v| VoiceInfo::new(v.id(), v.name(), [v.language().to_string()]))
            .collect())
    }

    fn set_voice(&mut self, id: &str) -> Result<()> {
        debug!("Setting voice to {}", id);

        let voices = self
            .tts
            .voices()
            .map_err(|e| LangTtsError::Speech(format!("Failed to get voices: {}", e)))?;

        let voice = voices
            .iter()
            .find(|v| v.id() == id)
            .ok_or_else(|| LangTtsError::Speech(format!("Voice {} is not installed", id)))?;

        self.tts
            .set_voice(voice)
            .map_err(|e| LangTtsError::Speech(format!("Failed to set voice: {}", e)))?;

        Ok(())
    }

    fn say(&mut self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }

        debug!("Speaking: {}", text);
        let id = self.tts.speak(text, false).map_err(|e| {
            error!("Failed to speak: {}", e);
            LangTtsError::Speech(format!("Speak failed: {}", e))
        })?;

        match (id, &self.finished) {
            (Some(id), Some(_)) => self.pending.push(id),
            _ => self.untracked = true,
        }

        Ok(())
    }

    fn run_and_wait(&mut self) -> Result<()> {
        if let Some(finished) = &self.finished {
            wait_for_utterances(&mut self.pending, finished)?;
        }

        if std::mem::take(&mut self.untracked) {
            if !self.tts.supported_features().is_speaking {
                warn!("Backend cannot report speaking state, not waiting");
                return Ok(());
            }

            let tts = &self.tts;
            wait_for_playback(
                || {
                    tts.is_speaking().map_err(|e| {
                        LangTtsError::Speech(format!("Failed to query speech: {}", e))
                    })
                },
                self.wait_poll,
                self.start_timeout,
            )?;
        }

        debug!("Speech queue drained");
        Ok(())
    }
}

/// Block until every id in `pending` has been reported on `finished`
///
/// Ids that are not pending (left over from earlier utterances) are ignored.
fn wait_for_utterances<T: PartialEq>(pending: &mut Vec<T>, finished: &Receiver<T>) -> Result<()> {
    while !pending.is_empty() {
        let id = finished
            .recv()
            .map_err(|_| LangTtsError::Speech("Utterance callbacks disconnected".to_string()))?;
        pending.retain(|p| *p != id);
    }
    Ok(())
}

/// Poll until speech has started and then stopped
///
/// Backends queue speech asynchronously, so "not speaking" right after
/// queueing means "not started yet". Waiting for the start is bounded by
/// `start_timeout` so an utterance that never plays cannot hang the caller.
fn wait_for_playback<F>(mut is_speaking: F, poll: Duration, start_timeout: Duration) -> Result<()>
where
    F: FnMut() -> Result<bool>,
{
    let queued = Instant::now();
    while !is_speaking()? {
        if queued.elapsed() >= start_timeout {
            warn!("Speech did not start within {:?}", start_timeout);
            return Ok(());
        }
        thread::sleep(poll);
    }

    while is_speaking()? {
        thread::sleep(poll);
    }
    Ok(())
}

/// Map a 0-100 value onto `min..=max`
fn scale_percent(percent: u8, min: f32, max: f32) -> f32 {
    let percent = percent.min(100) as f32 / 100.0;
    min + (max - min) * percent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_engine() {
        // Fails without speech-dispatcher or in CI without audio
        match NativeEngine::new() {
            Ok(_) => println!("✓ Native TTS engine initialized successfully"),
            Err(e) => println!("⚠ TTS initialization failed (may be expected in CI): {}", e),
        }
    }

    #[test]
    fn test_scale_percent() {
        assert_eq!(scale_percent(0, 0.5, 2.0), 0.5);
        assert_eq!(scale_percent(100, 0.5, 2.0), 2.0);
        assert_eq!(scale_percent(50, 0.0, 1.0), 0.5);
        assert_eq!(scale_percent(200, 0.0, 1.0), 1.0);
    }

    #[test]
    fn test_wait_for_utterances_ignores_stale_ids() {
        let (tx, rx) = mpsc::channel();
        let mut pending = vec![1, 2];
        tx.send(7).unwrap();
        tx.send(2).unwrap();
        tx.send(1).unwrap();

        wait_for_utterances(&mut pending, &rx).unwrap();
        assert!(pending.is_empty());
    }

    #[test]
    fn test_wait_for_utterances_blocks_until_end_arrives() {
        let (tx, rx) = mpsc::channel();
        let mut pending = vec![3];
        let sender = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            tx.send(3).unwrap();
        });

        wait_for_utterances(&mut pending, &rx).unwrap();
        assert!(pending.is_empty());
        sender.join().unwrap();
    }

    #[test]
    fn test_wait_for_utterances_disconnected() {
        let (tx, rx) = mpsc::channel::<u32>();
        drop(tx);
        let mut pending = vec![1];
        assert!(wait_for_utterances(&mut pending, &rx).is_err());
    }

    #[test]
    fn test_wait_for_playback_waits_for_start() {
        // Not started, not started, playing, playing, done
        let mut states = vec![false, false, true, true, false].into_iter();
        let mut polls = 0;
        wait_for_playback(
            || {
                polls += 1;
                Ok(states.next().unwrap_or(false))
            },
            Duration::from_millis(1),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(polls, 5);
    }

    #[test]
    fn test_wait_for_playback_gives_up_if_never_started() {
        let started = Instant::now();
        wait_for_playback(
            || Ok(false),
            Duration::from_millis(1),
            Duration::from_millis(20),
        )
        .unwrap();
        assert!(started.elapsed() >= Duration::from_millis(20));
    }

    #[test]
    fn test_voices_have_ids() {
        if let Ok(engine) = NativeEngine::new() {
            if let Ok(voices) = engine.voices() {
                assert!(voices.iter().all(|v| !v.id.is_empty()));
            }
        }
    }
}
