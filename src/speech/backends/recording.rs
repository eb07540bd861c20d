//! In-memory engine that plays nothing and records what it was asked to do
//!
//! Useful for headless runs (`--dry-run`) and for exercising the dispatcher
//! against a scripted voice list.

use crate::speech::{SpeechEngine, VoiceInfo};
use crate::{LangTtsError, Result};
use log::debug;

/// A state-changing call made against a [`RecordingEngine`]
///
/// Voice list queries are not recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    SetVoice(String),
    Say(String),
    RunAndWait,
}

/// Engine with a fixed voice list that logs calls instead of speaking
#[derive(Debug, Default)]
pub struct RecordingEngine {
    voices: Vec<VoiceInfo>,
    active_voice: Option<String>,
    pending: Vec<String>,
    spoken: Vec<String>,
    calls: Vec<EngineCall>,
}

impl RecordingEngine {
    pub fn new(voices: Vec<VoiceInfo>) -> Self {
        Self {
            voices,
            ..Self::default()
        }
    }

    /// Start with `id` already active
    pub fn with_active_voice(mut self, id: impl Into<String>) -> Self {
        self.active_voice = Some(id.into());
        self
    }

    pub fn active_voice(&self) -> Option<&str> {
        self.active_voice.as_deref()
    }

    /// Text queued with `say` but not yet run
    pub fn pending(&self) -> &[String] {
        &self.pending
    }

    /// Text that has been "played" by `run_and_wait`
    pub fn spoken(&self) -> &[String] {
        &self.spoken
    }

    pub fn calls(&self) -> &[EngineCall] {
        &self.calls
    }
}

impl SpeechEngine for RecordingEngine {
    fn voices(&self) -> Result<Vec<VoiceInfo>> {
        Ok(self.voices.clone())
    }

    fn set_voice(&mut self, id: &str) -> Result<()> {
        if !self.voices.iter().any(|v| v.id == id) {
            return Err(LangTtsError::Speech(format!("Voice {} is not installed", id)));
        }
        self.calls.push(EngineCall::SetVoice(id.to_string()));
        self.active_voice = Some(id.to_string());
        Ok(())
    }

    fn say(&mut self, text: &str) -> Result<()> {
        self.calls.push(EngineCall::Say(text.to_string()));
        self.pending.push(text.to_string());
        Ok(())
    }

    fn run_and_wait(&mut self) -> Result<()> {
        self.calls.push(EngineCall::RunAndWait);
        for text in self.pending.drain(..) {
            debug!(
                "[{}] {}",
                self.active_voice.as_deref().unwrap_or("default"),
                text
            );
            self.spoken.push(text);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_and_wait_moves_pending_to_spoken() {
        let mut engine = RecordingEngine::default();
        engine.say("one").unwrap();
        engine.say("two").unwrap();
        assert_eq!(engine.pending(), &["one", "two"]);

        engine.run_and_wait().unwrap();
        assert!(engine.pending().is_empty());
        assert_eq!(engine.spoken(), &["one", "two"]);
    }

    #[test]
    fn test_set_unknown_voice_fails() {
        let mut engine = RecordingEngine::new(vec![VoiceInfo::new("a", "A", ["en"])]);
        assert!(engine.set_voice("b").is_err());
        assert_eq!(engine.active_voice(), None);
        assert!(engine.set_voice("a").is_ok());
        assert_eq!(engine.active_voice(), Some("a"));
    }
}
