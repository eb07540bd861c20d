//! Speech engine abstraction
//!
//! The dispatcher never owns an engine. Callers create one (usually with
//! [`init_tts_engine`]) and lend it to each operation.

use super::backends::native::NativeEngine;
use super::VoiceInfo;
use crate::Result;

/// Operations the dispatcher needs from a text-to-speech engine
pub trait SpeechEngine {
    /// Installed voices, in the engine's enumeration order
    fn voices(&self) -> Result<Vec<VoiceInfo>>;

    /// Make the voice with this id the active one
    fn set_voice(&mut self, id: &str) -> Result<()>;

    /// Queue text for speaking with the active voice
    fn say(&mut self, text: &str) -> Result<()>;

    /// Block until everything queued has finished playing
    fn run_and_wait(&mut self) -> Result<()>;
}

impl<E: SpeechEngine + ?Sized> SpeechEngine for Box<E> {
    fn voices(&self) -> Result<Vec<VoiceInfo>> {
        (**self).voices()
    }

    fn set_voice(&mut self, id: &str) -> Result<()> {
        (**self).set_voice(id)
    }

    fn say(&mut self, text: &str) -> Result<()> {
        (**self).say(text)
    }

    fn run_and_wait(&mut self) -> Result<()> {
        (**self).run_and_wait()
    }
}

/// Create the platform speech engine with default settings
///
/// Fails with [`LangTtsError::EngineInit`](crate::LangTtsError::EngineInit)
/// when no speech subsystem is reachable, e.g. speech-dispatcher is not
/// installed on Linux.
pub fn init_tts_engine() -> Result<NativeEngine> {
    NativeEngine::new()
}
