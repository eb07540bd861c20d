//! langtts - language-aware text-to-speech
//!
//! Picks an English or Chinese voice from the platform TTS engine and
//! speaks gb2312-encoded text with it, blocking until playback finishes.

pub mod config;
pub mod error;
pub mod speech;

pub use error::{LangTtsError, Result};
pub use speech::{debug_print, init_tts_engine, say_by_engine, Language, SpeechEngine, VoiceInfo};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "langtts";
