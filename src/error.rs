//! Error types for langtts

use crate::speech::{Language, VoiceInfo};
use std::io;
use thiserror::Error;

/// Main error type for langtts
#[derive(Error, Debug)]
pub enum LangTtsError {
    #[error("Speech engine initialization failed: {0}")]
    EngineInit(String),

    #[error("Text is not valid {encoding}")]
    Decode { encoding: &'static str },

    #[error("Text cannot be represented in {encoding}")]
    Encode { encoding: &'static str },

    #[error("No {language} voice found among {}", format_voices(.voices))]
    NoMatchingVoice {
        language: Language,
        voices: Vec<VoiceInfo>,
    },

    #[error("Unknown text encoding: {0}")]
    UnknownEncoding(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for langtts operations
pub type Result<T> = std::result::Result<T, LangTtsError>;

fn format_voices(voices: &[VoiceInfo]) -> String {
    let names: Vec<String> = voices.iter().map(|v| v.to_string()).collect();
    format!("[{}]", names.join(", "))
}
