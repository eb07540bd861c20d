//! Speech engine backends

// Native TTS backend using the tts crate (cross-platform)
pub mod native;

// Silent backend that records calls
pub mod recording;
