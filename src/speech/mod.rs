//! Speech system: engines, voice selection and dispatch

pub mod backends;
pub mod dispatch;
pub mod engine;
pub mod queue;
pub mod voice;

pub use backends::native::NativeEngine;
pub use backends::recording::RecordingEngine;
pub use dispatch::{debug_print, say_by_engine, Dispatcher, DEFAULT_ENCODING};
pub use engine::{init_tts_engine, SpeechEngine};
pub use queue::{VoiceMessage, VoiceQueue};
pub use voice::{find_voice, select_voice, Language, VoiceInfo};
