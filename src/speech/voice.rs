//! Voice descriptors and language-based voice selection

use crate::speech::SpeechEngine;
use crate::{LangTtsError, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::fmt;

/// One installed synthetic voice as reported by the engine
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    /// Language tags in the order the engine reports them
    pub languages: Vec<String>,
}

impl VoiceInfo {
    pub fn new<I, S>(id: impl Into<String>, name: impl Into<String>, languages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: name.into(),
            languages: languages.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for VoiceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}) [{}]", self.name, self.id, self.languages.join(", "))
    }
}

/// Language whose voice-matching policy should be applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Language {
    English,
    Chinese,
}

impl Language {
    /// Map a raw selector code to a language
    ///
    /// 0 is English and 1 is Chinese. Every other code means "keep the
    /// current voice", so it maps to `None`.
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Language::English),
            1 => Some(Language::Chinese),
            _ => None,
        }
    }

    /// Selector code for this language
    pub fn code(self) -> i32 {
        match self {
            Language::English => 0,
            Language::Chinese => 1,
        }
    }

    /// Substrings that identify this language in a voice's display name
    fn name_hints(self) -> &'static [&'static str] {
        match self {
            Language::English => &["english"],
            Language::Chinese => &["chinese", "mandarin"],
        }
    }

    /// Does a language tag belong to this language?
    ///
    /// Chinese needs the exact `zh-CN` tag, English accepts any tag
    /// starting with `en`. Underscores count as hyphens and case is ignored.
    pub fn matches_tag(self, tag: &str) -> bool {
        let tag = tag.replace('_', "-").to_ascii_lowercase();
        match self {
            Language::English => tag.starts_with("en"),
            Language::Chinese => tag == "zh-cn",
        }
    }

    /// Does this voice satisfy the tag rule or the name rule?
    pub fn matches_voice(self, voice: &VoiceInfo) -> bool {
        voice.languages.iter().any(|tag| self.matches_tag(tag)) || self.matches_name(&voice.name)
    }

    /// Does a voice display name mention this language?
    pub fn matches_name(self, name: &str) -> bool {
        let name = name.to_lowercase();
        self.name_hints().iter().any(|hint| name.contains(hint))
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Language::English => write!(f, "English"),
            Language::Chinese => write!(f, "Chinese"),
        }
    }
}

/// Find the voice for `language` without touching the engine
///
/// Each voice is checked against the tag rule, then the name rule; the
/// earliest voice satisfying either one wins.
pub fn find_voice(voices: &[VoiceInfo], language: Language) -> Option<&VoiceInfo> {
    voices.iter().find(|v| language.matches_voice(v))
}

/// Select and activate the voice for `language`
///
/// Voices are enumerated fresh from the engine on every call. When nothing
/// matches, the error carries the whole scanned list and the active voice
/// is left alone.
pub fn select_voice<E>(engine: &mut E, language: Language) -> Result<VoiceInfo>
where
    E: SpeechEngine + ?Sized,
{
    let voices = engine.voices()?;
    debug!("Scanning {} voices for {}", voices.len(), language);

    let voice = match find_voice(&voices, language) {
        Some(voice) => voice.clone(),
        None => {
            return Err(LangTtsError::NoMatchingVoice { language, voices });
        }
    };

    engine.set_voice(&voice.id)?;
    info!("Selected {} voice: {}", language, voice);
    Ok(voice)
}
