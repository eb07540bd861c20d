//! Utterance dispatch: decode, pick a voice, speak and wait

use super::voice::select_voice;
use super::{Language, SpeechEngine};
use crate::{LangTtsError, Result};
use encoding_rs::Encoding;
use log::debug;
use std::fmt;

/// Encoding label assumed for incoming utterance bytes
pub const DEFAULT_ENCODING: &str = "gb2312";

/// Labels that name GB2312 itself rather than GBK
const GB2312_LABELS: &[&str] = &[
    "chinese",
    "csgb2312",
    "csiso58gb231280",
    "gb2312",
    "gb_2312",
    "gb_2312-80",
    "iso-ir-58",
];

/// Speaks byte-encoded utterances through a borrowed engine
#[derive(Clone, Copy)]
pub struct Dispatcher {
    encoding: &'static Encoding,
    /// Restrict the GBK codec to the GB2312 repertoire
    gb2312_only: bool,
}

impl Dispatcher {
    /// Dispatcher for text in the encoding named by `label`
    ///
    /// Labels follow the WHATWG Encoding Standard. GB2312 labels resolve to
    /// the GBK codec, but bytes outside GB2312 are still rejected.
    pub fn new(label: &str) -> Result<Self> {
        let label = label.trim();
        let encoding = Encoding::for_label(label.as_bytes())
            .ok_or_else(|| LangTtsError::UnknownEncoding(label.to_string()))?;
        let gb2312_only = GB2312_LABELS.contains(&label.to_ascii_lowercase().as_str());
        debug!(
            "Utterance encoding: {} (label {}, gb2312 only: {})",
            encoding.name(),
            label,
            gb2312_only
        );
        Ok(Self {
            encoding,
            gb2312_only,
        })
    }

    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Name reported in decode and encode errors
    pub fn encoding_name(&self) -> &'static str {
        if self.gb2312_only {
            "GB2312"
        } else {
            self.encoding.name()
        }
    }

    /// Decode utterance bytes, rejecting malformed input
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        let err = LangTtsError::Decode {
            encoding: self.encoding_name(),
        };
        if self.gb2312_only && !is_gb2312(bytes) {
            return Err(err);
        }

        let text = self
            .encoding
            .decode_without_bom_handling_and_without_replacement(bytes)
            .ok_or(err)?;
        if self.gb2312_only && text.chars().any(is_private_use) {
            return Err(LangTtsError::Decode {
                encoding: self.encoding_name(),
            });
        }
        Ok(text.into_owned())
    }

    /// Encode text into this dispatcher's encoding
    ///
    /// Fails if any character has no representation in the encoding.
    pub fn encode(&self, text: &str) -> Result<Vec<u8>> {
        let (bytes, _, had_errors) = self.encoding.encode(text);
        if had_errors || (self.gb2312_only && !is_gb2312(&bytes)) {
            return Err(LangTtsError::Encode {
                encoding: self.encoding_name(),
            });
        }
        Ok(bytes.into_owned())
    }

    /// Decode `bytes`, switch voice for `lang` and speak, blocking until done
    ///
    /// `lang` 0 selects English, 1 Chinese; any other code keeps the current
    /// voice. Nothing is queued if decoding or voice selection fails.
    pub fn say_bytes<E>(&self, engine: &mut E, bytes: &[u8], lang: i32) -> Result<()>
    where
        E: SpeechEngine + ?Sized,
    {
        let text = self.decode(bytes)?;
        self.say_text(engine, &text, Language::from_code(lang))
    }

    /// Speak already-decoded text, optionally switching voice first
    pub fn say_text<E>(&self, engine: &mut E, text: &str, language: Option<Language>) -> Result<()>
    where
        E: SpeechEngine + ?Sized,
    {
        match language {
            Some(language) => {
                select_voice(engine, language)?;
            }
            None => debug!("No language requested, keeping current voice"),
        }

        engine.say(text)?;
        engine.run_and_wait()
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self {
            encoding: encoding_rs::GBK,
            gb2312_only: true,
        }
    }
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("encoding", &self.encoding_name())
            .finish()
    }
}

/// Check that `bytes` only holds ASCII and GB2312 double-byte codes
///
/// GB2312 lead bytes run 0xA1-0xF7 and trail bytes 0xA1-0xFE. Rows
/// 0xAA-0xAF are unassigned.
fn is_gb2312(bytes: &[u8]) -> bool {
    let mut iter = bytes.iter();
    while let Some(&lead) = iter.next() {
        if lead.is_ascii() {
            continue;
        }
        if !(0xA1..=0xF7).contains(&lead) || (0xAA..=0xAF).contains(&lead) {
            return false;
        }
        match iter.next() {
            Some(&trail) if (0xA1..=0xFE).contains(&trail) => {}
            _ => return false,
        }
    }
    true
}

/// GBK maps unassigned GB2312 cells into the private use area
fn is_private_use(c: char) -> bool {
    ('\u{E000}'..='\u{F8FF}').contains(&c)
}

/// Speak gb2312 bytes through `engine`, selecting a voice for `lang`
///
/// `lang` 0 is English, 1 is Chinese, anything else keeps the active voice.
/// Blocks until playback finishes.
pub fn say_by_engine<E>(engine: &mut E, to_say: &[u8], lang: i32) -> Result<()>
where
    E: SpeechEngine + ?Sized,
{
    Dispatcher::default().say_bytes(engine, to_say, lang)
}

/// Print a value to stdout
pub fn debug_print(value: impl fmt::Display) {
    println!("{}", value);
}
