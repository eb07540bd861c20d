//! Queue of voice messages waiting to be spoken

use super::{Dispatcher, SpeechEngine};
use crate::Result;
use log::debug;
use std::collections::VecDeque;

/// One pending utterance: legacy-encoded bytes plus a language code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceMessage {
    pub bytes: Vec<u8>,
    pub lang: i32,
}

/// FIFO of voice messages with a mute switch
///
/// Nothing plays until the owner calls [`VoiceQueue::drain`].
#[derive(Debug, Default)]
pub struct VoiceQueue {
    messages: VecDeque<VoiceMessage>,
    muted: bool,
}

impl VoiceQueue {
    /// Create a new empty, unmuted queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a message for later
    pub fn push(&mut self, bytes: impl Into<Vec<u8>>, lang: i32) {
        self.messages.push_back(VoiceMessage {
            bytes: bytes.into(),
            lang,
        });
    }

    pub fn set_mute(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Speak every queued message in order, blocking on each one
    ///
    /// While muted, messages are discarded instead of spoken. The first
    /// failure stops the drain; the failed message is dropped and the rest
    /// stay queued. Returns how many messages were spoken.
    pub fn drain<E>(&mut self, engine: &mut E, dispatcher: &Dispatcher) -> Result<usize>
    where
        E: SpeechEngine + ?Sized,
    {
        debug!("Draining voice queue: {} messages", self.messages.len());

        let mut spoken = 0;
        while let Some(message) = self.messages.pop_front() {
            if self.muted {
                debug!("Muted, dropping message");
                continue;
            }
            dispatcher.say_bytes(engine, &message.bytes, message.lang)?;
            spoken += 1;
        }

        Ok(spoken)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::speech::backends::recording::RecordingEngine;
    use crate::speech::VoiceInfo;

    fn engine() -> RecordingEngine {
        RecordingEngine::new(vec![
            VoiceInfo::new("zira", "Microsoft Zira", ["en-US"]),
            VoiceInfo::new("huihui", "Microsoft Huihui", ["zh-CN"]),
        ])
    }

    #[test]
    fn test_new_queue() {
        let queue = VoiceQueue::new();
        assert!(queue.is_empty());
        assert!(!queue.is_muted());
    }

    #[test]
    fn test_drain_in_order() {
        let mut queue = VoiceQueue::new();
        queue.push(b"first".to_vec(), 0);
        queue.push(&[0xC4, 0xE3, 0xBA, 0xC3][..], 1);
        queue.push(b"third".to_vec(), 7);
        assert_eq!(queue.len(), 3);

        let mut engine = engine();
        let spoken = queue.drain(&mut engine, &Dispatcher::default()).unwrap();

        assert_eq!(spoken, 3);
        assert!(queue.is_empty());
        assert_eq!(engine.spoken(), &["first", "你好", "third"]);
        // Code 7 keeps whatever voice the previous message chose
        assert_eq!(engine.active_voice(), Some("huihui"));
    }

    #[test]
    fn test_muted_drain_discards() {
        let mut queue = VoiceQueue::new();
        queue.push(b"hello".to_vec(), 0);
        queue.set_mute(true);

        let mut engine = engine();
        let spoken = queue.drain(&mut engine, &Dispatcher::default()).unwrap();

        assert_eq!(spoken, 0);
        assert!(queue.is_empty());
        assert!(engine.calls().is_empty());
    }

    #[test]
    fn test_drain_stops_at_first_error() {
        let mut queue = VoiceQueue::new();
        queue.push(vec![0xC4], 0);
        queue.push(b"later".to_vec(), 0);

        let mut engine = engine();
        assert!(queue.drain(&mut engine, &Dispatcher::default()).is_err());
        assert_eq!(queue.len(), 1);
        assert!(engine.spoken().is_empty());
    }
}
