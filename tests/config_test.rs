//! Configuration loading tests

use langtts::config::Config;
use langtts::speech::{Dispatcher, RecordingEngine, VoiceInfo, VoiceQueue};
use std::time::Duration;

#[test]
fn test_set_save_reload() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("langtts.cfg");

    let mut config = Config::load_from(&path).expect("Failed to load config");
    config.set("speech", "rate", "70");
    config.set("speech", "volume", "40");
    config.set("speech", "mute", "true");
    config.save().expect("Failed to save config");

    let config = Config::load_from(&path).expect("Failed to reload config");
    let speech = config.speech();
    assert_eq!(speech.rate, Some(70));
    assert_eq!(speech.volume, Some(40));
    assert_eq!(speech.wait_poll, Duration::from_millis(100));
    assert!(config.mute());
}

#[test]
fn test_configured_encoding_drives_dispatch() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("langtts.cfg");
    std::fs::write(&path, "[speech]\nencoding=big5\n").unwrap();

    let config = Config::load_from(&path).unwrap();
    let dispatcher = Dispatcher::new(&config.encoding()).unwrap();
    assert_eq!(dispatcher.encoding(), encoding_rs::BIG5);
}

#[test]
fn test_mute_from_config_silences_queue() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("langtts.cfg");
    std::fs::write(&path, "[speech]\nmute=true\n").unwrap();
    let config = Config::load_from(&path).unwrap();

    let mut queue = VoiceQueue::new();
    queue.set_mute(config.mute());
    queue.push(b"quiet please".to_vec(), 0);

    let mut engine = RecordingEngine::new(vec![VoiceInfo::new("a", "English", ["en"])]);
    let spoken = queue.drain(&mut engine, &Dispatcher::default()).unwrap();
    assert_eq!(spoken, 0);
    assert!(engine.spoken().is_empty());
}
