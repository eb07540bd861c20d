//! Configuration management

use crate::speech::backends::native::{DEFAULT_START_TIMEOUT, DEFAULT_WAIT_POLL};
use crate::speech::DEFAULT_ENCODING;
use crate::{LangTtsError, Result};
use ini::Ini;
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Speech settings handed to the native engine
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechConfig {
    /// Speech rate (0-100), backend default when unset
    pub rate: Option<u8>,
    /// Speech volume (0-100), backend default when unset
    pub volume: Option<u8>,
    /// Polling interval while waiting for playback to finish
    pub wait_poll: Duration,
    /// How long to wait for queued speech to start when polling
    pub start_timeout: Duration,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            rate: None,
            volume: None,
            wait_poll: DEFAULT_WAIT_POLL,
            start_timeout: DEFAULT_START_TIMEOUT,
        }
    }
}

/// Persistent settings stored in `~/.langtts.cfg`
pub struct Config {
    ini: Ini,
    path: PathBuf,
}

impl Config {
    /// Load configuration from the default path, creating it if missing
    pub fn load() -> Result<Self> {
        Self::load_from(Self::config_path())
    }

    /// Load configuration from `path`, creating a default file if missing
    pub fn load_from(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        debug!("Loading config from {:?}", path);

        let ini = if path.exists() {
            Ini::load_from_file(&path)
                .map_err(|e| LangTtsError::IniParse(format!("Failed to load config: {}", e)))?
        } else {
            info!("Config file not found, creating default");
            let default = Self::default_config();
            default
                .write_to_file(&path)
                .map_err(|e| LangTtsError::Config(format!("Failed to write config: {}", e)))?;
            default
        };

        Ok(Self { ini, path })
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        debug!("Saving config to {:?}", self.path);
        self.ini
            .write_to_file(&self.path)
            .map_err(|e| LangTtsError::Config(format!("Failed to save config: {}", e)))
    }

    fn config_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".langtts.cfg")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_config() -> Ini {
        let mut ini = Ini::new();

        ini.with_section(Some("speech"))
            .set("encoding", DEFAULT_ENCODING)
            .set("wait_poll_ms", DEFAULT_WAIT_POLL.as_millis().to_string())
            .set("start_timeout_ms", DEFAULT_START_TIMEOUT.as_millis().to_string())
            .set("mute", "false");

        ini
    }

    fn get<T: std::str::FromStr>(&self, section: &str, key: &str) -> Option<T> {
        self.ini
            .get_from(Some(section), key)
            .and_then(|v| v.trim().parse().ok())
    }

    /// Set a value in config
    pub fn set(&mut self, section: &str, key: &str, value: &str) {
        self.ini.with_section(Some(section)).set(key, value);
    }

    /// Encoding label for incoming utterance bytes
    pub fn encoding(&self) -> String {
        self.ini
            .get_from(Some("speech"), "encoding")
            .unwrap_or(DEFAULT_ENCODING)
            .to_string()
    }

    /// Speech rate (0-100)
    pub fn rate(&self) -> Option<u8> {
        self.get("speech", "rate").filter(|&r: &u8| r <= 100)
    }

    /// Speech volume (0-100)
    pub fn volume(&self) -> Option<u8> {
        self.get("speech", "volume").filter(|&v: &u8| v <= 100)
    }

    /// Interval between "still speaking?" checks
    pub fn wait_poll(&self) -> Duration {
        self.get("speech", "wait_poll_ms")
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_WAIT_POLL)
    }

    /// Time allowed for queued speech to start playing
    pub fn start_timeout(&self) -> Duration {
        self.get("speech", "start_timeout_ms")
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_START_TIMEOUT)
    }

    /// Discard queued messages instead of speaking them
    pub fn mute(&self) -> bool {
        self.get("speech", "mute").unwrap_or(false)
    }

    /// Engine settings from the `[speech]` section
    pub fn speech(&self) -> SpeechConfig {
        SpeechConfig {
            rate: self.rate(),
            volume: self.volume(),
            wait_poll: self.wait_poll(),
            start_timeout: self.start_timeout(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gets_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("langtts.cfg");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.encoding(), "gb2312");
        assert_eq!(config.speech(), SpeechConfig::default());
        assert!(!config.mute());
    }

    #[test]
    fn test_out_of_range_values_ignored() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("langtts.cfg");
        std::fs::write(&path, "[speech]\nrate=150\nvolume=abc\nwait_poll_ms=20\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.rate(), None);
        assert_eq!(config.volume(), None);
        assert_eq!(config.wait_poll(), Duration::from_millis(20));
        assert_eq!(config.start_timeout(), DEFAULT_START_TIMEOUT);
        assert_eq!(config.encoding(), "gb2312");
    }
}
