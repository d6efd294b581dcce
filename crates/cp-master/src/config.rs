//! Session configuration loaded from TOML.

use std::path::{Path, PathBuf};
use std::time::Duration;

use cp_engine::{CandleStyle, DEFAULT_CAPACITY};
use cp_ir::DEFAULT_SAMPLE_RATE;
use serde::Deserialize;
use thiserror::Error;

/// File looked up in the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "candleplay.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config: {source}")]
    Parse {
        #[from]
        source: toml::de::Error,
    },
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Tunables for one playback session. Every field has a default, so an
/// empty file is a valid config.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Candles kept on screen
    pub capacity: usize,
    /// Render tick interval
    pub tick_interval_ms: u64,
    /// Song-time multiplier when no audio plays
    pub fallback_speed: f64,
    /// Synthesis sample rate
    pub sample_rate: u32,
    /// Skip synthesis and device probing entirely
    pub enable_audio: bool,
    /// How long to wait for a backend to report playback start
    pub audio_start_timeout_ms: u64,
    /// Length of the device validation tone
    pub probe_tone_ms: u64,
    /// Output device name for the primary backend
    pub output_device: Option<String>,
    pub style: CandleStyle,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            tick_interval_ms: 50,
            fallback_speed: 4.0,
            sample_rate: DEFAULT_SAMPLE_RATE,
            enable_audio: true,
            audio_start_timeout_ms: 3000,
            probe_tone_ms: 100,
            output_device: None,
            style: CandleStyle::default(),
        }
    }
}

impl SessionConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Load `path` if given, else `candleplay.toml` if present, else defaults.
    pub fn discover(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let local = PathBuf::from(DEFAULT_CONFIG_FILE);
        if local.exists() {
            return Self::load(&local);
        }
        Ok(Self::default())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::Invalid("capacity must be at least 1".into()));
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid("tick_interval_ms must be positive".into()));
        }
        if !self.fallback_speed.is_finite() || self.fallback_speed <= 0.0 {
            return Err(ConfigError::Invalid(format!(
                "fallback_speed must be a positive number, got {}",
                self.fallback_speed
            )));
        }
        if self.sample_rate == 0 {
            return Err(ConfigError::Invalid("sample_rate must be positive".into()));
        }
        let style = &self.style;
        if style.body_width <= 0.0 || style.min_body_height <= 0.0 || style.y_margin < 0.0 {
            return Err(ConfigError::Invalid(
                "style sizes must be positive (y_margin may be zero)".into(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn audio_start_timeout(&self) -> Duration {
        Duration::from_millis(self.audio_start_timeout_ms)
    }

    pub fn probe_tone_seconds(&self) -> f32 {
        self.probe_tone_ms as f32 / 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_gives_defaults() {
        let config = SessionConfig::from_toml_str("").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.capacity, 32);
        assert_eq!(config.tick_interval(), Duration::from_millis(50));
        assert_eq!(config.fallback_speed, 4.0);
        assert_eq!(config.sample_rate, 44_100);
    }

    #[test]
    fn partial_overrides() {
        let config = SessionConfig::from_toml_str(
            r#"
            capacity = 16
            fallback_speed = 2.5
            enable_audio = false
            output_device = "pulse"

            [style]
            y_margin = 1.0
            "#,
        )
        .unwrap();
        assert_eq!(config.capacity, 16);
        assert_eq!(config.fallback_speed, 2.5);
        assert!(!config.enable_audio);
        assert_eq!(config.output_device.as_deref(), Some("pulse"));
        assert_eq!(config.style.y_margin, 1.0);
        assert_eq!(config.style.body_width, 0.7);
    }

    #[test]
    fn rejects_invalid_values() {
        for doc in [
            "capacity = 0",
            "tick_interval_ms = 0",
            "fallback_speed = 0.0",
            "fallback_speed = -4.0",
            "sample_rate = 0",
            "[style]\nbody_width = 0.0",
        ] {
            assert!(
                matches!(SessionConfig::from_toml_str(doc), Err(ConfigError::Invalid(_))),
                "accepted {doc:?}"
            );
        }
    }

    #[test]
    fn rejects_unknown_keys_and_bad_types() {
        assert!(matches!(
            SessionConfig::from_toml_str("capacty = 3"),
            Err(ConfigError::Parse { .. })
        ));
        assert!(matches!(
            SessionConfig::from_toml_str("capacity = \"many\""),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = SessionConfig::load(Path::new("/nonexistent/candleplay.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
