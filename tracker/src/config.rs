//! Tracker configuration: one TOML file, one section per component.
//!
//! ```toml
//! [smoothing]
//! min_cutoff = 1.0
//! beta = 0.007
//!
//! [pinch]
//! click_threshold = 0.05
//! ```
//!
//! Missing sections and keys fall back to their defaults.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::action::ActionConfig;
use crate::hand::{CursorConfig, HandLossConfig, PinchConfig, PinchKind, SmootherConfig};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("config validation error: {0}")]
    Validation(String),
}

/// Complete configuration for one `GestureTracker`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    pub smoothing: SmootherConfig,
    pub cursor: CursorConfig,
    pub pinch: PinchConfig,
    pub hand_loss: HandLossConfig,
    pub actions: ActionConfig,
}

impl TrackerConfig {
    /// Load and validate configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: TrackerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the tracker cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let s = &self.smoothing;
        if !(s.min_cutoff > 0.0) {
            return Err(invalid("smoothing.min_cutoff must be positive"));
        }
        if !(s.beta >= 0.0) {
            return Err(invalid("smoothing.beta must be non-negative"));
        }
        if !(s.derivative_cutoff > 0.0) {
            return Err(invalid("smoothing.derivative_cutoff must be positive"));
        }

        let c = &self.cursor;
        if !(c.screen_width > 0.0) || !(c.screen_height > 0.0) {
            return Err(invalid("cursor.screen_width and screen_height must be positive"));
        }
        if !(c.sensitivity_x > 0.0) || !(c.sensitivity_y > 0.0) {
            return Err(invalid("cursor.sensitivity_x and sensitivity_y must be positive"));
        }

        for kind in PinchKind::PRIORITY {
            if !(self.pinch.threshold(kind) > 0.0) {
                return Err(ConfigError::Validation(format!(
                    "pinch.{}_threshold must be positive",
                    kind.as_str()
                )));
            }
        }
        if !(self.pinch.click_hold_ms > 0.0) {
            return Err(invalid("pinch.click_hold_ms must be positive"));
        }
        if !(self.pinch.pinky_hold_ms > 0.0) {
            return Err(invalid("pinch.pinky_hold_ms must be positive"));
        }

        if !(self.actions.swipe_amplification > 0.0) {
            return Err(invalid("actions.swipe_amplification must be positive"));
        }
        Ok(())
    }

    /// Serialize back to TOML, e.g. to dump the effective configuration.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}

fn invalid(reason: &str) -> ConfigError {
    ConfigError::Validation(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_default_is_valid() {
        assert!(TrackerConfig::default().validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        assert_eq!(TrackerConfig::from_toml("").unwrap(), TrackerConfig::default());
    }

    #[test]
    fn test_partial_section() {
        let config = TrackerConfig::from_toml(
            r#"
            [pinch]
            click_threshold = 0.04

            [hand_loss]
            threshold_frames = 10
            "#,
        )
        .unwrap();
        assert_eq!(config.pinch.click_threshold, 0.04);
        assert_eq!(config.pinch.swipe_threshold, 0.06);
        assert_eq!(config.hand_loss.threshold_frames, 10);
        assert_eq!(config.smoothing, SmootherConfig::default());
    }

    #[test]
    fn test_rejects_non_positive_threshold() {
        let err = TrackerConfig::from_toml("[pinch]\nback_threshold = 0.0\n").unwrap_err();
        assert!(
            err.to_string().contains("pinch.back_threshold"),
            "got {}",
            err
        );
    }

    #[test]
    fn test_rejects_negative_beta() {
        let err = TrackerConfig::from_toml("[smoothing]\nbeta = -0.5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_rejects_nan() {
        let mut config = TrackerConfig::default();
        config.cursor.sensitivity_x = f32::NAN;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_bad_toml() {
        let err = TrackerConfig::from_toml("[pinch\n").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[cursor]\nscreen_width = 720.0\nscreen_height = 1600.0").unwrap();
        let config = TrackerConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cursor.screen_width, 720.0);
        assert_eq!(config.cursor.screen_height, 1600.0);
    }

    #[test]
    fn test_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = TrackerConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = TrackerConfig::default();
        let text = config.to_toml_string().unwrap();
        assert_eq!(TrackerConfig::from_toml(&text).unwrap(), config);
    }
}
