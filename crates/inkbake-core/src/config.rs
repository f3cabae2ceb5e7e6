//! Session configuration.

use crate::stroke::StrokeColor;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default width of every stroke, in image pixels.
pub const DEFAULT_STROKE_WIDTH: f64 = 5.0;
/// Amount added to or removed from the scale by one zoom step.
pub const DEFAULT_ZOOM_STEP: f64 = 0.1;
/// Lowest scale zooming out may reach.
pub const DEFAULT_MIN_SCALE: f64 = 0.05;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid config JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

/// Result type for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Tunables for an editing session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Width of every stroke (round caps and joins).
    pub stroke_width: f64,
    /// Scale change per zoom in/out.
    pub zoom_step: f64,
    /// Zoom out never goes below this scale.
    pub min_scale: f64,
    /// Color selected when the session opens.
    pub initial_color: StrokeColor,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            stroke_width: DEFAULT_STROKE_WIDTH,
            zoom_step: DEFAULT_ZOOM_STEP,
            min_scale: DEFAULT_MIN_SCALE,
            initial_color: StrokeColor::BLACK,
        }
    }
}

impl SessionConfig {
    /// Parse and validate a JSON config. Missing fields take their defaults.
    pub fn from_json(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the config to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::Invalid(format!("{name} must be positive, got {value}")))
            }
        };
        positive("stroke_width", self.stroke_width)?;
        positive("zoom_step", self.zoom_step)?;
        positive("min_scale", self.min_scale)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert!((config.stroke_width - 5.0).abs() < f64::EPSILON);
        assert!((config.zoom_step - 0.1).abs() < f64::EPSILON);
        assert!((config.min_scale - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.initial_color, StrokeColor::BLACK);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SessionConfig::from_json(r#"{ "stroke_width": 12.0 }"#).unwrap();
        assert!((config.stroke_width - 12.0).abs() < f64::EPSILON);
        assert!((config.zoom_step - DEFAULT_ZOOM_STEP).abs() < f64::EPSILON);
    }

    #[test]
    fn test_rejects_non_positive_values() {
        let err = SessionConfig::from_json(r#"{ "min_scale": 0.0 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = SessionConfig::from_json(r#"{ "zoom_step": -0.1 }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = SessionConfig::from_json("{ stroke_width: ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_json_roundtrip() {
        let config = SessionConfig {
            initial_color: StrokeColor::RED,
            ..SessionConfig::default()
        };
        let json = config.to_json().unwrap();
        assert_eq!(SessionConfig::from_json(&json).unwrap(), config);
    }
}
