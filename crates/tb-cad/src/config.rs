//! Engine configuration
//!
//! Tunable thresholds for resolution and validation. The configuration is
//! serde-serializable and can be stored as RON next to the host's settings.

use std::path::Path;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::constants::{
    COINCIDENT_TOLERANCE, FALLBACK_POSITION, MIN_MEMBER_LENGTH, ON_MEMBER_TOLERANCE,
};

/// Resolution and validation settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    /// Members shorter than this are rejected (model units)
    pub min_member_length: f64,
    /// Position used for entities whose constraints cannot be resolved
    pub fallback_position: [f64; 2],
    /// Parametric slack before an on-member attachment counts as off the member
    pub on_member_tolerance: f64,
    /// Distance below which two parallel constraint lines count as the same line
    pub coincident_tolerance: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_member_length: MIN_MEMBER_LENGTH,
            fallback_position: FALLBACK_POSITION,
            on_member_tolerance: ON_MEMBER_TOLERANCE,
            coincident_tolerance: COINCIDENT_TOLERANCE,
        }
    }
}

impl EngineConfig {
    /// Fallback position as a vector
    pub fn fallback(&self) -> DVec2 {
        DVec2::from_array(self.fallback_position)
    }

    /// Parse a configuration from RON text
    pub fn from_ron_str(content: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig =
            ron::from_str(content).map_err(|e| ConfigError::Deserialize(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the configuration to pretty RON text
    pub fn to_ron_string(&self) -> Result<String, ConfigError> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io(e.to_string()))?;
        Self::from_ron_str(&content)
    }

    /// Save the configuration to a file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let content = self.to_ron_string()?;
        std::fs::write(path.as_ref(), content).map_err(|e| ConfigError::Io(e.to_string()))
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_member_length.is_finite() && self.min_member_length >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_member_length must be a non-negative number, got {}",
                self.min_member_length
            )));
        }
        if !(self.on_member_tolerance.is_finite() && self.on_member_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "on_member_tolerance must be a non-negative number, got {}",
                self.on_member_tolerance
            )));
        }
        if !(self.coincident_tolerance.is_finite() && self.coincident_tolerance >= 0.0) {
            return Err(ConfigError::Invalid(format!(
                "coincident_tolerance must be a non-negative number, got {}",
                self.coincident_tolerance
            )));
        }
        if !self.fallback_position.iter().all(|v| v.is_finite()) {
            return Err(ConfigError::Invalid(
                "fallback_position must be finite".into(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("Serialization error: {0}")]
    Serialize(String),
    #[error("Deserialization error: {0}")]
    Deserialize(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.min_member_length, 1.0);
        assert_eq!(config.fallback(), DVec2::ZERO);
    }

    #[test]
    fn test_ron_partial_override() {
        let config = EngineConfig::from_ron_str("(min_member_length: 5.0)").unwrap();
        assert_eq!(config.min_member_length, 5.0);
        assert_eq!(config.on_member_tolerance, ON_MEMBER_TOLERANCE);

        let text = config.to_ron_string().unwrap();
        assert_eq!(EngineConfig::from_ron_str(&text).unwrap(), config);
    }

    #[test]
    fn test_save_and_load_file() {
        use tempfile::tempdir;

        let temp = tempdir().unwrap();
        let path = temp.path().join("engine.ron");
        let config = EngineConfig {
            min_member_length: 2.5,
            fallback_position: [10.0, -4.0],
            ..Default::default()
        };
        config.save(&path).unwrap();
        assert_eq!(EngineConfig::load(&path).unwrap(), config);

        let missing = EngineConfig::load(temp.path().join("missing.ron"));
        assert!(matches!(missing, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_rejects_negative_length() {
        let result = EngineConfig::from_ron_str("(min_member_length: -1.0)");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }
}
