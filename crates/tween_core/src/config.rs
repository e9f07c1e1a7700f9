//! Tween settings file handling
//!
//! Settings seed every tween and property a scheduler creates. All fields
//! default, so an empty file is valid:
//!
//! ```toml
//! [tween]
//! mode = "chain"
//! looping = true
//! iterations = 3
//!
//! [property]
//! shape = "cubic"
//! ease = "in_out"
//! delay = 0.1
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::easing::{Ease, Shape};
use crate::error::ConfigError;
use crate::tween::TweenConfig;

/// Top-level settings (tween.toml)
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
pub struct TweenSettings {
    #[serde(default)]
    pub tween: TweenConfig,
    #[serde(default)]
    pub property: PropertyDefaults,
}

/// Defaults applied to properties created through a tween
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct PropertyDefaults {
    #[serde(default)]
    pub shape: Shape,
    #[serde(default)]
    pub ease: Ease,
    /// Delay before the property starts moving, in seconds
    #[serde(default)]
    pub delay: f32,
}

impl Default for PropertyDefaults {
    fn default() -> Self {
        Self {
            shape: Shape::Linear,
            ease: Ease::In,
            delay: 0.0,
        }
    }
}

impl TweenSettings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let settings: TweenSettings = toml::from_str(content)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load settings from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        let settings = Self::from_toml_str(&content)?;
        tracing::debug!("Loaded tween settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings from a file, falling back to defaults when it is absent
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load(path)
    }

    /// Serialize to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Reject values that parse but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        let delay = self.property.delay;
        if !delay.is_finite() || delay < 0.0 {
            return Err(ConfigError::Invalid {
                key: "property.delay",
                reason: format!("expected a non-negative number of seconds, got {}", delay),
            });
        }
        if self.property.shape.curve().is_some_and(|c| c.is_empty()) {
            return Err(ConfigError::Invalid {
                key: "property.shape",
                reason: "curve has no keys".to_string(),
            });
        }
        if self.property.ease.curve().is_some_and(|c| c.is_empty()) {
            return Err(ConfigError::Invalid {
                key: "property.ease",
                reason: "curve has no keys".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tween::PlayMode;

    #[test]
    fn test_empty_file_is_default() {
        let settings = TweenSettings::from_toml_str("").unwrap();
        assert_eq!(settings, TweenSettings::default());
        assert_eq!(settings.tween.mode, PlayMode::Parallel);
        assert!(settings.tween.destroy_on_finish);
        assert_eq!(settings.tween.iterations, -1);
    }

    #[test]
    fn test_parse_sections() {
        let settings = TweenSettings::from_toml_str(
            r#"
            [tween]
            mode = "chain"
            looping = true
            iterations = 3
            survive_scene_unload = true

            [property]
            shape = "cubic"
            ease = "in_out"
            delay = 0.25
            "#,
        )
        .unwrap();

        assert_eq!(settings.tween.mode, PlayMode::Chain);
        assert!(settings.tween.looping);
        assert_eq!(settings.tween.iterations, 3);
        assert!(settings.tween.survive_scene_unload);
        assert!(settings.tween.destroy_on_finish);
        assert_eq!(settings.property.shape, Shape::Cubic);
        assert_eq!(settings.property.ease, Ease::InOut);
        assert_eq!(settings.property.delay, 0.25);
    }

    #[test]
    fn test_negative_delay_is_invalid() {
        let err = TweenSettings::from_toml_str("[property]\ndelay = -1.0").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "property.delay",
                ..
            }
        ));
    }

    #[test]
    fn test_unknown_shape_is_parse_error() {
        let err = TweenSettings::from_toml_str("[property]\nshape = \"wobbly\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_to_toml_roundtrip() {
        let mut settings = TweenSettings::default();
        settings.tween.mode = PlayMode::Chain;
        settings.property.shape = Shape::Bounce;
        let text = settings.to_toml().unwrap();
        assert_eq!(TweenSettings::from_toml_str(&text).unwrap(), settings);
    }

    #[test]
    fn test_missing_file_falls_back() {
        let settings =
            TweenSettings::load_or_default(Path::new("/nonexistent/tween.toml")).unwrap();
        assert_eq!(settings, TweenSettings::default());
    }
}
