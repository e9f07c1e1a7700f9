//! Settings file lookup for the CLI

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::path::Path;
use tween_core::{Ease, Shape, TweenSettings};

/// Default settings file name
pub const SETTINGS_FILE: &str = "tween.toml";

/// Load settings from `path`, or from `tween.toml` in the current directory
///
/// An explicit path must exist. Without one, a missing `tween.toml` means
/// defaults.
pub fn load_settings(path: Option<&Path>) -> Result<TweenSettings> {
    let Some(path) = path else {
        return TweenSettings::load_or_default(Path::new(SETTINGS_FILE))
            .with_context(|| format!("Failed to load {}", SETTINGS_FILE));
    };

    let settings_path = if path.is_dir() {
        path.join(SETTINGS_FILE)
    } else {
        path.to_path_buf()
    };

    if !settings_path.exists() {
        anyhow::bail!(
            "No settings found at {}. Run `tween init` to create one.",
            settings_path.display()
        );
    }

    TweenSettings::load(&settings_path)
        .with_context(|| format!("Failed to load {}", settings_path.display()))
}

/// Serialize settings to a TOML string
pub fn settings_to_toml(settings: &TweenSettings) -> Result<String> {
    settings.to_toml().context("Failed to serialize settings")
}

fn parse_name<T: DeserializeOwned>(kind: &str, name: &str) -> Result<T> {
    toml::Value::String(name.to_string())
        .try_into()
        .with_context(|| format!("Unknown {} '{}'", kind, name))
}

/// Parse a shape name such as `cubic` or `elastic`
pub fn parse_shape(name: &str) -> Result<Shape> {
    parse_name("shape", name)
}

/// Parse an ease name such as `in_out`
pub fn parse_ease(name: &str) -> Result<Ease> {
    parse_name("ease", name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(parse_shape("bounce").unwrap(), Shape::Bounce);
        assert_eq!(parse_ease("out_in").unwrap(), Ease::OutIn);
        assert!(parse_shape("wobble").is_err());
    }

    #[test]
    fn test_load_settings_from_dir() {
        let dir = std::env::temp_dir().join(format!("tween_cli_settings_{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let file = dir.join(SETTINGS_FILE);

        std::fs::write(&file, "[tween]\nmode = \"chain\"\n").unwrap();
        let settings = load_settings(Some(&dir)).unwrap();
        assert_eq!(settings.tween.mode, tween_core::PlayMode::Chain);

        std::fs::write(&file, "[property]\ndelay = -1.0\n").unwrap();
        let err = load_settings(Some(&file)).unwrap_err();
        assert!(err.to_string().starts_with("Failed to load"));

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_explicit_missing_file_fails() {
        let err = load_settings(Some(Path::new("/nonexistent/tween.toml"))).unwrap_err();
        assert!(err.to_string().contains("No settings found"));
    }
}
