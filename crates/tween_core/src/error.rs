//! Tween error types

use thiserror::Error;

/// Errors raised while configuring or running a tween property
///
/// Configuration and binding errors are recorded on the property that caused
/// them and logged; they never propagate into the owning tween or scheduler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TweenError {
    /// Start and end values cannot be interpolated with each other
    #[error("cannot interpolate `{from}` towards `{to}`")]
    UnsupportedType { from: &'static str, to: &'static str },

    /// The value type has no addition, so additive mode is unavailable
    #[error("value type `{0}` does not support additive tweening")]
    UnsupportedAdditive(&'static str),

    /// A curve shape or ease was assigned without any keys
    #[error("custom curve has no keys")]
    EmptyCurve,

    /// The bound member name resolved to nothing on the target type
    #[error("no member `{member}` of type `{value}` on `{target}`")]
    MemberNotFound {
        target: &'static str,
        member: String,
        value: &'static str,
    },

    /// The bound target was dropped before the member could be accessed
    #[error("target of member `{0}` no longer exists")]
    TargetDropped(String),

    /// The bound target is already borrowed by the host
    #[error("target of member `{0}` is borrowed elsewhere")]
    TargetBusy(String),

    /// A property was removed from a tween that does not own it
    #[error("property {0} is not owned by this tween")]
    PropertyNotOwned(u64),
}

impl TweenError {
    /// Whether this error is a missing-target condition rather than a
    /// configuration mistake
    pub fn is_missing_target(&self) -> bool {
        matches!(
            self,
            TweenError::MemberNotFound { .. }
                | TweenError::TargetDropped(_)
                | TweenError::TargetBusy(_)
        )
    }
}

/// Errors raised while loading tween settings
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the settings file
    #[error("failed to read settings file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse the settings file
    #[error("failed to parse settings: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize settings
    #[error("failed to serialize settings: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// Settings parsed but hold an invalid value
    #[error("invalid setting `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

/// Result type for tween operations
pub type Result<T> = std::result::Result<T, TweenError>;
