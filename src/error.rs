//! Error types for the UPI codec

use thiserror::Error;

/// Result type for codec operations
pub type Result<T> = std::result::Result<T, UpiError>;

/// Codec errors
#[derive(Error, Debug)]
pub enum UpiError {
    #[error("Unknown version: no schema registered for version '{0}'")]
    UnknownVersion(String),

    #[error("Unsupported version: no decoder for version '{0}'")]
    UnsupportedVersion(String),

    #[error("Malformed UPI '{input}': {reason}")]
    MalformedInput { input: String, reason: String },

    #[error("Invalid input: '{0}' is not a UPI")]
    InvalidInput(String),

    #[error("Ambiguous value for {field}: '{value}' contains segment token '{segment}'")]
    AmbiguousValue {
        field: String,
        value: String,
        segment: String,
    },

    #[error("Invalid version tag: '{0}'")]
    InvalidVersion(String),

    #[error("Invalid schema for version {version}: {reason}")]
    InvalidSchema { version: String, reason: String },

    #[error("Version {0} is already registered")]
    VersionAlreadyRegistered(String),

    #[error("Semver error: {0}")]
    Semver(#[from] semver::Error),

    #[error("Config error: {0}")]
    Config(#[from] config_crate::ConfigError),
}

impl UpiError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Self::MalformedInput {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether this error is about the version rather than the input text
    pub fn is_version_error(&self) -> bool {
        matches!(
            self,
            UpiError::UnknownVersion(_) | UpiError::UnsupportedVersion(_) | UpiError::InvalidVersion(_)
        )
    }
}
