//! Error types for detector configuration.
//!
//! Classification itself never fails; these errors only surface while a
//! [`DetectorConfig`](crate::DetectorConfig) is loaded or a signature table is built.

use thiserror::Error;

/// Detector result type.
pub type Result<T> = std::result::Result<T, DetectError>;

/// Detector errors.
#[derive(Error, Debug)]
pub enum DetectError {
    /// IO error while reading or writing a config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file could not be parsed
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Config could not be serialized or is otherwise unusable
    #[error("Config error: {0}")]
    Config(String),

    /// A signature definition was rejected while building the table
    #[error("Invalid signature '{label}': {reason}")]
    InvalidSignature { label: String, reason: String },
}

impl DetectError {
    /// Create a config error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid signature error.
    pub fn invalid_signature(label: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSignature {
            label: label.into(),
            reason: reason.into(),
        }
    }
}
