//! Configuration errors.

use thiserror::Error;

use super::ClientError;

/// Errors for configuration values that cannot be used.
///
/// The partitioner never validates values; these errors come from the
/// component that consumes an option.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// URL parsing failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// An option is present but holds a value of the wrong kind.
    #[error("Invalid value for option '{key}': expected {expected}")]
    InvalidOption {
        /// The option name.
        key: String,
        /// Description of the accepted value kinds.
        expected: &'static str,
    },

    /// A required configuration field is missing.
    #[error("Missing required field: {field}")]
    MissingField {
        /// The name of the missing field.
        field: &'static str,
    },

    /// No `handler` was configured and the default one could not be built.
    #[error("Default HTTP handler could not be built: {0}")]
    DefaultHandler(#[source] ClientError),

    /// A configuration document was not a JSON object.
    #[error("Configuration must be a JSON object, got {found}")]
    NotAnObject {
        /// The JSON kind that was found instead.
        found: &'static str,
    },
}

impl ConfigError {
    /// Creates a missing field error.
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    /// Creates an invalid option error.
    pub fn invalid_option(key: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidOption {
            key: key.into(),
            expected,
        }
    }
}
