//! Operation call validation errors.

use thiserror::Error;

/// Errors raised while building a request from a described operation or
/// decoding its response.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// The description has no operation with this name.
    #[error("Unknown operation: {name}")]
    UnknownOperation {
        /// The requested operation name.
        name: String,
    },

    /// A required parameter was not supplied.
    #[error("Operation '{operation}' is missing required parameter '{parameter}'")]
    MissingParameter {
        /// The operation being called.
        operation: String,
        /// The missing parameter.
        parameter: String,
    },

    /// A parameter value does not match its declared type.
    #[error("Parameter '{parameter}' of '{operation}' must be {expected}")]
    InvalidParameter {
        /// The operation being called.
        operation: String,
        /// The offending parameter.
        parameter: String,
        /// The declared type.
        expected: String,
    },

    /// Parameters must be passed as a JSON object.
    #[error("Operation parameters must be a JSON object")]
    InvalidParameters,

    /// The response body was not valid JSON.
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl ValidationError {
    /// Returns `true` if the failure happened before the request was sent.
    pub fn is_request_error(&self) -> bool {
        !matches!(self, Self::JsonParse(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_parameter_display() {
        let err = ValidationError::MissingParameter {
            operation: "count".to_string(),
            parameter: "url".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Operation 'count' is missing required parameter 'url'"
        );
        assert!(err.is_request_error());
    }

    #[test]
    fn test_json_parse_is_response_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let err = ValidationError::JsonParse(json_err);
        assert!(!err.is_request_error());
    }
}
