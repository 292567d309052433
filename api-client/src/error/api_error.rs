//! Top-level API error type.

use super::{AuthError, ClientError, ConfigError, DescriptionError, ValidationError};
use thiserror::Error;

/// Top-level error type for client construction and operation calls.
///
/// Construction can only fail with [`ApiError::Auth`], [`ApiError::Description`]
/// or [`ApiError::Config`]; the remaining variants come from operation calls.
///
/// ## Examples
///
/// ```rust,ignore
/// use api_client::ApiError;
///
/// fn handle_error(err: ApiError) {
///     match err {
///         ApiError::Auth(e) => eprintln!("Auth problem: {e}"),
///         ApiError::Description(e) => eprintln!("Bad description: {e}"),
///         ApiError::Config(e) => eprintln!("Configuration error: {e}"),
///         ApiError::Client(e) => eprintln!("Network error: {e}"),
///         ApiError::Validation(e) => eprintln!("Invalid call: {e}"),
///     }
/// }
/// ```
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authentication errors (unregistered authenticators, rejected credentials).
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// API description could not be resolved.
    #[error(transparent)]
    Description(#[from] DescriptionError),

    /// Configuration values could not be used.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// HTTP client errors (network, timeout, status codes).
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Operation parameters or response body were invalid.
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ApiError {
    /// Returns `true` if this error can be raised while constructing a client.
    pub fn is_construction_error(&self) -> bool {
        match self {
            Self::Auth(e) => e.is_unregistered(),
            Self::Description(_) | Self::Config(_) => true,
            Self::Client(_) | Self::Validation(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_auth_error() {
        let auth_err = AuthError::UnregisteredAuthenticator {
            auth_type: "foo".to_string(),
        };
        let api_err: ApiError = auth_err.into();
        assert!(matches!(api_err, ApiError::Auth(_)));
        assert!(api_err.is_construction_error());
    }

    #[test]
    fn test_from_description_error() {
        let api_err: ApiError = DescriptionError::NotFound.into();
        assert!(matches!(api_err, ApiError::Description(_)));
        assert!(api_err.is_construction_error());
    }

    #[test]
    fn test_default_handler_failure_is_a_construction_error() {
        let err: ApiError =
            ConfigError::DefaultHandler(ClientError::Connection("no TLS backend".into())).into();
        assert!(err.is_construction_error());
        assert!(err.to_string().starts_with("Default HTTP handler could not be built"));
    }

    #[test]
    fn test_call_errors_are_not_construction_errors() {
        let err: ApiError = ClientError::Timeout { duration_ms: 5000 }.into();
        assert!(!err.is_construction_error());

        let err: ApiError = AuthError::AuthenticationFailed {
            message: "bad token".to_string(),
        }
        .into();
        assert!(!err.is_construction_error());
    }

    #[test]
    fn test_error_display_is_transparent() {
        let err = ApiError::Description(DescriptionError::NotFound);
        assert_eq!(err.to_string(), "No API service description found");
    }
}
