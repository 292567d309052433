//! Authentication and authorization errors.

use thiserror::Error;

/// Errors related to request authentication.
///
/// [`AuthError::UnregisteredAuthenticator`] is raised while a client is being
/// constructed; the other variants come back from the server during calls.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The requested authentication type has no registered authenticator.
    #[error("{auth_type} is not a registered authentication type")]
    UnregisteredAuthenticator {
        /// The authentication type name that was requested.
        auth_type: String,
    },

    /// Server rejected the authentication credentials.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Error message from the server.
        message: String,
    },

    /// Insufficient permissions for the requested operation.
    #[error("Insufficient permissions: {operation}")]
    InsufficientPermissions {
        /// The operation that was denied.
        operation: String,
    },
}

impl AuthError {
    /// Creates an unregistered authenticator error.
    pub fn unregistered(auth_type: impl Into<String>) -> Self {
        Self::UnregisteredAuthenticator {
            auth_type: auth_type.into(),
        }
    }

    /// Returns `true` if the authenticator lookup failed.
    pub fn is_unregistered(&self) -> bool {
        matches!(self, Self::UnregisteredAuthenticator { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unregistered_display_contains_name() {
        let err = AuthError::unregistered("foo");
        assert_eq!(err.to_string(), "foo is not a registered authentication type");
        assert!(err.is_unregistered());
    }

    #[test]
    fn test_authentication_failed_is_not_unregistered() {
        let err = AuthError::AuthenticationFailed {
            message: "expired".to_string(),
        };
        assert!(!err.is_unregistered());
    }

    #[test]
    fn test_insufficient_permissions() {
        let err = AuthError::InsufficientPermissions {
            operation: "count".to_string(),
        };
        assert_eq!(err.to_string(), "Insufficient permissions: count");
    }
}
