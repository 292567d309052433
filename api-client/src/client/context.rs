//! The client state visible to authenticators and listeners.

use crate::config::{ClientOptions, ConfigValue};

/// Read-only view of a client, handed to authenticator factories and to every
/// lifecycle event.
#[derive(Debug, Clone)]
pub struct ClientContext {
    profile: &'static str,
    auth_type: Option<String>,
    debug_mode: bool,
    options: ClientOptions,
}

impl ClientContext {
    /// Creates a context for a client of profile `profile` with `options`.
    pub fn new(profile: &'static str, options: ClientOptions) -> Self {
        Self {
            profile,
            auth_type: None,
            debug_mode: false,
            options,
        }
    }

    /// Returns the context with the resolved auth type set.
    pub fn with_auth_type(mut self, auth_type: impl Into<String>) -> Self {
        self.auth_type = Some(auth_type.into());
        self
    }

    /// Returns the context with debug mode set.
    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    pub(crate) fn set_auth_type(&mut self, auth_type: impl Into<String>) {
        self.auth_type = Some(auth_type.into());
    }

    /// Name of the client profile.
    pub fn profile_name(&self) -> &'static str {
        self.profile
    }

    /// The resolved auth type.
    pub fn auth_type(&self) -> Option<&str> {
        self.auth_type.as_deref()
    }

    /// Returns `true` if debug logging is attached.
    pub fn is_in_debug_mode(&self) -> bool {
        self.debug_mode
    }

    /// The client's options.
    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// The client option `key`, if set to a non-empty value.
    pub fn option(&self, key: &str) -> Option<&ConfigValue> {
        self.options.get_set(key)
    }
}
