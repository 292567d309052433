//! Per-client-type declarations.

use crate::auth::{AuthenticatorFactory, AuthenticatorRegistry};
use crate::config::{ClientConfig, ConfigValue};
use crate::description::{DescriptionFactory, DescriptionRegistry};

/// Everything a client type declares about itself: default options, the
/// description it uses unless told otherwise, and the authenticators and
/// descriptions it can resolve by name.
///
/// Profiles are usually built once into a `LazyLock` static.
///
/// ## Examples
///
/// ```rust
/// use std::sync::LazyLock;
///
/// use api_client::client::ClientProfile;
/// use api_client::description::Description;
/// use api_client::ConfigValue;
///
/// static PROFILE: LazyLock<ClientProfile> = LazyLock::new(|| {
///     ClientProfile::new("urls")
///         .with_default_description(ConfigValue::description(Description::new("Urls")))
///         .with_option("debug", false)
/// });
///
/// assert_eq!(PROFILE.name(), "urls");
/// assert!(PROFILE.default_auth_type().is_none());
/// ```
#[derive(Debug, Clone)]
pub struct ClientProfile {
    name: &'static str,
    default_options: ClientConfig,
    default_description: Option<ConfigValue>,
    default_auth_type: Option<String>,
    default_debug_mode: bool,
    authenticators: AuthenticatorRegistry,
    descriptions: DescriptionRegistry,
}

impl ClientProfile {
    /// Creates an empty profile called `name`.
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            default_options: ClientConfig::new(),
            default_description: None,
            default_auth_type: None,
            default_debug_mode: false,
            authenticators: AuthenticatorRegistry::new(),
            descriptions: DescriptionRegistry::new(),
        }
    }

    /// Adds a default option; caller configuration overrides it per key.
    pub fn with_option(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.default_options.insert(key, value);
        self
    }

    /// Sets the description used when `apiDescription` is not configured.
    pub fn with_default_description(mut self, description: impl Into<ConfigValue>) -> Self {
        self.default_description = Some(description.into());
        self
    }

    /// Sets the auth type used when `authType` is not configured.
    pub fn with_default_auth_type(mut self, auth_type: impl Into<String>) -> Self {
        self.default_auth_type = Some(auth_type.into());
        self
    }

    /// Sets the debug mode used when `debug` is not configured.
    pub fn with_default_debug_mode(mut self, debug_mode: bool) -> Self {
        self.default_debug_mode = debug_mode;
        self
    }

    /// Registers an authenticator factory under `name`.
    pub fn authenticator(mut self, name: impl Into<String>, factory: AuthenticatorFactory) -> Self {
        self.authenticators = self.authenticators.register(name, factory);
        self
    }

    /// Registers a description factory under `name`.
    pub fn description(mut self, name: impl Into<String>, factory: DescriptionFactory) -> Self {
        self.descriptions = self.descriptions.register(name, factory);
        self
    }

    /// Profile name.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Default options merged under the caller's configuration.
    pub fn default_options(&self) -> &ClientConfig {
        &self.default_options
    }

    /// The fallback description reference.
    pub fn default_description(&self) -> Option<&ConfigValue> {
        self.default_description.as_ref()
    }

    /// The fallback auth type.
    pub fn default_auth_type(&self) -> Option<&str> {
        self.default_auth_type.as_deref()
    }

    /// The fallback debug mode.
    pub fn default_debug_mode(&self) -> bool {
        self.default_debug_mode
    }

    /// Registered authenticators.
    pub fn authenticators(&self) -> &AuthenticatorRegistry {
        &self.authenticators
    }

    /// Registered descriptions.
    pub fn descriptions(&self) -> &DescriptionRegistry {
        &self.descriptions
    }
}

/// A concrete client type with a static profile.
pub trait ClientType {
    /// The type's profile.
    fn profile() -> &'static ClientProfile;
}
