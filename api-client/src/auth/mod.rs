//! Request-signing authenticators.
//!
//! A client type declares the authenticators it supports in an
//! [`AuthenticatorRegistry`], keyed by authentication-type name. When a client
//! is constructed with a non-empty `authType`, the name is looked up, the
//! factory builds an [`Authenticator`] for that client, and the authenticator
//! is attached to the transport's `before` event. The transport's default
//! `auth` option is set to the same name so the authenticator can recognise
//! the requests it should sign.
//!
//! ## Examples
//!
//! ```rust
//! use api_client::auth::{Authenticator, AuthenticatorRegistry};
//! use api_client::client::ClientContext;
//! use api_client::transport::BeforeEvent;
//!
//! #[derive(Debug)]
//! struct StaticKey;
//!
//! impl Authenticator for StaticKey {
//!     fn sign(&self, event: &mut BeforeEvent<'_>) {
//!         if event.request_has_auth("key") {
//!             event.request_mut().add_query("key", "abc123");
//!         }
//!     }
//! }
//!
//! fn static_key(_: &ClientContext) -> Box<dyn Authenticator> {
//!     Box::new(StaticKey)
//! }
//!
//! let registry = AuthenticatorRegistry::new().register("key", static_key);
//! assert!(registry.contains("key"));
//! ```

mod bearer;

pub use bearer::{BearerTokenAuthenticator, ACCESS_TOKEN};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::client::ClientContext;
use crate::error::AuthError;
use crate::transport::{BeforeEvent, RequestEvent, Subscriber, Transport};

/// Signs outgoing requests.
pub trait Authenticator: Send + Sync + fmt::Debug {
    /// Modifies the request carried by `event`.
    ///
    /// Called for every request the client sends. Implementations usually
    /// check [`BeforeEvent::request_has_auth`] first.
    fn sign(&self, event: &mut BeforeEvent<'_>);
}

/// Builds an authenticator for the client described by the context.
pub type AuthenticatorFactory = fn(&ClientContext) -> Box<dyn Authenticator>;

/// Authentication-type names mapped to authenticator factories.
#[derive(Debug, Clone, Default)]
pub struct AuthenticatorRegistry {
    factories: BTreeMap<String, AuthenticatorFactory>,
}

impl AuthenticatorRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn register(mut self, name: impl Into<String>, factory: AuthenticatorFactory) -> Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Returns the factory registered under `name`.
    pub fn get(&self, name: &str) -> Option<AuthenticatorFactory> {
        self.factories.get(name).copied()
    }

    /// Returns `true` if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Number of registered authenticators.
    pub fn len(&self) -> usize {
        self.factories.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Builds the authenticator registered under `auth_type`.
    ///
    /// ## Errors
    ///
    /// Returns [`AuthError::UnregisteredAuthenticator`] if the name is unknown.
    pub fn resolve(
        &self,
        auth_type: &str,
        context: &ClientContext,
    ) -> Result<Box<dyn Authenticator>, AuthError> {
        let factory = self
            .get(auth_type)
            .ok_or_else(|| AuthError::unregistered(auth_type))?;
        Ok(factory(context))
    }
}

/// Adapts an [`Authenticator`] to the emitter's `before` event.
#[derive(Debug)]
pub struct AuthSubscriber {
    auth_type: String,
    authenticator: Box<dyn Authenticator>,
}

impl AuthSubscriber {
    /// Wraps `authenticator`, registered under `auth_type`.
    pub fn new(auth_type: impl Into<String>, authenticator: Box<dyn Authenticator>) -> Self {
        Self {
            auth_type: auth_type.into(),
            authenticator,
        }
    }

    /// The authentication type this subscriber signs for.
    pub fn auth_type(&self) -> &str {
        &self.auth_type
    }

    /// The wrapped authenticator.
    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }
}

impl Subscriber for AuthSubscriber {
    fn name(&self) -> &str {
        "auth"
    }

    fn events(&self) -> &[RequestEvent] {
        &[RequestEvent::Before]
    }

    fn on_before(&self, event: &mut BeforeEvent<'_>) {
        self.authenticator.sign(event);
    }
}

/// Resolves `auth_type` and attaches its authenticator to `transport`.
///
/// Sets the transport's default `auth` option to `auth_type` and makes
/// exactly one `before` registration. Returns the attached subscriber.
///
/// ## Errors
///
/// Returns [`AuthError::UnregisteredAuthenticator`] if the name is unknown;
/// the transport is left untouched in that case.
pub fn authenticate(
    registry: &AuthenticatorRegistry,
    auth_type: &str,
    context: &ClientContext,
    transport: &mut Transport,
) -> Result<Arc<dyn Subscriber>, AuthError> {
    let authenticator = registry.resolve(auth_type, context)?;
    transport.set_default_auth(auth_type);

    let subscriber: Arc<dyn Subscriber> = Arc::new(AuthSubscriber::new(auth_type, authenticator));
    transport.emitter().attach(Arc::clone(&subscriber));
    debug!(auth_type, "Attached authenticator");
    Ok(subscriber)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ClientConfig, ClientOptions, TransportOptions};
    use crate::description::RestMethod;
    use crate::transport::HttpRequest;
    use url::Url;

    #[derive(Debug)]
    struct QueryToken;

    impl Authenticator for QueryToken {
        fn sign(&self, event: &mut BeforeEvent<'_>) {
            if event.request_has_auth("oauth2") {
                event.request_mut().add_query("access_token", "token_value");
            }
        }
    }

    fn query_token(_: &ClientContext) -> Box<dyn Authenticator> {
        Box::new(QueryToken)
    }

    fn registry() -> AuthenticatorRegistry {
        AuthenticatorRegistry::new().register("oauth2", query_token)
    }

    fn context() -> ClientContext {
        ClientContext::new("test", ClientOptions::default())
    }

    fn transport() -> Transport {
        let (options, _): (TransportOptions, _) = crate::config::partition(ClientConfig::new());
        Transport::new(options).unwrap()
    }

    #[test]
    fn test_registry_lookup() {
        let registry = registry();
        assert!(registry.contains("oauth2"));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["oauth2"]);
        assert!(registry.resolve("oauth2", &context()).is_ok());
    }

    #[test]
    fn test_unregistered_auth_type() {
        let err = registry().resolve("foo", &context()).unwrap_err();
        assert_eq!(err.to_string(), "foo is not a registered authentication type");
    }

    #[test]
    fn test_authenticate_attaches_one_before_listener() {
        let mut transport = transport();
        authenticate(&registry(), "oauth2", &context(), &mut transport).unwrap();

        assert_eq!(transport.default_auth(), Some("oauth2"));
        assert_eq!(transport.emitter().listener_count(), 1);
        let before = transport.emitter().listeners(RequestEvent::Before);
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].name(), "auth");
    }

    #[test]
    fn test_failed_authenticate_leaves_transport_untouched() {
        let mut transport = transport();
        assert!(authenticate(&registry(), "foo", &context(), &mut transport).is_err());
        assert_eq!(transport.default_auth(), None);
        assert_eq!(transport.emitter().listener_count(), 0);
    }

    #[test]
    fn test_subscriber_signs_only_matching_requests() {
        let subscriber = AuthSubscriber::new("oauth2", Box::new(QueryToken));
        let context = context();
        let url = Url::parse("http://example.com/count.json").unwrap();

        let mut signed = HttpRequest::new(RestMethod::Get, url.clone());
        signed.set_auth("oauth2");
        subscriber.on_before(&mut BeforeEvent::new("count", &mut signed, &context));
        assert_eq!(signed.query_value("access_token"), Some("token_value"));

        let mut unsigned = HttpRequest::new(RestMethod::Get, url);
        subscriber.on_before(&mut BeforeEvent::new("count", &mut unsigned, &context));
        assert_eq!(unsigned.query_value("access_token"), None);
    }
}
