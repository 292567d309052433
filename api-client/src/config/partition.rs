//! Splitting a configuration map into transport and client projections.

use std::ops::Deref;
use std::sync::Arc;

use tracing::{debug, warn};

use super::value::{ClientConfig, ConfigValue};
use crate::debug::DebugLogger;

/// Keys that belong to the HTTP transport.
///
/// Any key in this list is routed to [`TransportOptions`] by [`partition`];
/// every other key stays with the client.
pub const TRANSPORT_OPTION_KEYS: [&str; 5] =
    ["base_url", "defaults", "emitter", "handler", "message_factory"];

/// Client option naming the API description (an instance or a registered name).
pub const API_DESCRIPTION: &str = "apiDescription";
/// Client option naming the authenticator to attach.
pub const AUTH_TYPE: &str = "authType";
/// Client option enabling debug logging.
pub const DEBUG: &str = "debug";
/// Client option carrying the debug log sink.
pub const DEBUG_LOGGER: &str = "debugLogger";

/// Returns `true` if `key` is a transport option.
pub fn is_transport_key(key: &str) -> bool {
    TRANSPORT_OPTION_KEYS.contains(&key)
}

/// Splits `config` into transport options and client options.
///
/// Routing is decided by key presence only: a transport key with an empty
/// value is still a transport option. No values are validated here.
///
/// ## Examples
///
/// ```rust
/// use api_client::config::{partition, ClientConfig};
///
/// let config = ClientConfig::new()
///     .with("base_url", "")
///     .with("authType", "oauth2");
///
/// let (transport, client) = partition(config);
/// assert!(transport.contains_key("base_url"));
/// assert!(client.contains_key("authType"));
/// ```
pub fn partition(config: ClientConfig) -> (TransportOptions, ClientOptions) {
    let (transport, client): (Vec<_>, Vec<_>) = config
        .into_iter()
        .partition(|(key, _)| is_transport_key(key));

    let transport: ClientConfig = transport.into_iter().collect();
    let client: ClientConfig = client.into_iter().collect();
    debug!(
        transport_keys = transport.len(),
        client_keys = client.len(),
        "Partitioned client configuration"
    );

    (TransportOptions(transport), ClientOptions(client))
}

// ============================================================================
// TransportOptions
// ============================================================================

/// The transport-level projection of a client configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransportOptions(ClientConfig);

impl TransportOptions {
    /// Consumes the projection, returning the underlying map.
    pub fn into_inner(self) -> ClientConfig {
        self.0
    }
}

impl Deref for TransportOptions {
    type Target = ClientConfig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// ============================================================================
// ClientOptions
// ============================================================================

/// The client-level projection of a client configuration.
///
/// Every accessor honours an option only when it
/// [exists](ClientConfig::exists): present and not empty.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientOptions(ClientConfig);

impl ClientOptions {
    /// The configured description reference, if set.
    pub fn api_description(&self) -> Option<&ConfigValue> {
        self.0.get_set(API_DESCRIPTION)
    }

    /// The configured authentication type, if set.
    ///
    /// Non-string values are rendered to text so they can be reported.
    pub fn auth_type(&self) -> Option<String> {
        self.0.get_set(AUTH_TYPE).map(ToString::to_string)
    }

    /// Returns `true` if the `debug` option is set to any non-empty value.
    pub fn debug_requested(&self) -> bool {
        self.0.exists(DEBUG)
    }

    /// Returns `true` only if `debug` is exactly `true`.
    pub fn debug_mode(&self) -> bool {
        matches!(self.0.get(DEBUG), Some(ConfigValue::Bool(true)))
    }

    /// The configured debug logger.
    ///
    /// Only consulted when `debug` is set. A value that is not a logger is
    /// ignored with a warning.
    pub fn debug_logger(&self) -> Option<Arc<dyn DebugLogger>> {
        if !self.debug_requested() {
            return None;
        }
        match self.0.get_set(DEBUG_LOGGER)? {
            ConfigValue::Logger(logger) => Some(Arc::clone(logger)),
            other => {
                warn!(kind = other.kind(), "Ignoring debugLogger that is not a logger");
                None
            }
        }
    }

    /// Consumes the projection, returning the underlying map.
    pub fn into_inner(self) -> ClientConfig {
        self.0
    }
}

impl Deref for ClientOptions {
    type Target = ClientConfig;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::TracingLogger;
    use crate::transport::Emitter;
    use std::collections::BTreeSet;

    fn sample_config() -> ClientConfig {
        ClientConfig::new()
            .with("base_url", "foo")
            .with("defaults", ConfigValue::List(vec![]))
            .with("emitter", Emitter::new())
            .with("handler", "bar")
            .with("message_factory", ConfigValue::Null)
            .with("authType", "oauth2")
            .with("debug", true)
            .with("unrelated", 7)
    }

    #[test]
    fn test_partition_is_disjoint_and_complete() {
        let config = sample_config();
        let original: BTreeSet<String> = config.keys().map(String::from).collect();

        let (transport, client) = partition(config);
        let transport_keys: BTreeSet<String> = transport.keys().map(String::from).collect();
        let client_keys: BTreeSet<String> = client.keys().map(String::from).collect();

        assert!(transport_keys.is_disjoint(&client_keys));
        let union: BTreeSet<String> = transport_keys.union(&client_keys).cloned().collect();
        assert_eq!(union, original);
    }

    #[test]
    fn test_partition_extracts_all_transport_keys() {
        let (transport, client) = partition(sample_config());

        assert_eq!(transport.len(), 5);
        for key in TRANSPORT_OPTION_KEYS {
            assert!(transport.contains_key(key), "missing {key}");
        }
        assert_eq!(client.len(), 3);
    }

    #[test]
    fn test_empty_transport_values_are_still_extracted() {
        let config = ClientConfig::new()
            .with("base_url", "")
            .with("message_factory", ConfigValue::Null);

        let (transport, client) = partition(config);
        assert_eq!(transport.len(), 2);
        assert!(client.is_empty());
    }

    #[test]
    fn test_partition_empty_config() {
        let (transport, client) = partition(ClientConfig::new());
        assert!(transport.is_empty());
        assert!(client.is_empty());
    }

    #[test]
    fn test_falsy_client_options_are_unset() {
        for value in [
            ConfigValue::from(""),
            ConfigValue::Null,
            ConfigValue::Bool(false),
            ConfigValue::List(vec![]),
        ] {
            let (_, client) = partition(
                ClientConfig::new()
                    .with(AUTH_TYPE, value.clone())
                    .with(API_DESCRIPTION, value.clone())
                    .with(DEBUG, value),
            );
            assert_eq!(client.auth_type(), None);
            assert!(client.api_description().is_none());
            assert!(!client.debug_requested());
            assert!(!client.debug_mode());
        }
    }

    #[test]
    fn test_debug_mode_requires_literal_true() {
        let (_, client) = partition(ClientConfig::new().with(DEBUG, "yes"));
        assert!(client.debug_requested());
        assert!(!client.debug_mode());

        let (_, client) = partition(ClientConfig::new().with(DEBUG, true));
        assert!(client.debug_mode());
    }

    #[test]
    fn test_debug_logger_only_read_when_debug_set() {
        let config = ClientConfig::new().with(DEBUG_LOGGER, ConfigValue::logger(TracingLogger));
        let (_, client) = partition(config.clone());
        assert!(client.debug_logger().is_none());

        let (_, client) = partition(config.with(DEBUG, true));
        assert!(client.debug_logger().is_some());
    }

    #[test]
    fn test_non_string_auth_type_is_rendered() {
        let (_, client) = partition(ClientConfig::new().with(AUTH_TYPE, 5));
        assert_eq!(client.auth_type().as_deref(), Some("5"));
    }
}
