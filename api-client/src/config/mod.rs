//! Client configuration.
//!
//! A client is constructed from one [`ClientConfig`] map. [`partition`] splits
//! it into [`TransportOptions`] (the keys in [`TRANSPORT_OPTION_KEYS`]) and
//! [`ClientOptions`] (everything else). Client options are honoured only when
//! they are present and non-empty; see [`ConfigValue::is_empty`].
//!
//! ## Examples
//!
//! ```rust
//! use api_client::config::{partition, ClientConfig};
//!
//! let config = ClientConfig::new()
//!     .with("base_url", "https://urls.example.com/")
//!     .with("authType", "oauth2")
//!     .with("debug", false);
//!
//! let (transport, client) = partition(config);
//! assert_eq!(transport.len(), 1);
//! assert_eq!(client.auth_type().as_deref(), Some("oauth2"));
//! assert!(!client.debug_mode());
//! ```

mod partition;
mod value;

pub use partition::{
    is_transport_key, partition, ClientOptions, TransportOptions, API_DESCRIPTION, AUTH_TYPE,
    DEBUG, DEBUG_LOGGER, TRANSPORT_OPTION_KEYS,
};
pub use value::{ClientConfig, ConfigValue};
