//! Bootstrap layer for description-driven HTTP API clients.
//!
//! A client type declares a [`ClientProfile`](client::ClientProfile): the API
//! description it uses, the authenticators it supports by name and its
//! default options. Constructing an [`ApiClient`] from a profile and a
//! [`ClientConfig`] map
//!
//! - splits the map into transport options and client options,
//! - builds the HTTP transport,
//! - attaches a debug logger when `debug` is `true`,
//! - attaches the authenticator named by `authType`,
//! - resolves and loads the API description exactly once.
//!
//! The constructed client then calls described operations by name.
//!
//! ## Features
//!
//! - **Falsy-as-unset options**: `""`, `"0"`, `false`, `0`, null and empty
//!   collections count as not configured
//! - **Named registries**: authenticators and descriptions are looked up by
//!   name, with distinct errors for unknown names
//! - **Lifecycle listeners**: `before`, `complete` and `error` events on a
//!   shareable [`Emitter`](transport::Emitter)
//! - **Layered error handling**: [`ApiError`] wraps per-concern error types
//!
//! ## Example
//!
//! ```rust,ignore
//! use api_client::{ApiClient, ClientConfig};
//! use serde_json::json;
//!
//! let client = ApiClient::for_type::<MyApi>(
//!     ClientConfig::new().with("authType", "oauth2").with("debug", true),
//! )?;
//! let count = client.call("count", json!({"url": "http://www.google.com"})).await?;
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod debug;
pub mod description;
pub mod error;
pub mod transport;

// Re-exports for convenience
pub use auth::{Authenticator, AuthenticatorRegistry};
pub use client::{ApiClient, ClientContext, ClientProfile, ClientType};
pub use config::{ClientConfig, ConfigValue};
pub use description::{ApiDescription, Description, RestMethod};
pub use error::{
    ApiError, AuthError, ClientError, ConfigError, DescriptionError, ValidationError,
};

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_send_sync<T: Send + Sync>() {}

    #[test]
    fn test_public_types_are_send_sync() {
        assert_send_sync::<ApiClient>();
        assert_send_sync::<ClientProfile>();
        assert_send_sync::<Description>();
        assert_send_sync::<ClientConfig>();
        assert_send_sync::<ApiError>();
    }
}
