//! Convenient re-exports for working with the API clients.
//!
//! ## Examples
//!
//! ```
//! use api_client_definitions::prelude::*;
//!
//! let client = TwitterUrlsClient::new(ClientConfig::new())?;
//! assert_eq!(client.api_client().description().name, "Twitter URLs");
//! # Ok::<(), ApiError>(())
//! ```

// Client types
pub use crate::twitter_urls::{TwitterUrls, TwitterUrlsClient};

// Response types
pub use crate::twitter_urls::UrlCount;

// Core types needed to configure a client
pub use api_client::{ApiError, ClientConfig, ConfigValue};
