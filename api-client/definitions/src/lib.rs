//! API client definitions
//!
//! Concrete client types built on `api-client`. Each API lives in its own
//! module and declares its description, authenticators and profile.
//!
//! ## Available APIs
//!
//! - [`twitter_urls`] - Twitter URLs share count API
//!
//! ## Examples
//!
//! ```
//! use api_client::client::ClientType;
//! use api_client_definitions::twitter_urls::TwitterUrls;
//!
//! let profile = TwitterUrls::profile();
//! assert_eq!(profile.name(), "twitter_urls");
//! assert!(profile.authenticators().contains("oauth2"));
//! ```

pub mod prelude;
pub mod twitter_urls;

pub use twitter_urls::TwitterUrlsClient;
