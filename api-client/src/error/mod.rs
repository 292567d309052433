//! Layered error types for the API client.
//!
//! The error hierarchy separates construction failures from call failures:
//! - [`ApiError`] - Top-level error type returned by every fallible operation
//! - [`AuthError`] - Authenticator lookup and server-side auth rejections
//! - [`DescriptionError`] - API description resolution failures
//! - [`ConfigError`] - Unusable configuration values
//! - [`ClientError`] - HTTP transport and network errors
//! - [`ValidationError`] - Operation parameter and response body errors

mod api_error;
mod auth_error;
mod client_error;
mod config_error;
mod description_error;
mod validation_error;

pub use api_error::ApiError;
pub use auth_error::AuthError;
pub use client_error::ClientError;
pub use config_error::ConfigError;
pub use description_error::DescriptionError;
pub use validation_error::ValidationError;
