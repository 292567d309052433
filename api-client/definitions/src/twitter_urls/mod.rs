//! Twitter URLs count API.
//!
//! A single-operation API: `count` returns how often a URL was shared.
//! The endpoint is `http://urls.api.twitter.com/1/urls/count.json`.
//!
//! ## Operations
//!
//! - `count` - GET count.json?url={url}

mod authenticator;

pub use authenticator::{DEFAULT_ACCESS_TOKEN, OAUTH2, TwitterUrlsOauthAuthenticator};

use std::sync::{Arc, LazyLock};

use api_client::client::{ApiClient, ClientProfile, ClientType};
use api_client::description::{
    ApiDescription, Description, Model, Operation, Parameter, ParameterLocation, ParameterType,
};
use api_client::{ApiError, ClientConfig, DescriptionError, RestMethod, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Name the description is registered under.
pub const DESCRIPTION: &str = "twitter_urls";

/// Base URL of the API.
pub const BASE_URL: &str = "http://urls.api.twitter.com/1/urls/";

/// Response of the `count` operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UrlCount {
    /// Number of shares.
    pub count: u64,
    /// The URL as normalized by the service.
    pub url: String,
}

/// Description of the URLs API.
#[derive(Debug, Clone, Copy, Default)]
pub struct TwitterUrlsDescription;

impl TwitterUrlsDescription {
    /// Factory for the profile's description registry.
    pub fn factory(_: &ClientConfig) -> Arc<dyn ApiDescription> {
        Arc::new(Self)
    }
}

impl ApiDescription for TwitterUrlsDescription {
    fn load(&self) -> Result<Description, DescriptionError> {
        let mut description = Description::new("Twitter URLs")
            .base_url(BASE_URL)
            .operation(
                "count",
                Operation::new(RestMethod::Get, "count.json")
                    .param(
                        "url",
                        Parameter::new(ParameterType::String, ParameterLocation::Query).required(),
                    )
                    .response_model("JsonResponse"),
            )
            .model("JsonResponse", Model::json_object());
        description.additional_properties = true;
        Ok(description)
    }
}

static PROFILE: LazyLock<ClientProfile> = LazyLock::new(|| {
    ClientProfile::new("twitter_urls")
        .with_default_description(DESCRIPTION)
        .description(DESCRIPTION, TwitterUrlsDescription::factory)
        .authenticator(OAUTH2, TwitterUrlsOauthAuthenticator::from_context)
});

/// Marker type carrying the URLs API profile.
#[derive(Debug, Clone, Copy)]
pub struct TwitterUrls;

impl ClientType for TwitterUrls {
    fn profile() -> &'static ClientProfile {
        &PROFILE
    }
}

/// Client for the URLs API.
///
/// ## Examples
///
/// ```rust
/// use api_client::ClientConfig;
/// use api_client_definitions::twitter_urls::TwitterUrlsClient;
///
/// let client = TwitterUrlsClient::new(ClientConfig::new().with("authType", "oauth2"))?;
/// assert_eq!(client.api_client().auth_type(), Some("oauth2"));
/// # Ok::<(), api_client::ApiError>(())
/// ```
#[derive(Debug)]
pub struct TwitterUrlsClient {
    inner: ApiClient,
}

impl TwitterUrlsClient {
    /// Constructs a client.
    ///
    /// ## Errors
    ///
    /// See [`ApiClient::new`].
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            inner: ApiClient::for_type::<TwitterUrls>(config)?,
        })
    }

    /// The underlying client.
    pub fn api_client(&self) -> &ApiClient {
        &self.inner
    }

    /// Share count for `url`.
    ///
    /// ## Errors
    ///
    /// Returns an error if the call fails or the response is not a count.
    pub async fn count(&self, url: &str) -> Result<UrlCount, ApiError> {
        let response = self.inner.call("count", json!({ "url": url })).await?;
        serde_json::from_value(response).map_err(|e| ValidationError::JsonParse(e).into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn description_declares_count_operation() {
        let description = TwitterUrlsDescription.load().unwrap();
        assert_eq!(description.base_url.as_deref(), Some(BASE_URL));
        assert!(description.additional_properties);

        let count = description.get_operation("count").unwrap();
        assert_eq!(count.http_method, RestMethod::Get);
        assert_eq!(count.uri, "count.json");
        assert!(count.parameters["url"].required);
        assert!(description.get_model("JsonResponse").unwrap().decodes_json());
        assert!(description.validate().is_ok());
    }

    #[test]
    fn profile_registers_oauth2() {
        let profile = TwitterUrls::profile();
        assert_eq!(profile.authenticators().names().collect::<Vec<_>>(), vec![OAUTH2]);
        assert!(profile.descriptions().get(DESCRIPTION).is_some());
        assert!(profile.default_auth_type().is_none());
    }
}
