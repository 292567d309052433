//! OAuth2 request signing for the URLs API.

use api_client::auth::{ACCESS_TOKEN, Authenticator};
use api_client::client::ClientContext;
use api_client::transport::BeforeEvent;
use tracing::warn;

/// Auth type name the authenticator is registered under.
pub const OAUTH2: &str = "oauth2";

/// Token used when the client has no `accessToken` option.
pub const DEFAULT_ACCESS_TOKEN: &str = "token_value";

/// Appends `access_token=<token>` to requests marked with the `oauth2` auth
/// option. The token is read from the client's `accessToken` option and
/// falls back to [`DEFAULT_ACCESS_TOKEN`].
#[derive(Debug, Clone)]
pub struct TwitterUrlsOauthAuthenticator {
    token: String,
}

impl TwitterUrlsOauthAuthenticator {
    /// Signs with `token`.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Builds the authenticator for a client.
    pub fn from_context(context: &ClientContext) -> Box<dyn Authenticator> {
        let token = context
            .option(ACCESS_TOKEN)
            .and_then(|value| value.to_text())
            .unwrap_or_else(|| {
                warn!(
                    option = ACCESS_TOKEN,
                    "No access token configured; signing with the default token"
                );
                DEFAULT_ACCESS_TOKEN.to_string()
            });
        Box::new(Self { token })
    }

    /// The token appended to signed requests.
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Default for TwitterUrlsOauthAuthenticator {
    fn default() -> Self {
        Self::new(DEFAULT_ACCESS_TOKEN)
    }
}

impl Authenticator for TwitterUrlsOauthAuthenticator {
    fn sign(&self, event: &mut BeforeEvent<'_>) {
        if event.request_has_auth(OAUTH2) {
            event.request_mut().add_query("access_token", self.token.clone());
        }
    }
}
