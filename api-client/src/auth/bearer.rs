//! Bearer token authentication.

use reqwest::header::AUTHORIZATION;
use tracing::warn;

use super::Authenticator;
use crate::client::ClientContext;
use crate::transport::BeforeEvent;

/// Client option holding the bearer token.
pub const ACCESS_TOKEN: &str = "accessToken";

/// Sends the `accessToken` client option as an `Authorization: Bearer` header.
///
/// Register it under any name; it signs requests marked with the auth type
/// the client was constructed with.
#[derive(Debug, Clone)]
pub struct BearerTokenAuthenticator {
    scheme: String,
    token: Option<String>,
}

impl BearerTokenAuthenticator {
    /// Signs requests marked `scheme` with `token`.
    pub fn new(scheme: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            token: Some(token.into()),
        }
    }

    /// [`AuthenticatorFactory`](super::AuthenticatorFactory) reading the token
    /// from the client's options.
    pub fn from_context(context: &ClientContext) -> Box<dyn Authenticator> {
        let token = context
            .option(ACCESS_TOKEN)
            .and_then(|value| value.to_text());
        if token.is_none() {
            warn!(option = ACCESS_TOKEN, "Bearer authenticator has no token; requests go unsigned");
        }
        Box::new(Self {
            scheme: context.auth_type().unwrap_or_default().to_string(),
            token,
        })
    }
}

impl Authenticator for BearerTokenAuthenticator {
    fn sign(&self, event: &mut BeforeEvent<'_>) {
        let Some(token) = &self.token else {
            return;
        };
        if event.request_has_auth(&self.scheme) {
            event
                .request_mut()
                .set_header(AUTHORIZATION.as_str(), format!("Bearer {token}"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{partition, ClientConfig};
    use crate::description::RestMethod;
    use crate::transport::HttpRequest;
    use url::Url;

    fn request(auth: Option<&str>) -> HttpRequest {
        let mut request =
            HttpRequest::new(RestMethod::Get, Url::parse("http://example.com/me").unwrap());
        if let Some(auth) = auth {
            request.set_auth(auth);
        }
        request
    }

    #[test]
    fn test_from_context_reads_token() {
        let (_, options) = partition(ClientConfig::new().with(ACCESS_TOKEN, "test-token"));
        let context = ClientContext::new("test", options).with_auth_type("bearer");
        let authenticator = BearerTokenAuthenticator::from_context(&context);

        let mut request = request(Some("bearer"));
        authenticator.sign(&mut BeforeEvent::new("me", &mut request, &context));
        assert_eq!(request.header("authorization"), Some("Bearer test-token"));
    }

    #[test]
    fn test_other_schemes_are_not_signed() {
        let (_, options) = partition(ClientConfig::new());
        let context = ClientContext::new("test", options);
        let authenticator = BearerTokenAuthenticator::new("bearer", "test-token");

        let mut request = request(Some("oauth2"));
        authenticator.sign(&mut BeforeEvent::new("me", &mut request, &context));
        assert_eq!(request.header("authorization"), None);
    }

    #[test]
    #[tracing_test::traced_test]
    fn test_missing_token_warns() {
        let (_, options) = partition(ClientConfig::new());
        let context = ClientContext::new("test", options).with_auth_type("bearer");
        let authenticator = BearerTokenAuthenticator::from_context(&context);

        let mut request = request(Some("bearer"));
        authenticator.sign(&mut BeforeEvent::new("me", &mut request, &context));
        assert_eq!(request.header("authorization"), None);
        assert!(logs_contain("Bearer authenticator has no token"));
    }
}
