//! HTTP transport.
//!
//! The [`Transport`] is built from the [`TransportOptions`] projection of a
//! client configuration. It owns an [`Emitter`] for lifecycle listeners, a
//! [`Handler`] that performs the send and a [`MessageFactory`] that turns
//! described operations into requests. Each option can be replaced through
//! configuration:
//!
//! | Option            | Accepted value                                   |
//! |-------------------|--------------------------------------------------|
//! | `base_url`        | URL string, overrides the description's base URL |
//! | `defaults`        | map of `headers`, `query`, `auth`, `timeout`     |
//! | `emitter`         | an [`Emitter`] handle to share                   |
//! | `handler`         | a [`Handler`]                                    |
//! | `message_factory` | a [`MessageFactory`]                             |
//!
//! Empty values fall back to the built-in behaviour.

mod emitter;
mod handler;
mod message;

pub use emitter::{
    BeforeEvent, CompleteEvent, Emitter, ErrorEvent, RequestEvent, Subscriber,
};
pub use handler::{BoxFuture, Handler, ReqwestHandler, DEFAULT_TIMEOUT_SECS};
pub use message::{DescriptionMessageFactory, HttpRequest, HttpResponse, MessageFactory};

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, Span};
use url::Url;

use crate::client::ClientContext;
use crate::config::{ConfigValue, TransportOptions};
use crate::error::{ApiError, AuthError, ClientError, ConfigError};

// ============================================================================
// RequestDefaults
// ============================================================================

/// Values applied to every request that does not set them itself.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestDefaults {
    /// Headers added when absent.
    pub headers: BTreeMap<String, String>,
    /// Query pairs added when absent.
    pub query: BTreeMap<String, String>,
    /// Auth scheme marked on requests.
    pub auth: Option<String>,
    /// Per-request timeout.
    pub timeout: Option<Duration>,
}

fn string_map(
    key: &'static str,
    value: Option<&ConfigValue>,
) -> Result<BTreeMap<String, String>, ConfigError> {
    let Some(value) = value.filter(|v| !v.is_empty()) else {
        return Ok(BTreeMap::new());
    };
    let entries = value
        .as_map()
        .ok_or_else(|| ConfigError::invalid_option(key, "a map of scalar values"))?;
    entries
        .iter()
        .map(|(k, v)| {
            v.to_text()
                .map(|text| (k.clone(), text))
                .ok_or_else(|| ConfigError::invalid_option(key, "a map of scalar values"))
        })
        .collect()
}

impl RequestDefaults {
    /// Reads the `defaults` transport option.
    ///
    /// An empty value, list or map means no defaults.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidOption`] for values of the wrong kind.
    pub fn from_option(value: Option<&ConfigValue>) -> Result<Self, ConfigError> {
        let Some(value) = value.filter(|v| !v.is_empty()) else {
            return Ok(Self::default());
        };
        let entries = value
            .as_map()
            .ok_or_else(|| ConfigError::invalid_option("defaults", "a map of request defaults"))?;

        let auth = match entries.get("auth").filter(|v| !v.is_empty()) {
            None => None,
            Some(ConfigValue::Str(scheme)) => Some(scheme.clone()),
            Some(_) => return Err(ConfigError::invalid_option("defaults.auth", "a string")),
        };
        let timeout = match entries.get("timeout").filter(|v| !v.is_empty()) {
            None => None,
            Some(v) => match v.as_f64() {
                Some(secs) if secs.is_finite() && secs > 0.0 => Some(Duration::from_secs_f64(secs)),
                _ => {
                    return Err(ConfigError::invalid_option(
                        "defaults.timeout",
                        "a positive number of seconds",
                    ))
                }
            },
        };

        Ok(Self {
            headers: string_map("defaults.headers", entries.get("headers"))?,
            query: string_map("defaults.query", entries.get("query"))?,
            auth,
            timeout,
        })
    }

    fn apply(&self, request: &mut HttpRequest) {
        for (name, value) in &self.headers {
            if request.header(name).is_none() {
                request.set_header(name.clone(), value.clone());
            }
        }
        for (key, value) in &self.query {
            if request.query_value(key).is_none() {
                request.add_query(key.clone(), value.clone());
            }
        }
        if let (None, Some(auth)) = (request.auth(), &self.auth) {
            request.set_auth(auth.clone());
        }
        if let (None, Some(timeout)) = (request.timeout(), self.timeout) {
            request.set_timeout(timeout);
        }
    }
}

// ============================================================================
// Transport
// ============================================================================

/// The HTTP transport a client sends its operations through.
#[derive(Debug)]
pub struct Transport {
    options: TransportOptions,
    base_url: Option<Url>,
    defaults: RequestDefaults,
    emitter: Emitter,
    handler: Arc<dyn Handler>,
    message_factory: Arc<dyn MessageFactory>,
}

impl Transport {
    /// Builds a transport from its configuration projection.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError`] if an option holds an unusable value or the
    /// default handler cannot be constructed.
    pub fn new(options: TransportOptions) -> Result<Self, ApiError> {
        let base_url = match options.get_set("base_url") {
            None => None,
            Some(ConfigValue::Str(raw)) => Some(Url::parse(raw).map_err(ConfigError::from)?),
            Some(_) => return Err(ConfigError::invalid_option("base_url", "a URL string").into()),
        };
        let defaults = RequestDefaults::from_option(options.get("defaults"))?;
        let emitter = match options.get_set("emitter") {
            None => Emitter::new(),
            Some(ConfigValue::Emitter(emitter)) => emitter.clone(),
            Some(_) => {
                return Err(ConfigError::invalid_option("emitter", "an Emitter handle").into())
            }
        };
        let handler: Arc<dyn Handler> = match options.get_set("handler") {
            None => Arc::new(ReqwestHandler::new().map_err(ConfigError::DefaultHandler)?),
            Some(ConfigValue::Handler(handler)) => Arc::clone(handler),
            Some(_) => return Err(ConfigError::invalid_option("handler", "a send handler").into()),
        };
        let message_factory: Arc<dyn MessageFactory> = match options.get_set("message_factory") {
            None => Arc::new(DescriptionMessageFactory),
            Some(ConfigValue::MessageFactory(factory)) => Arc::clone(factory),
            Some(_) => {
                return Err(
                    ConfigError::invalid_option("message_factory", "a message factory").into(),
                );
            }
        };

        debug!(
            base_url = base_url.as_ref().map(Url::as_str),
            shared_emitter = options.exists("emitter"),
            "Created transport"
        );

        Ok(Self {
            options,
            base_url,
            defaults,
            emitter,
            handler,
            message_factory,
        })
    }

    /// The options this transport was built from.
    pub fn options(&self) -> &TransportOptions {
        &self.options
    }

    /// The lifecycle emitter.
    pub fn emitter(&self) -> &Emitter {
        &self.emitter
    }

    /// The configured base URL, if any.
    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Request defaults.
    pub fn defaults(&self) -> &RequestDefaults {
        &self.defaults
    }

    /// The default auth scheme marked on every request.
    pub fn default_auth(&self) -> Option<&str> {
        self.defaults.auth.as_deref()
    }

    /// Sets the default auth scheme.
    pub fn set_default_auth(&mut self, scheme: impl Into<String>) {
        self.defaults.auth = Some(scheme.into());
    }

    /// The factory that builds requests for operations.
    pub fn message_factory(&self) -> &dyn MessageFactory {
        self.message_factory.as_ref()
    }

    /// Sends `request` for `operation`, running lifecycle listeners.
    ///
    /// Defaults are applied first, then `before` listeners may modify the
    /// request. A 2xx response emits `complete`; anything else emits `error`
    /// and is returned as an error.
    ///
    /// ## Errors
    ///
    /// - [`AuthError::AuthenticationFailed`] for 401
    /// - [`AuthError::InsufficientPermissions`] for 403
    /// - [`ClientError::HttpStatus`] for other non-2xx statuses
    /// - [`ClientError`] if the handler fails
    pub async fn send(
        &self,
        operation: &str,
        mut request: HttpRequest,
        client: &ClientContext,
    ) -> Result<HttpResponse, ApiError> {
        self.defaults.apply(&mut request);
        self.emitter
            .emit_before(&mut BeforeEvent::new(operation, &mut request, client));

        let full_url = request.full_url();
        Span::current().record("http.url", full_url.as_str());
        debug!(operation, method = %request.method(), "Sending request");

        let response = match self.handler.handle(&request).await {
            Ok(response) => response,
            Err(e) => {
                Span::current().record("otel.status_code", "ERROR");
                let error = ApiError::from(e);
                self.emitter.emit_error(&ErrorEvent {
                    operation,
                    request: &request,
                    response: None,
                    error: &error,
                    client,
                });
                return Err(error);
            }
        };

        let status = response.status();
        Span::current().record("http.status_code", status);

        if !response.is_success() {
            let otel_status = if status >= 500 { "ERROR" } else { "UNSET" };
            Span::current().record("otel.status_code", otel_status);

            let message = match response.text() {
                text if text.is_empty() => response.reason().unwrap_or_default().to_string(),
                text => text,
            };
            let error: ApiError = match status {
                401 => AuthError::AuthenticationFailed { message }.into(),
                403 => AuthError::InsufficientPermissions {
                    operation: operation.to_string(),
                }
                .into(),
                _ => ClientError::HttpStatus { status, message }.into(),
            };
            self.emitter.emit_error(&ErrorEvent {
                operation,
                request: &request,
                response: Some(&response),
                error: &error,
                client,
            });
            return Err(error);
        }

        Span::current().record("otel.status_code", "OK");
        self.emitter.emit_complete(&CompleteEvent {
            operation,
            request: &request,
            response: &response,
            client,
        });
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{partition, ClientConfig, ClientOptions};
    use crate::description::RestMethod;
    use std::sync::Mutex;

    #[derive(Debug)]
    struct StaticHandler {
        status: u16,
        seen: Mutex<Vec<String>>,
    }

    impl StaticHandler {
        fn new(status: u16) -> Self {
            Self {
                status,
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    impl Handler for StaticHandler {
        fn handle<'a>(
            &'a self,
            request: &'a HttpRequest,
        ) -> BoxFuture<'a, Result<HttpResponse, ClientError>> {
            self.seen.lock().unwrap().push(request.full_url().to_string());
            let status = self.status;
            Box::pin(async move { Ok(HttpResponse::new(status, "")) })
        }
    }

    #[derive(Debug, Default)]
    struct ErrorCounter(Mutex<Vec<u16>>);

    impl Subscriber for ErrorCounter {
        fn name(&self) -> &str {
            "errors"
        }

        fn events(&self) -> &[RequestEvent] {
            &[RequestEvent::Error]
        }

        fn on_error(&self, event: &ErrorEvent<'_>) {
            let status = event.response.map(HttpResponse::status).unwrap_or_default();
            self.0.lock().unwrap().push(status);
        }
    }

    fn transport(config: ClientConfig) -> Result<Transport, ApiError> {
        let (options, _) = partition(config);
        Transport::new(options)
    }

    fn request() -> HttpRequest {
        HttpRequest::new(RestMethod::Get, Url::parse("http://example.com/count.json").unwrap())
    }

    #[test]
    fn test_empty_options_use_builtins() {
        let transport = transport(
            ClientConfig::new()
                .with("base_url", "")
                .with("defaults", ConfigValue::List(vec![])),
        )
        .unwrap();

        assert!(transport.base_url().is_none());
        assert_eq!(transport.defaults(), &RequestDefaults::default());
        assert_eq!(transport.emitter().listener_count(), 0);
        assert_eq!(transport.options().len(), 2);
    }

    #[test]
    fn test_shared_emitter_is_used() {
        let emitter = Emitter::new();
        let transport = transport(ClientConfig::new().with("emitter", emitter.clone())).unwrap();
        assert!(transport.emitter().same_as(&emitter));
    }

    #[test]
    fn test_invalid_option_values() {
        let err = transport(ClientConfig::new().with("base_url", "foo")).unwrap_err();
        assert!(matches!(err, ApiError::Config(ConfigError::InvalidUrl(_))));

        let err = transport(ClientConfig::new().with("emitter", "baz")).unwrap_err();
        assert!(err.to_string().contains("'emitter'"));

        let err = transport(ClientConfig::new().with("defaults", "nope")).unwrap_err();
        assert!(matches!(err, ApiError::Config(ConfigError::InvalidOption { .. })));
    }

    #[test]
    fn test_defaults_parsing() {
        let config = ClientConfig::from_json(serde_json::json!({
            "defaults": {
                "headers": {"Accept": "application/json"},
                "query": {"v": 2},
                "auth": "oauth2",
                "timeout": 1.5
            }
        }))
        .unwrap();
        let transport = transport(config).unwrap();

        let defaults = transport.defaults();
        assert_eq!(defaults.headers["Accept"], "application/json");
        assert_eq!(defaults.query["v"], "2");
        assert_eq!(transport.default_auth(), Some("oauth2"));
        assert_eq!(defaults.timeout, Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_defaults_do_not_override_request_values() {
        let mut defaults = RequestDefaults::default();
        defaults.headers.insert("Accept".into(), "text/plain".into());
        defaults.query.insert("v".into(), "2".into());
        defaults.auth = Some("oauth2".into());

        let mut request = request();
        request.set_header("accept", "application/json");
        defaults.apply(&mut request);

        assert_eq!(request.header("Accept"), Some("application/json"));
        assert_eq!(request.query_value("v"), Some("2"));
        assert_eq!(request.auth(), Some("oauth2"));
    }

    #[tokio::test]
    async fn test_send_maps_statuses_and_emits_errors() {
        let context = ClientContext::new("test", ClientOptions::default());
        let counter = Arc::new(ErrorCounter::default());

        for (status, check) in [
            (401, "Authentication failed"),
            (403, "Insufficient permissions: count"),
            (404, "HTTP 404: Not Found"),
        ] {
            let emitter = Emitter::new();
            emitter.attach(Arc::clone(&counter) as Arc<dyn Subscriber>);
            let transport = transport(
                ClientConfig::new()
                    .with("emitter", emitter)
                    .with("handler", ConfigValue::handler(StaticHandler::new(status))),
            )
            .unwrap();

            let err = transport.send("count", request(), &context).await.unwrap_err();
            assert!(err.to_string().contains(check), "{err}");
        }

        assert_eq!(*counter.0.lock().unwrap(), vec![401, 403, 404]);
    }

    #[tokio::test]
    async fn test_send_applies_defaults_before_listeners() {
        let handler = Arc::new(StaticHandler::new(200));
        let transport = transport(
            ClientConfig::from_json(serde_json::json!({"defaults": {"query": {"v": "2"}}}))
                .unwrap()
                .with("handler", ConfigValue::Handler(handler.clone())),
        )
        .unwrap();
        let context = ClientContext::new("test", ClientOptions::default());

        let response = transport.send("count", request(), &context).await.unwrap();

        assert_eq!(response.status(), 200);
        assert_eq!(
            handler.seen.lock().unwrap().as_slice(),
            ["http://example.com/count.json?v=2"]
        );
    }
}
