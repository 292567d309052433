//! Send handlers: the component that puts a request on the wire.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use tracing::debug;

use super::{HttpRequest, HttpResponse};
use crate::error::ClientError;

/// Default request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// A boxed future, used where trait methods need to be async.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Sends a request and returns whatever the server answered.
///
/// A handler reports transport failures only; non-2xx responses are returned
/// as responses and classified by the caller.
pub trait Handler: Send + Sync + fmt::Debug {
    /// Sends `request`.
    fn handle<'a>(&'a self, request: &'a HttpRequest)
        -> BoxFuture<'a, Result<HttpResponse, ClientError>>;
}

/// The default handler, backed by a pooled `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestHandler {
    client: reqwest::Client,
    timeout: Duration,
}

impl ReqwestHandler {
    /// Creates a handler with the default timeout.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new() -> Result<Self, ClientError> {
        Self::with_timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    /// Creates a handler whose requests time out after `timeout`.
    ///
    /// ## Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn with_timeout(timeout: Duration) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(10)
            .build()
            .map_err(ClientError::Request)?;
        Ok(Self { client, timeout })
    }

    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ClientError> {
        let mut builder = self
            .client
            .request(request.method().to_reqwest(), request.full_url());
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }
        let timeout = request.timeout().unwrap_or(self.timeout);
        if let Some(per_request) = request.timeout() {
            builder = builder.timeout(per_request);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                ClientError::Timeout {
                    duration_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }
            } else {
                ClientError::Request(e)
            }
        })?;

        let status = response.status().as_u16();
        let headers: Vec<(String, String)> = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.bytes().await.map_err(ClientError::Request)?;
        debug!(status, bytes = body.len(), "Received response");

        let mut received = HttpResponse::new(status, body);
        for (name, value) in headers {
            received = received.with_header(name, value);
        }
        Ok(received)
    }
}

impl Handler for ReqwestHandler {
    fn handle<'a>(
        &'a self,
        request: &'a HttpRequest,
    ) -> BoxFuture<'a, Result<HttpResponse, ClientError>> {
        Box::pin(self.send(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::RestMethod;
    use url::Url;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_reqwest_handler_sends_query_and_headers() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/count.json"))
            .and(query_param("url", "http://www.google.com"))
            .and(header("x-trace", "1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"count": 1})),
            )
            .mount(&mock_server)
            .await;

        let url = Url::parse(&mock_server.uri()).unwrap().join("count.json").unwrap();
        let mut request = HttpRequest::new(RestMethod::Get, url);
        request.add_query("url", "http://www.google.com");
        request.set_header("X-Trace", "1");

        let handler = ReqwestHandler::new().unwrap();
        let response = handler.handle(&request).await.unwrap();

        assert_eq!(response.status(), 200);
        assert!(response.is_json());
        assert_eq!(response.json().unwrap()["count"], 1);
    }

    #[tokio::test]
    async fn test_reqwest_handler_returns_error_statuses() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&mock_server)
            .await;

        let url = Url::parse(&mock_server.uri()).unwrap();
        let request = HttpRequest::new(RestMethod::Get, url);
        let response = ReqwestHandler::new().unwrap().handle(&request).await.unwrap();

        assert_eq!(response.status(), 500);
        assert_eq!(response.text(), "boom");
    }

    #[tokio::test]
    async fn test_reqwest_handler_timeout() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&mock_server)
            .await;

        let url = Url::parse(&mock_server.uri()).unwrap();
        let mut request = HttpRequest::new(RestMethod::Get, url);
        request.set_timeout(Duration::from_millis(50));

        let err = ReqwestHandler::new()
            .unwrap()
            .handle(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Timeout { duration_ms: 50 }));
    }
}
