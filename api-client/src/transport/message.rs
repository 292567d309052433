//! Request and response messages, and building requests from operations.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use reqwest::StatusCode;
use serde_json::{Map, Value};
use tracing::debug;
use url::Url;

use crate::description::{Operation, ParameterLocation, RestMethod};
use crate::error::{ApiError, ConfigError, ValidationError};

// ============================================================================
// HttpRequest
// ============================================================================

/// An outgoing request, open to modification until it is sent.
///
/// Query pairs are kept apart from the URL so listeners can add to them;
/// [`full_url`](Self::full_url) produces the URL that goes on the wire.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    method: RestMethod,
    url: Url,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
    auth: Option<String>,
    timeout: Option<Duration>,
}

impl HttpRequest {
    /// Creates a request with no query, headers or body.
    pub fn new(method: RestMethod, url: Url) -> Self {
        Self {
            method,
            url,
            query: Vec::new(),
            headers: Vec::new(),
            body: None,
            auth: None,
            timeout: None,
        }
    }

    /// The HTTP method.
    pub fn method(&self) -> RestMethod {
        self.method
    }

    /// The target URL without the query pairs added to this request.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Appends a query pair.
    pub fn add_query(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.query.push((key.into(), value.into()));
    }

    /// First value of query parameter `key`.
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All query pairs in insertion order.
    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Sets a header, replacing any existing value (names compare case-insensitively).
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(&name));
        self.headers.push((name, value.into()));
    }

    /// Value of header `name`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All headers in insertion order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// The JSON body, if any.
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }

    /// Replaces the JSON body.
    pub fn set_body(&mut self, body: Value) {
        self.body = Some(body);
    }

    /// The auth scheme this request is marked with.
    pub fn auth(&self) -> Option<&str> {
        self.auth.as_deref()
    }

    /// Marks the request with an auth scheme for authenticators to act on.
    pub fn set_auth(&mut self, scheme: impl Into<String>) {
        self.auth = Some(scheme.into());
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    /// Sets the per-request timeout.
    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = Some(timeout);
    }

    /// The URL with every query pair appended.
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &self.query {
                pairs.append_pair(key, value);
            }
        }
        url
    }
}

impl fmt::Display for HttpRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} HTTP/1.1", self.method, self.full_url())?;
        for (name, value) in &self.headers {
            write!(f, "\r\n{name}: {value}")?;
        }
        if let Some(body) = &self.body {
            write!(f, "\r\n\r\n{body}")?;
        }
        Ok(())
    }
}

// ============================================================================
// HttpResponse
// ============================================================================

/// A received response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    status: u16,
    headers: Vec<(String, String)>,
    body: Bytes,
}

impl HttpResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Returns the response with an added header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Value of header `name` (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All headers in received order.
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Raw body bytes.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Returns `true` if the content type names JSON.
    pub fn is_json(&self) -> bool {
        self.header("content-type")
            .is_some_and(|ct| ct.to_ascii_lowercase().contains("json"))
    }

    /// Canonical reason phrase for the status, if known.
    pub fn reason(&self) -> Option<&'static str> {
        StatusCode::from_u16(self.status)
            .ok()
            .and_then(|s| s.canonical_reason())
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Body decoded as JSON; an empty body decodes to `null`.
    ///
    /// ## Errors
    ///
    /// Returns [`ValidationError::JsonParse`] if the body is not valid JSON.
    pub fn json(&self) -> Result<Value, ValidationError> {
        if self.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_slice(&self.body)?)
    }
}

impl fmt::Display for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP/1.1 {} {}", self.status, self.reason().unwrap_or(""))?;
        for (name, value) in &self.headers {
            write!(f, "\r\n{name}: {value}")?;
        }
        if !self.body.is_empty() {
            write!(f, "\r\n\r\n{}", self.text())?;
        }
        Ok(())
    }
}

// ============================================================================
// MessageFactory
// ============================================================================

/// Builds the request for a described operation.
pub trait MessageFactory: Send + Sync + fmt::Debug {
    /// Creates the request for operation `name` with the caller's `params`.
    ///
    /// ## Errors
    ///
    /// Returns [`ValidationError`] for missing or mistyped parameters and
    /// [`ConfigError::InvalidUrl`] if the URI cannot be joined to `base_url`.
    fn create_request(
        &self,
        name: &str,
        operation: &Operation,
        base_url: &Url,
        params: &Map<String, Value>,
    ) -> Result<HttpRequest, ApiError>;
}

/// The default [`MessageFactory`]: places parameters where the operation
/// declares them.
///
/// - `uri` parameters fill `{name}` placeholders, percent-encoded
/// - `query` parameters become query pairs
/// - `header` parameters become headers
/// - `json` parameters become fields of an object body
///
/// Undeclared parameters are dropped.
#[derive(Debug, Clone, Copy, Default)]
pub struct DescriptionMessageFactory;

fn scalar_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn encode_segment(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes())
        .collect::<String>()
        .replace('+', "%20")
}

impl MessageFactory for DescriptionMessageFactory {
    fn create_request(
        &self,
        name: &str,
        operation: &Operation,
        base_url: &Url,
        params: &Map<String, Value>,
    ) -> Result<HttpRequest, ApiError> {
        for key in params.keys() {
            if !operation.parameters.contains_key(key) {
                debug!(operation = name, parameter = %key, "Dropping undeclared parameter");
            }
        }

        let mut uri = operation.uri.clone();
        let mut query = Vec::new();
        let mut headers = Vec::new();
        let mut body = Map::new();

        for (param_name, param) in &operation.parameters {
            let value = params
                .get(param_name)
                .filter(|v| !v.is_null())
                .or(param.default.as_ref());
            let Some(value) = value else {
                if param.required {
                    return Err(ValidationError::MissingParameter {
                        operation: name.to_string(),
                        parameter: param_name.clone(),
                    }
                    .into());
                }
                continue;
            };
            param.check(name, param_name, value)?;

            let wire = param.wire_name(param_name);
            match param.location {
                ParameterLocation::Uri => {
                    uri = uri.replace(
                        &format!("{{{param_name}}}"),
                        &encode_segment(&scalar_text(value)),
                    );
                }
                ParameterLocation::Query => query.push((wire.to_string(), scalar_text(value))),
                ParameterLocation::Header => headers.push((wire.to_string(), scalar_text(value))),
                ParameterLocation::Json => {
                    body.insert(wire.to_string(), value.clone());
                }
            }
        }

        let url = base_url.join(&uri).map_err(ConfigError::from)?;
        let mut request = HttpRequest::new(operation.http_method, url);
        for (key, value) in query {
            request.add_query(key, value);
        }
        for (key, value) in headers {
            request.set_header(key, value);
        }
        if !body.is_empty() {
            request.set_body(Value::Object(body));
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{Parameter, ParameterType};
    use serde_json::json;

    fn base() -> Url {
        Url::parse("http://urls.example.com/1/urls/").unwrap()
    }

    fn params(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    #[test]
    fn test_query_parameters_and_relative_uri() {
        let operation = Operation::new(RestMethod::Get, "count.json").param(
            "url",
            Parameter::new(ParameterType::String, ParameterLocation::Query).required(),
        );

        let request = DescriptionMessageFactory
            .create_request(
                "count",
                &operation,
                &base(),
                &params(json!({"url": "http://www.google.com"})),
            )
            .unwrap();

        assert_eq!(request.method(), RestMethod::Get);
        assert_eq!(
            request.full_url().as_str(),
            "http://urls.example.com/1/urls/count.json?url=http%3A%2F%2Fwww.google.com"
        );
        assert_eq!(request.query_value("url"), Some("http://www.google.com"));
    }

    #[test]
    fn test_missing_required_parameter() {
        let operation = Operation::new(RestMethod::Get, "count.json").param(
            "url",
            Parameter::new(ParameterType::String, ParameterLocation::Query).required(),
        );

        let err = DescriptionMessageFactory
            .create_request("count", &operation, &base(), &Map::new())
            .unwrap_err();
        assert!(matches!(
            err,
            ApiError::Validation(ValidationError::MissingParameter { .. })
        ));
    }

    #[test]
    fn test_uri_header_and_json_locations() {
        let operation = Operation::new(RestMethod::Post, "users/{id}/notes")
            .param("id", Parameter::new(ParameterType::String, ParameterLocation::Uri).required())
            .param(
                "key",
                Parameter::new(ParameterType::String, ParameterLocation::Header).sent_as("X-Key"),
            )
            .param("text", Parameter::new(ParameterType::String, ParameterLocation::Json))
            .param(
                "tags",
                Parameter::new(ParameterType::Array, ParameterLocation::Json)
                    .default_value(json!([])),
            );

        let request = DescriptionMessageFactory
            .create_request(
                "note",
                &operation,
                &base(),
                &params(json!({"id": "a b", "key": "secret", "text": "hi", "extra": 1})),
            )
            .unwrap();

        assert_eq!(request.url().path(), "/1/urls/users/a%20b/notes");
        assert_eq!(request.header("x-key"), Some("secret"));
        assert_eq!(request.body(), Some(&json!({"text": "hi", "tags": []})));
    }

    #[test]
    fn test_wrong_parameter_type() {
        let operation = Operation::new(RestMethod::Get, "count.json")
            .param("limit", Parameter::new(ParameterType::Integer, ParameterLocation::Query));

        let err = DescriptionMessageFactory
            .create_request("count", &operation, &base(), &params(json!({"limit": "ten"})))
            .unwrap_err();
        assert!(err.to_string().contains("must be an integer"));
    }

    #[test]
    fn test_response_json_and_text() {
        let response = HttpResponse::new(200, r#"{"count": 3}"#)
            .with_header("Content-Type", "application/json; charset=utf-8");
        assert!(response.is_success());
        assert!(response.is_json());
        assert_eq!(response.json().unwrap(), json!({"count": 3}));

        assert_eq!(HttpResponse::new(204, "").json().unwrap(), Value::Null);
        assert!(HttpResponse::new(200, "nope").json().is_err());
    }

    #[test]
    fn test_display_formats() {
        let mut request = HttpRequest::new(RestMethod::Get, base().join("count.json").unwrap());
        request.add_query("url", "x");
        request.set_header("Accept", "application/json");
        assert_eq!(
            request.to_string(),
            "GET http://urls.example.com/1/urls/count.json?url=x HTTP/1.1\r\nAccept: application/json"
        );

        let response = HttpResponse::new(404, "gone");
        assert_eq!(response.to_string(), "HTTP/1.1 404 Not Found\r\n\r\ngone");
    }
}
