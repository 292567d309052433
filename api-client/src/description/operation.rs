//! Operation, parameter and model definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

use crate::error::ValidationError;

/// HTTP methods an operation can use.
///
/// ## Examples
///
/// ```rust
/// use api_client::RestMethod;
///
/// let parsed: RestMethod = "GET".parse().unwrap();
/// assert_eq!(parsed, RestMethod::Get);
/// assert_eq!(RestMethod::Delete.to_string(), "DELETE");
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "UPPERCASE")]
#[strum(serialize_all = "UPPERCASE")]
pub enum RestMethod {
    /// HTTP GET
    #[default]
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP PATCH
    Patch,
    /// HTTP DELETE
    Delete,
    /// HTTP HEAD
    Head,
    /// HTTP OPTIONS
    Options,
}

impl RestMethod {
    /// Converts to the equivalent `reqwest::Method`.
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
            Self::Put => reqwest::Method::PUT,
            Self::Patch => reqwest::Method::PATCH,
            Self::Delete => reqwest::Method::DELETE,
            Self::Head => reqwest::Method::HEAD,
            Self::Options => reqwest::Method::OPTIONS,
        }
    }
}

/// Declared type of a parameter or model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// A JSON string.
    String,
    /// A whole number.
    Integer,
    /// Any JSON number.
    Number,
    /// `true` or `false`.
    Boolean,
    /// A JSON object.
    Object,
    /// A JSON array.
    Array,
    /// Anything goes.
    #[default]
    Any,
}

impl ParameterType {
    /// Returns `true` if `value` is acceptable for this type.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Any => true,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::String => "a string",
            Self::Integer => "an integer",
            Self::Number => "a number",
            Self::Boolean => "a boolean",
            Self::Object => "an object",
            Self::Array => "an array",
            Self::Any => "any value",
        }
    }
}

/// Where a parameter is placed in the outgoing request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterLocation {
    /// Substituted into the `{name}` placeholder of the URI template.
    Uri,
    /// Appended as a query string pair.
    Query,
    /// Sent as a request header.
    Header,
    /// Added as a field of the JSON request body.
    Json,
}

/// A single operation parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Parameter {
    /// Declared value type.
    #[serde(rename = "type", default)]
    pub kind: ParameterType,
    /// Placement in the request.
    pub location: ParameterLocation,
    /// Whether the caller must supply a value.
    #[serde(default)]
    pub required: bool,
    /// Value used when the caller supplies none.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Wire name, when it differs from the parameter name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sent_as: Option<String>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl Parameter {
    /// Creates an optional parameter of `kind` placed at `location`.
    pub fn new(kind: ParameterType, location: ParameterLocation) -> Self {
        Self {
            kind,
            location,
            required: false,
            default: None,
            sent_as: None,
            description: None,
        }
    }

    /// Marks the parameter as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Sets the wire name.
    pub fn sent_as(mut self, name: impl Into<String>) -> Self {
        self.sent_as = Some(name.into());
        self
    }

    /// Sets the default value.
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Name used on the wire for the parameter called `name`.
    pub fn wire_name<'a>(&'a self, name: &'a str) -> &'a str {
        self.sent_as.as_deref().unwrap_or(name)
    }

    /// Checks `value` against the declared type.
    ///
    /// ## Errors
    ///
    /// Returns [`ValidationError::InvalidParameter`] on a type mismatch.
    pub fn check(&self, operation: &str, name: &str, value: &Value) -> Result<(), ValidationError> {
        if self.kind.accepts(value) {
            return Ok(());
        }
        Err(ValidationError::InvalidParameter {
            operation: operation.to_string(),
            parameter: name.to_string(),
            expected: self.kind.label().to_string(),
        })
    }
}

/// A single described operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Operation {
    /// HTTP method.
    pub http_method: RestMethod,
    /// URI template, relative to the base URL (may contain `{param}` placeholders).
    pub uri: String,
    /// Name of the model describing the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_model: Option<String>,
    /// Parameters keyed by name.
    #[serde(default)]
    pub parameters: BTreeMap<String, Parameter>,
    /// Short description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Operation {
    /// Creates an operation without parameters.
    pub fn new(http_method: RestMethod, uri: impl Into<String>) -> Self {
        Self {
            http_method,
            uri: uri.into(),
            response_model: None,
            parameters: BTreeMap::new(),
            summary: None,
        }
    }

    /// Adds a parameter.
    pub fn param(mut self, name: impl Into<String>, parameter: Parameter) -> Self {
        self.parameters.insert(name.into(), parameter);
        self
    }

    /// Sets the response model name.
    pub fn response_model(mut self, model: impl Into<String>) -> Self {
        self.response_model = Some(model.into());
        self
    }

    /// Placeholder names in the URI template, in order of appearance.
    pub fn uri_placeholders(&self) -> Vec<&str> {
        let mut names = Vec::new();
        let mut rest = self.uri.as_str();
        while let Some(start) = rest.find('{') {
            let Some(len) = rest[start + 1..].find('}') else {
                break;
            };
            let name = &rest[start + 1..start + 1 + len];
            if !name.is_empty() {
                names.push(name);
            }
            rest = &rest[start + 2 + len..];
        }
        names
    }
}

/// Where a model's properties are read from in the response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseLocation {
    /// Decoded from a JSON body.
    Json,
    /// The raw body text.
    Body,
}

/// Catch-all property rule of a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelProperties {
    /// Where undeclared properties come from.
    pub location: ResponseLocation,
}

/// A response model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Model {
    /// Declared type.
    #[serde(rename = "type", default)]
    pub kind: ParameterType,
    /// Rule for undeclared properties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<ModelProperties>,
}

impl Model {
    /// An object model whose properties all come from the JSON body.
    pub fn json_object() -> Self {
        Self {
            kind: ParameterType::Object,
            additional_properties: Some(ModelProperties {
                location: ResponseLocation::Json,
            }),
        }
    }

    /// Returns `true` if responses of this model are decoded as JSON.
    pub fn decodes_json(&self) -> bool {
        matches!(
            self.additional_properties,
            Some(ModelProperties {
                location: ResponseLocation::Json
            })
        )
    }
}
