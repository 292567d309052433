//! API descriptions.
//!
//! A [`Description`] is the operation catalog a client executes against: base
//! URL, operations keyed by name, and response models. Clients receive one
//! through the [`ApiDescription`] capability, whose [`load`](ApiDescription::load)
//! hook produces the populated description. The [`resolver`] turns whatever
//! the configuration names (an instance, a registered name, or nothing) into a
//! loaded description exactly once.
//!
//! ## Examples
//!
//! ```rust
//! use api_client::description::{
//!     Description, Model, Operation, Parameter, ParameterLocation, ParameterType,
//! };
//! use api_client::RestMethod;
//!
//! let description = Description::new("Urls")
//!     .base_url("https://urls.example.com/1/urls/")
//!     .operation(
//!         "count",
//!         Operation::new(RestMethod::Get, "count.json")
//!             .param(
//!                 "url",
//!                 Parameter::new(ParameterType::String, ParameterLocation::Query).required(),
//!             )
//!             .response_model("JsonResponse"),
//!     )
//!     .model("JsonResponse", Model::json_object());
//!
//! assert!(description.validate().is_ok());
//! ```

mod operation;
pub mod resolver;

pub use operation::{
    Model, ModelProperties, Operation, Parameter, ParameterLocation, ParameterType,
    ResponseLocation, RestMethod,
};
pub use resolver::{resolve, Resolution};

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;
use url::Url;

use crate::config::ClientConfig;
use crate::error::{ConfigError, DescriptionError};

// ============================================================================
// Description
// ============================================================================

/// A fully loaded API description.
///
/// Serializes to and from the camelCase document layout (`baseUrl`,
/// `httpMethod`, `responseModel`, `additionalProperties`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Description {
    /// Display name of the API.
    #[serde(default)]
    pub name: String,
    /// Base URL operation URIs are resolved against.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Operations keyed by name.
    #[serde(default)]
    pub operations: BTreeMap<String, Operation>,
    /// Response models keyed by name.
    #[serde(default)]
    pub models: BTreeMap<String, Model>,
    /// Whether undeclared top-level properties are tolerated.
    #[serde(default)]
    pub additional_properties: bool,
}

impl Description {
    /// Creates an empty description called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Parses a description document.
    ///
    /// ## Errors
    ///
    /// Returns [`DescriptionError::Malformed`] if the document is not a valid
    /// description.
    pub fn from_json(document: &str) -> Result<Self, DescriptionError> {
        serde_json::from_str(document).map_err(|e| DescriptionError::malformed(e.to_string()))
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Adds an operation.
    pub fn operation(mut self, name: impl Into<String>, operation: Operation) -> Self {
        self.operations.insert(name.into(), operation);
        self
    }

    /// Adds a model.
    pub fn model(mut self, name: impl Into<String>, model: Model) -> Self {
        self.models.insert(name.into(), model);
        self
    }

    /// Looks up an operation by name.
    pub fn get_operation(&self, name: &str) -> Option<&Operation> {
        self.operations.get(name)
    }

    /// Looks up a model by name.
    pub fn get_model(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    /// Parses the base URL, if one is declared.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::InvalidUrl`] if the declared URL does not parse.
    pub fn parsed_base_url(&self) -> Result<Option<Url>, ConfigError> {
        match self.base_url.as_deref() {
            Some(raw) if !raw.is_empty() => Ok(Some(Url::parse(raw)?)),
            _ => Ok(None),
        }
    }

    /// Checks internal consistency.
    ///
    /// Every URI placeholder must have a matching `uri` parameter. A response
    /// model that is not declared only logs a warning; such responses are
    /// decoded by content type.
    ///
    /// ## Errors
    ///
    /// Returns [`DescriptionError::Malformed`] naming the first problem found.
    pub fn validate(&self) -> Result<(), DescriptionError> {
        for (name, operation) in &self.operations {
            if let Some(model) = &operation.response_model {
                if !self.models.contains_key(model) {
                    warn!(
                        operation = %name,
                        model = %model,
                        "Operation references an undeclared response model"
                    );
                }
            }
            for placeholder in operation.uri_placeholders() {
                let declared = operation
                    .parameters
                    .get(placeholder)
                    .is_some_and(|p| p.location == ParameterLocation::Uri);
                if !declared {
                    return Err(DescriptionError::malformed(format!(
                        "operation '{name}' has no uri parameter for '{{{placeholder}}}'"
                    )));
                }
            }
        }
        Ok(())
    }
}

// ============================================================================
// ApiDescription capability
// ============================================================================

/// Something that can produce a loaded [`Description`].
///
/// Implementors are usually unit structs that build their description in
/// [`load`](Self::load). A client calls `load` exactly once while it is
/// constructed and keeps the result, not the implementor.
pub trait ApiDescription: Send + Sync + fmt::Debug {
    /// Produces the fully populated description.
    ///
    /// ## Errors
    ///
    /// Returns [`DescriptionError::Malformed`] if the description cannot be built.
    fn load(&self) -> Result<Description, DescriptionError>;
}

/// An already populated description loads to a copy of itself.
impl ApiDescription for Description {
    fn load(&self) -> Result<Description, DescriptionError> {
        Ok(self.clone())
    }
}

/// A description kept as a JSON document and parsed on load.
///
/// ## Examples
///
/// ```rust
/// use api_client::description::{ApiDescription, JsonDescription};
///
/// let doc = JsonDescription::new(r#"{"name": "Empty", "operations": {}}"#);
/// assert_eq!(doc.load().unwrap().name, "Empty");
/// ```
#[derive(Debug, Clone)]
pub struct JsonDescription {
    document: String,
}

impl JsonDescription {
    /// Wraps a JSON document.
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
        }
    }
}

impl ApiDescription for JsonDescription {
    fn load(&self) -> Result<Description, DescriptionError> {
        Description::from_json(&self.document)
    }
}

// ============================================================================
// DescriptionRegistry
// ============================================================================

/// Builds a description instance from a (possibly empty) configuration.
pub type DescriptionFactory = fn(&ClientConfig) -> Arc<dyn ApiDescription>;

/// Named description factories declared by a client type.
///
/// A string `apiDescription` option is looked up here.
#[derive(Debug, Clone, Default)]
pub struct DescriptionRegistry {
    factories: BTreeMap<String, DescriptionFactory>,
}

impl DescriptionRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `factory` under `name`, replacing any previous entry.
    pub fn register(mut self, name: impl Into<String>, factory: DescriptionFactory) -> Self {
        self.factories.insert(name.into(), factory);
        self
    }

    /// Returns the factory registered under `name`.
    pub fn get(&self, name: &str) -> Option<DescriptionFactory> {
        self.factories.get(name).copied()
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.factories.keys().map(String::as_str)
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }
}
