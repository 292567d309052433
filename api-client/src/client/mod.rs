//! Client construction and operation calls.
//!
//! [`ApiClient::new`] bootstraps a client from a [`ClientProfile`] and a
//! caller-supplied [`ClientConfig`]:
//!
//! 1. profile default options are merged under the caller's configuration
//! 2. the result is [partitioned](crate::config::partition) into transport
//!    and client options
//! 3. the [`Transport`] is built from the transport options
//! 4. debug logging is attached when `debug` is `true`
//! 5. the authenticator for `authType` (or the profile default) is attached
//! 6. the API description is resolved and loaded
//!
//! Any failure aborts construction, and listeners attached along the way are
//! removed from the emitter again. Dropping a client detaches them as well,
//! so a shared emitter only carries listeners of live clients.

mod context;
mod profile;

pub use context::ClientContext;
pub use profile::{ClientProfile, ClientType};

use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, instrument, warn, Span};
use url::Url;

use crate::auth::{authenticate, AuthenticatorRegistry};
use crate::config::{partition, ClientConfig, ClientOptions, TransportOptions};
use crate::debug::{attach_debugger, DebugLogger};
use crate::description::{resolve, Description, Operation};
use crate::error::{ApiError, ConfigError, ValidationError};
use crate::transport::{HttpResponse, Subscriber, Transport};

/// A description-driven API client.
///
/// ## Examples
///
/// ```rust
/// use api_client::client::{ApiClient, ClientProfile};
/// use api_client::description::{Description, Model, Operation};
/// use api_client::{ClientConfig, ConfigValue, RestMethod};
///
/// let profile: &'static ClientProfile = Box::leak(Box::new(
///     ClientProfile::new("status").with_default_description(ConfigValue::description(
///         Description::new("Status")
///             .base_url("https://status.example.com/")
///             .operation("ping", Operation::new(RestMethod::Get, "ping").response_model("Pong"))
///             .model("Pong", Model::json_object()),
///     )),
/// ));
///
/// let client = ApiClient::new(profile, ClientConfig::new())?;
/// assert!(client.operation("ping").is_some());
/// assert!(!client.is_in_debug_mode());
/// # Ok::<(), api_client::ApiError>(())
/// ```
#[derive(Debug)]
pub struct ApiClient {
    profile: &'static ClientProfile,
    context: ClientContext,
    transport: Transport,
    description: Description,
    debug_logger: Option<Arc<dyn DebugLogger>>,
    attached: Vec<Arc<dyn Subscriber>>,
}

impl ApiClient {
    /// Constructs a client of the given profile.
    ///
    /// ## Errors
    ///
    /// - [`ConfigError`] if a transport option is unusable
    /// - [`AuthError::UnregisteredAuthenticator`](crate::error::AuthError::UnregisteredAuthenticator)
    ///   if the auth type is not registered
    /// - [`DescriptionError`](crate::error::DescriptionError) if no usable
    ///   description is configured
    pub fn new(profile: &'static ClientProfile, config: ClientConfig) -> Result<Self, ApiError> {
        let merged = profile.default_options().clone().merged_with(config);
        let (transport_options, client_options) = partition(merged);
        let mut transport = Transport::new(transport_options)?;

        let debug_mode = if client_options.debug_requested() {
            client_options.debug_mode()
        } else {
            profile.default_debug_mode()
        };
        let debug_logger = client_options.debug_logger();
        let mut context =
            ClientContext::new(profile.name(), client_options).with_debug_mode(debug_mode);

        let mut attached = Vec::new();
        let bootstrapped = Self::bootstrap(
            profile,
            &mut transport,
            &mut context,
            debug_logger.clone(),
            &mut attached,
        );
        let description = match bootstrapped {
            Ok(description) => description,
            Err(err) => {
                for subscriber in &attached {
                    transport.emitter().detach(subscriber);
                }
                warn!(profile = profile.name(), error = %err, "Client construction failed");
                return Err(err);
            }
        };

        debug!(
            profile = profile.name(),
            description = %description.name,
            auth_type = context.auth_type(),
            debug_mode,
            "Constructed API client"
        );

        Ok(Self {
            profile,
            context,
            transport,
            description,
            debug_logger,
            attached,
        })
    }

    /// Constructs a client of type `T`.
    ///
    /// ## Errors
    ///
    /// See [`ApiClient::new`].
    pub fn for_type<T: ClientType>(config: ClientConfig) -> Result<Self, ApiError> {
        Self::new(T::profile(), config)
    }

    fn bootstrap(
        profile: &'static ClientProfile,
        transport: &mut Transport,
        context: &mut ClientContext,
        debug_logger: Option<Arc<dyn DebugLogger>>,
        attached: &mut Vec<Arc<dyn Subscriber>>,
    ) -> Result<Description, ApiError> {
        if context.is_in_debug_mode() {
            attached.push(attach_debugger(transport.emitter(), debug_logger));
        }

        let auth_type = context
            .options()
            .auth_type()
            .or_else(|| profile.default_auth_type().map(String::from));
        if let Some(auth_type) = auth_type {
            context.set_auth_type(auth_type.as_str());
            attached.push(authenticate(
                profile.authenticators(),
                &auth_type,
                context,
                transport,
            )?);
        }

        let reference = context
            .options()
            .api_description()
            .or_else(|| profile.default_description());
        Ok(resolve(reference, profile.descriptions()).into_result()?)
    }

    /// Calls operation `name` with `params` and returns the decoded response.
    ///
    /// `params` must be a JSON object or `null`. The response is decoded as
    /// JSON when the operation's response model reads from the JSON body, or
    /// when it has no model and the server sent JSON; otherwise the body text
    /// is returned as a string. An empty body yields `null`.
    ///
    /// ## Errors
    ///
    /// - [`ValidationError`] for unknown operations or invalid parameters
    /// - [`ConfigError::MissingField`] if no base URL is known
    /// - [`AuthError`](crate::error::AuthError) for 401 and 403 responses
    /// - [`ClientError`](crate::error::ClientError) for other failures
    #[instrument(
        name = "api_operation",
        skip(self, params),
        fields(
            http.method = tracing::field::Empty,
            http.url = tracing::field::Empty,
            http.status_code = tracing::field::Empty,
            otel.kind = "client",
            otel.status_code = tracing::field::Empty,
        )
    )]
    pub async fn call(&self, name: &str, params: Value) -> Result<Value, ApiError> {
        let operation = self
            .operation(name)
            .ok_or_else(|| ValidationError::UnknownOperation {
                name: name.to_string(),
            })?;
        Span::current().record("http.method", operation.http_method.to_string().as_str());

        let params = match params {
            Value::Object(params) => params,
            Value::Null => Map::new(),
            _ => return Err(ValidationError::InvalidParameters.into()),
        };
        let base_url = self.base_url()?;
        let request = self
            .transport
            .message_factory()
            .create_request(name, operation, &base_url, &params)?;

        let response = self.transport.send(name, request, &self.context).await?;
        self.decode(operation, &response)
    }

    fn decode(&self, operation: &Operation, response: &HttpResponse) -> Result<Value, ApiError> {
        if response.body().is_empty() {
            return Ok(Value::Null);
        }
        let model = operation
            .response_model
            .as_deref()
            .and_then(|name| self.description.get_model(name));
        let as_json = match model {
            Some(model) => model.decodes_json(),
            None => response.is_json(),
        };
        if as_json {
            Ok(response.json()?)
        } else {
            Ok(Value::String(response.text()))
        }
    }

    /// The URL operations are resolved against: the transport's `base_url`
    /// when set, else the description's.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::MissingField`] if neither is set, or
    /// [`ConfigError::InvalidUrl`] if the description's URL does not parse.
    pub fn base_url(&self) -> Result<Url, ConfigError> {
        if let Some(url) = self.transport.base_url() {
            return Ok(url.clone());
        }
        self.description
            .parsed_base_url()?
            .ok_or_else(|| ConfigError::missing_field("base_url"))
    }

    /// The loaded description.
    pub fn description(&self) -> &Description {
        &self.description
    }

    /// The described operation `name`.
    pub fn operation(&self, name: &str) -> Option<&Operation> {
        self.description.get_operation(name)
    }

    /// The resolved auth type, if an authenticator is attached.
    pub fn auth_type(&self) -> Option<&str> {
        self.context.auth_type()
    }

    /// Authenticators available to this client type.
    pub fn authenticators(&self) -> &AuthenticatorRegistry {
        self.profile.authenticators()
    }

    /// The client options (every configuration key that is not a transport option).
    pub fn api_config(&self) -> &ClientOptions {
        self.context.options()
    }

    /// The HTTP transport.
    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// The transport options.
    pub fn transport_config(&self) -> &TransportOptions {
        self.transport.options()
    }

    /// The configured debug logger, if `debug` was set.
    pub fn debug_logger(&self) -> Option<&Arc<dyn DebugLogger>> {
        self.debug_logger.as_ref()
    }

    /// Returns `true` if debug logging is attached.
    pub fn is_in_debug_mode(&self) -> bool {
        self.context.is_in_debug_mode()
    }

    /// The context handed to authenticators and listeners.
    pub fn context(&self) -> &ClientContext {
        &self.context
    }

    /// The client's profile.
    pub fn profile(&self) -> &'static ClientProfile {
        self.profile
    }
}

impl Drop for ApiClient {
    fn drop(&mut self) {
        for subscriber in &self.attached {
            self.transport.emitter().detach(subscriber);
        }
    }
}
