//! Configuration values and the raw configuration map.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::debug::DebugLogger;
use crate::description::ApiDescription;
use crate::error::ConfigError;
use crate::transport::{Emitter, Handler, MessageFactory};

// ============================================================================
// ConfigValue
// ============================================================================

/// A single configuration value.
///
/// Plain data variants mirror JSON. Handle variants carry shared collaborator
/// objects (a description instance, a debug logger, a transport emitter, a
/// send handler or a message factory) that cannot be expressed as data.
///
/// ## Examples
///
/// ```rust
/// use api_client::ConfigValue;
///
/// assert!(ConfigValue::from("").is_empty());
/// assert!(ConfigValue::from(false).is_empty());
/// assert!(!ConfigValue::from("oauth2").is_empty());
/// ```
#[derive(Debug, Clone)]
pub enum ConfigValue {
    /// Explicit null.
    Null,
    /// A boolean flag.
    Bool(bool),
    /// An integer.
    Int(i64),
    /// A floating point number.
    Float(f64),
    /// A string.
    Str(String),
    /// An ordered list of values.
    List(Vec<ConfigValue>),
    /// A nested map of values.
    Map(BTreeMap<String, ConfigValue>),
    /// An API description instance.
    Description(Arc<dyn ApiDescription>),
    /// A debug log sink.
    Logger(Arc<dyn DebugLogger>),
    /// A transport event emitter handle.
    Emitter(Emitter),
    /// A transport send handler.
    Handler(Arc<dyn Handler>),
    /// A transport request factory.
    MessageFactory(Arc<dyn MessageFactory>),
}

impl ConfigValue {
    /// Wraps an API description instance.
    pub fn description(description: impl ApiDescription + 'static) -> Self {
        Self::Description(Arc::new(description))
    }

    /// Wraps a debug logger.
    pub fn logger(logger: impl DebugLogger + 'static) -> Self {
        Self::Logger(Arc::new(logger))
    }

    /// Wraps a transport send handler.
    pub fn handler(handler: impl Handler + 'static) -> Self {
        Self::Handler(Arc::new(handler))
    }

    /// Wraps a transport request factory.
    pub fn message_factory(factory: impl MessageFactory + 'static) -> Self {
        Self::MessageFactory(Arc::new(factory))
    }

    /// Returns `true` if this value counts as "not set".
    ///
    /// Null, `false`, zero, the empty string, the string `"0"` and empty
    /// collections are empty. Handle variants never are.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Bool(b) => !b,
            Self::Int(i) => *i == 0,
            Self::Float(f) => *f == 0.0,
            Self::Str(s) => s.is_empty() || s == "0",
            Self::List(items) => items.is_empty(),
            Self::Map(entries) => entries.is_empty(),
            Self::Description(_)
            | Self::Logger(_)
            | Self::Emitter(_)
            | Self::Handler(_)
            | Self::MessageFactory(_) => false,
        }
    }

    /// Short name of the value's kind, used in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Null => "null",
            Self::Bool(_) => "bool",
            Self::Int(_) => "integer",
            Self::Float(_) => "float",
            Self::Str(_) => "string",
            Self::List(_) => "list",
            Self::Map(_) => "map",
            Self::Description(_) => "description",
            Self::Logger(_) => "logger",
            Self::Emitter(_) => "emitter",
            Self::Handler(_) => "handler",
            Self::MessageFactory(_) => "message factory",
        }
    }

    /// Returns the string slice if this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the flag if this is a boolean.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the number as `f64` if this is an integer or float.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Returns the nested map if this is a map.
    pub fn as_map(&self) -> Option<&BTreeMap<String, ConfigValue>> {
        match self {
            Self::Map(entries) => Some(entries),
            _ => None,
        }
    }

    /// Renders a scalar as text; `None` for collections and handles.
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Null => Some(String::new()),
            Self::Bool(b) => Some(b.to_string()),
            Self::Int(i) => Some(i.to_string()),
            Self::Float(f) => Some(f.to_string()),
            Self::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) => f.write_str(&text),
            None => match self {
                Self::List(items) => write!(f, "[{} items]", items.len()),
                Self::Map(entries) => write!(f, "{{{} entries}}", entries.len()),
                other => write!(f, "<{}>", other.kind()),
            },
        }
    }
}

impl PartialEq for ConfigValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::List(a), Self::List(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            (Self::Description(a), Self::Description(b)) => Arc::ptr_eq(a, b),
            (Self::Logger(a), Self::Logger(b)) => Arc::ptr_eq(a, b),
            (Self::Emitter(a), Self::Emitter(b)) => a.same_as(b),
            (Self::Handler(a), Self::Handler(b)) => Arc::ptr_eq(a, b),
            (Self::MessageFactory(a), Self::MessageFactory(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<i32> for ConfigValue {
    fn from(value: i32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        Self::List(value)
    }
}

impl From<BTreeMap<String, ConfigValue>> for ConfigValue {
    fn from(value: BTreeMap<String, ConfigValue>) -> Self {
        Self::Map(value)
    }
}

impl From<Emitter> for ConfigValue {
    fn from(value: Emitter) -> Self {
        Self::Emitter(value)
    }
}

impl From<Value> for ConfigValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => Self::Int(i),
                None => Self::Float(n.as_f64().unwrap_or_default()),
            },
            Value::String(s) => Self::Str(s),
            Value::Array(items) => Self::List(items.into_iter().map(Self::from).collect()),
            Value::Object(entries) => Self::Map(
                entries
                    .into_iter()
                    .map(|(k, v)| (k, Self::from(v)))
                    .collect(),
            ),
        }
    }
}

// ============================================================================
// ClientConfig
// ============================================================================

/// The raw configuration map handed to a client at construction.
///
/// Keys are case-sensitive and unordered.
///
/// ## Examples
///
/// ```rust
/// use api_client::ClientConfig;
///
/// let config = ClientConfig::new()
///     .with("authType", "oauth2")
///     .with("debug", true)
///     .with("base_url", "https://api.example.com/");
///
/// assert_eq!(config.len(), 3);
/// assert!(config.exists("authType"));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClientConfig {
    entries: BTreeMap<String, ConfigValue>,
}

impl ClientConfig {
    /// Creates an empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a configuration from a JSON object.
    ///
    /// ## Errors
    ///
    /// Returns [`ConfigError::NotAnObject`] if `value` is not a JSON object.
    pub fn from_json(value: Value) -> Result<Self, ConfigError> {
        let found = match &value {
            Value::Object(_) => None,
            Value::Null => Some("null"),
            Value::Bool(_) => Some("bool"),
            Value::Number(_) => Some("number"),
            Value::String(_) => Some("string"),
            Value::Array(_) => Some("array"),
        };
        if let Some(found) = found {
            return Err(ConfigError::NotAnObject { found });
        }
        match ConfigValue::from(value) {
            ConfigValue::Map(entries) => Ok(Self { entries }),
            _ => Err(ConfigError::NotAnObject { found: "unknown" }),
        }
    }

    /// Returns the configuration with `key` set to `value`.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        self.insert(key, value);
        self
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<ConfigValue>,
    ) -> Option<ConfigValue> {
        self.entries.insert(key.into(), value.into())
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: &str) -> Option<ConfigValue> {
        self.entries.remove(key)
    }

    /// Returns the raw value stored under `key`, empty or not.
    pub fn get(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key)
    }

    /// Returns `true` if `key` is present, regardless of its value.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Returns `true` if `key` is present and its value is not empty.
    ///
    /// See [`ConfigValue::is_empty`] for what counts as empty.
    pub fn exists(&self, key: &str) -> bool {
        self.entries.get(key).is_some_and(|value| !value.is_empty())
    }

    /// Returns the value under `key` only if it [`exists`](Self::exists).
    pub fn get_set(&self, key: &str) -> Option<&ConfigValue> {
        self.entries.get(key).filter(|value| !value.is_empty())
    }

    /// Merges `overrides` on top of this configuration; overriding keys win,
    /// even when their value is empty.
    pub fn merged_with(mut self, overrides: ClientConfig) -> Self {
        self.entries.extend(overrides.entries);
        self
    }

    /// Number of keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no keys are present.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates over the keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ConfigValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K: Into<String>, V: Into<ConfigValue>> FromIterator<(K, V)> for ClientConfig {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl IntoIterator for ClientConfig {
    type Item = (String, ConfigValue);
    type IntoIter = std::collections::btree_map::IntoIter<String, ConfigValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}
