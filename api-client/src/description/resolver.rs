//! Resolution of a description reference into a loaded [`Description`].
//!
//! Resolution is a small state machine:
//!
//! ```text
//! Unresolved ──instance──────────────► Loading ──load() ok──► Resolved
//!     │                                   ▲   └──load() err──► Malformed
//!     ├──name/other──► ByReference ──hit──┘
//!     │                    └──miss────────────────────────────► Malformed
//!     └──empty/unset──────────────────────────────────────────► NotFound
//! ```
//!
//! Every transition moves forward, so resolution takes at most three steps and
//! the reference lookup is attempted at most once.

use std::sync::Arc;

use tracing::debug;

use super::{ApiDescription, Description, DescriptionRegistry};
use crate::config::{ClientConfig, ConfigValue};
use crate::error::DescriptionError;

/// Outcome of resolving a description reference.
#[derive(Debug)]
pub enum Resolution {
    /// The description was loaded.
    Resolved(Description),
    /// Nothing was configured.
    NotFound,
    /// Something was configured but could not be used.
    Malformed(String),
}

impl Resolution {
    /// Returns `true` if a description was loaded.
    pub fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved(_))
    }

    /// Converts the outcome into a result.
    ///
    /// ## Errors
    ///
    /// Returns [`DescriptionError::NotFound`] or [`DescriptionError::Malformed`]
    /// for the matching failed outcomes.
    pub fn into_result(self) -> Result<Description, DescriptionError> {
        match self {
            Self::Resolved(description) => Ok(description),
            Self::NotFound => Err(DescriptionError::NotFound),
            Self::Malformed(reason) => Err(DescriptionError::Malformed { reason }),
        }
    }
}

enum State<'a> {
    Unresolved(Option<&'a ConfigValue>),
    ByReference(&'a ConfigValue),
    Loading(Arc<dyn ApiDescription>),
    Done(Resolution),
}

/// Resolves `reference` against `registry`.
///
/// - A [`ConfigValue::Description`] instance is loaded directly; the registry
///   is not consulted.
/// - A non-empty string naming a registered factory is instantiated with an
///   empty configuration, then loaded.
/// - An empty or missing reference resolves to [`Resolution::NotFound`].
/// - Anything else resolves to [`Resolution::Malformed`].
///
/// `load()` runs exactly once when an instance is reached.
///
/// ## Examples
///
/// ```rust
/// use api_client::config::ConfigValue;
/// use api_client::description::{resolve, Description, DescriptionRegistry, Resolution};
///
/// let registry = DescriptionRegistry::new();
///
/// let inline = ConfigValue::description(Description::new("Inline"));
/// assert!(resolve(Some(&inline), &registry).is_resolved());
///
/// assert!(matches!(resolve(None, &registry), Resolution::NotFound));
/// let unknown = ConfigValue::from("foo");
/// assert!(matches!(resolve(Some(&unknown), &registry), Resolution::Malformed(_)));
/// ```
pub fn resolve(reference: Option<&ConfigValue>, registry: &DescriptionRegistry) -> Resolution {
    let mut state = State::Unresolved(reference);
    loop {
        state = match state {
            State::Done(resolution) => return resolution,
            State::Unresolved(reference) => unresolved(reference),
            State::ByReference(reference) => by_reference(reference, registry),
            State::Loading(instance) => State::Done(load(instance.as_ref())),
        };
    }
}

fn unresolved(reference: Option<&ConfigValue>) -> State<'_> {
    match reference {
        None => State::Done(Resolution::NotFound),
        Some(value) if value.is_empty() => State::Done(Resolution::NotFound),
        Some(ConfigValue::Description(instance)) => {
            debug!("Using inline API description instance");
            State::Loading(Arc::clone(instance))
        }
        Some(value) => State::ByReference(value),
    }
}

fn by_reference<'a>(reference: &ConfigValue, registry: &DescriptionRegistry) -> State<'a> {
    let Some(name) = reference.as_str() else {
        return State::Done(Resolution::Malformed(format!(
            "expected a description instance or name, got {}",
            reference.kind()
        )));
    };
    match registry.get(name) {
        Some(factory) => {
            debug!(description = name, "Instantiating registered API description");
            State::Loading(factory(&ClientConfig::new()))
        }
        None => State::Done(Resolution::Malformed(format!(
            "'{name}' is not a registered description"
        ))),
    }
}

fn load(instance: &dyn ApiDescription) -> Resolution {
    let loaded = instance
        .load()
        .and_then(|description| description.validate().map(|()| description));
    match loaded {
        Ok(description) => {
            debug!(
                description = %description.name,
                operations = description.operations.len(),
                "Loaded API description"
            );
            Resolution::Resolved(description)
        }
        Err(DescriptionError::Malformed { reason }) => Resolution::Malformed(reason),
        // A reference was supplied, so a failed load is never NotFound.
        Err(err) => Resolution::Malformed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::description::{Model, Operation, RestMethod};
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, Default)]
    struct CountingDescription {
        loads: Arc<AtomicUsize>,
    }

    impl ApiDescription for CountingDescription {
        fn load(&self) -> Result<Description, DescriptionError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Description::new("Counted")
                .operation(
                    "ping",
                    Operation::new(RestMethod::Get, "ping").response_model("Pong"),
                )
                .model("Pong", Model::json_object()))
        }
    }

    static FACTORY_CALLS: AtomicUsize = AtomicUsize::new(0);

    fn counted_factory(config: &ClientConfig) -> Arc<dyn ApiDescription> {
        assert!(config.is_empty());
        FACTORY_CALLS.fetch_add(1, Ordering::SeqCst);
        Arc::new(Description::new("FromRegistry"))
    }

    fn registry() -> DescriptionRegistry {
        DescriptionRegistry::new().register("registered", counted_factory)
    }

    #[test]
    fn test_instance_is_loaded_once_without_registry_lookup() {
        let loads = Arc::new(AtomicUsize::new(0));
        let instance = ConfigValue::description(CountingDescription {
            loads: Arc::clone(&loads),
        });
        let before = FACTORY_CALLS.load(Ordering::SeqCst);

        let resolution = resolve(Some(&instance), &registry());

        let description = resolution.into_result().unwrap();
        assert_eq!(description.name, "Counted");
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert_eq!(FACTORY_CALLS.load(Ordering::SeqCst), before);
    }

    #[test]
    fn test_registered_name_is_instantiated_and_loaded() {
        let reference = ConfigValue::from("registered");
        let description = resolve(Some(&reference), &registry()).into_result().unwrap();
        assert_eq!(description.name, "FromRegistry");
    }

    #[test]
    fn test_missing_reference_is_not_found() {
        let err = resolve(None, &registry()).into_result().unwrap_err();
        assert_eq!(err, DescriptionError::NotFound);
        assert!(err.to_string().contains("No API service description found"));
    }

    #[test]
    fn test_empty_reference_is_not_found() {
        for empty in [ConfigValue::from(""), ConfigValue::Null, ConfigValue::Bool(false)] {
            let resolution = resolve(Some(&empty), &registry());
            assert!(matches!(resolution, Resolution::NotFound));
        }
    }

    #[test]
    fn test_unknown_name_is_malformed() {
        let reference = ConfigValue::from("foo");
        let err = resolve(Some(&reference), &registry()).into_result().unwrap_err();
        assert!(err.to_string().contains("Malformed API service description"));
        assert!(err.to_string().contains("'foo'"));
    }

    #[test]
    fn test_wrong_kind_is_malformed() {
        let reference = ConfigValue::Int(42);
        let resolution = resolve(Some(&reference), &registry());
        match resolution {
            Resolution::Malformed(reason) => assert!(reason.contains("integer")),
            other => panic!("expected malformed, got {other:?}"),
        }
    }

    #[test]
    fn test_inconsistent_description_is_malformed() {
        let broken = ConfigValue::description(
            Description::new("Broken")
                .operation("user", Operation::new(RestMethod::Get, "users/{id}")),
        );
        assert!(matches!(
            resolve(Some(&broken), &registry()),
            Resolution::Malformed(_)
        ));
    }

    #[derive(Debug)]
    struct LoadsNothing;

    impl ApiDescription for LoadsNothing {
        fn load(&self) -> Result<Description, DescriptionError> {
            Err(DescriptionError::NotFound)
        }
    }

    #[test]
    fn test_failed_load_is_malformed_even_when_not_found() {
        let instance = ConfigValue::description(LoadsNothing);
        match resolve(Some(&instance), &registry()) {
            Resolution::Malformed(reason) => {
                assert!(reason.contains("No API service description found"))
            }
            other => panic!("expected malformed, got {other:?}"),
        }
    }
}
