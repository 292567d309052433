//! Request lifecycle events and the emitter that dispatches them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use strum::{Display, EnumString};

use super::{HttpRequest, HttpResponse};
use crate::client::ClientContext;
use crate::error::ApiError;

/// Points in a request's lifecycle that subscribers can listen on.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString,
)]
#[strum(serialize_all = "lowercase")]
pub enum RequestEvent {
    /// Before the request is sent; listeners may modify it.
    Before,
    /// A 2xx response was received.
    Complete,
    /// Sending failed or a non-2xx response was received.
    Error,
}

/// Emitted before a request is dispatched.
#[derive(Debug)]
pub struct BeforeEvent<'a> {
    operation: &'a str,
    request: &'a mut HttpRequest,
    client: &'a ClientContext,
}

impl<'a> BeforeEvent<'a> {
    /// Creates a before-send event.
    pub fn new(
        operation: &'a str,
        request: &'a mut HttpRequest,
        client: &'a ClientContext,
    ) -> Self {
        Self {
            operation,
            request,
            client,
        }
    }

    /// Name of the operation being called.
    pub fn operation(&self) -> &str {
        self.operation
    }

    /// The outgoing request.
    pub fn request(&self) -> &HttpRequest {
        self.request
    }

    /// Mutable access to the outgoing request.
    pub fn request_mut(&mut self) -> &mut HttpRequest {
        self.request
    }

    /// The client the request belongs to.
    pub fn client(&self) -> &ClientContext {
        self.client
    }

    /// Returns `true` if the request carries the `scheme` auth option.
    pub fn request_has_auth(&self, scheme: &str) -> bool {
        self.request.auth() == Some(scheme)
    }
}

/// Emitted after a successful response.
#[derive(Debug, Clone, Copy)]
pub struct CompleteEvent<'a> {
    /// Name of the operation that was called.
    pub operation: &'a str,
    /// The request as sent.
    pub request: &'a HttpRequest,
    /// The response received.
    pub response: &'a HttpResponse,
    /// The client the request belongs to.
    pub client: &'a ClientContext,
}

/// Emitted when a request fails.
#[derive(Debug, Clone, Copy)]
pub struct ErrorEvent<'a> {
    /// Name of the operation that was called.
    pub operation: &'a str,
    /// The request as sent.
    pub request: &'a HttpRequest,
    /// The response, when the server answered with a failure status.
    pub response: Option<&'a HttpResponse>,
    /// What went wrong.
    pub error: &'a ApiError,
    /// The client the request belongs to.
    pub client: &'a ClientContext,
}

/// A listener on request lifecycle events.
///
/// A subscriber declares the events it listens on; the emitter registers it
/// once per declared event and only calls the matching hooks.
pub trait Subscriber: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Events this subscriber is registered for.
    fn events(&self) -> &[RequestEvent];

    /// Called before the request is sent.
    fn on_before(&self, _event: &mut BeforeEvent<'_>) {}

    /// Called after a successful response.
    fn on_complete(&self, _event: &CompleteEvent<'_>) {}

    /// Called after a failure.
    fn on_error(&self, _event: &ErrorEvent<'_>) {}
}

type ListenerMap = BTreeMap<RequestEvent, Vec<Arc<dyn Subscriber>>>;

fn same_subscriber(a: &Arc<dyn Subscriber>, b: &Arc<dyn Subscriber>) -> bool {
    std::ptr::eq(
        Arc::as_ptr(a).cast::<()>(),
        Arc::as_ptr(b).cast::<()>(),
    )
}

/// Shared registry of lifecycle listeners.
///
/// Cloning an emitter yields another handle to the same listeners, so an
/// emitter passed in through configuration can be observed by its owner.
/// Listener lists are copied out before dispatch; no lock is held while a
/// subscriber runs.
///
/// ## Examples
///
/// ```rust
/// use api_client::transport::{Emitter, RequestEvent};
///
/// let emitter = Emitter::new();
/// assert_eq!(emitter.listener_count(), 0);
/// assert!(!emitter.has_listeners(RequestEvent::Before));
/// ```
#[derive(Clone, Default)]
pub struct Emitter {
    listeners: Arc<RwLock<ListenerMap>>,
}

impl Emitter {
    /// Creates an emitter with no listeners.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `subscriber` for each event it declares.
    ///
    /// Returns the number of registrations made.
    pub fn attach(&self, subscriber: Arc<dyn Subscriber>) -> usize {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let mut added = 0;
        for event in subscriber.events() {
            let entry = listeners.entry(*event).or_default();
            if !entry.iter().any(|existing| same_subscriber(existing, &subscriber)) {
                entry.push(Arc::clone(&subscriber));
                added += 1;
            }
        }
        added
    }

    /// Removes every registration of `subscriber`.
    ///
    /// Returns the number of registrations removed.
    pub fn detach(&self, subscriber: &Arc<dyn Subscriber>) -> usize {
        let mut listeners = self.listeners.write().unwrap_or_else(PoisonError::into_inner);
        let mut removed = 0;
        for entry in listeners.values_mut() {
            let before = entry.len();
            entry.retain(|existing| !same_subscriber(existing, subscriber));
            removed += before - entry.len();
        }
        listeners.retain(|_, entry| !entry.is_empty());
        removed
    }

    /// Snapshot of the listeners registered for `event`, in attachment order.
    pub fn listeners(&self, event: RequestEvent) -> Vec<Arc<dyn Subscriber>> {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event)
            .cloned()
            .unwrap_or_default()
    }

    /// Total number of registrations across all events.
    pub fn listener_count(&self) -> usize {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum()
    }

    /// Returns `true` if anything is registered for `event`.
    pub fn has_listeners(&self, event: RequestEvent) -> bool {
        self.listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&event)
            .is_some_and(|entry| !entry.is_empty())
    }

    /// Returns `true` if both handles share the same listeners.
    pub fn same_as(&self, other: &Emitter) -> bool {
        Arc::ptr_eq(&self.listeners, &other.listeners)
    }

    pub(crate) fn emit_before(&self, event: &mut BeforeEvent<'_>) {
        for listener in self.listeners(RequestEvent::Before) {
            listener.on_before(event);
        }
    }

    pub(crate) fn emit_complete(&self, event: &CompleteEvent<'_>) {
        for listener in self.listeners(RequestEvent::Complete) {
            listener.on_complete(event);
        }
    }

    pub(crate) fn emit_error(&self, event: &ErrorEvent<'_>) {
        for listener in self.listeners(RequestEvent::Error) {
            listener.on_error(event);
        }
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        let mut map = f.debug_map();
        for (event, entry) in listeners.iter() {
            let names: Vec<&str> = entry.iter().map(|s| s.name()).collect();
            map.entry(event, &names);
        }
        map.finish()
    }
}
