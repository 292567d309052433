//! Debug logging of request traffic.
//!
//! When a client is in debug mode a [`LogSubscriber`] is attached to its
//! emitter. It listens on `complete` and `error` and hands a formatted
//! [`LogEntry`] to a [`DebugLogger`]. Without a configured logger the
//! [`TracingLogger`] writes entries through `tracing`.

use std::fmt;
use std::sync::Arc;

use strum::Display;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::transport::{
    CompleteEvent, Emitter, ErrorEvent, HttpRequest, HttpResponse, RequestEvent, Subscriber,
};

/// Severity of a debug log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum LogLevel {
    /// A completed exchange.
    Debug,
    /// A failed exchange.
    Warn,
}

/// One logged request exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    /// Severity.
    pub level: LogLevel,
    /// Operation that was called.
    pub operation: String,
    /// Formatted exchange, see [`format_debug`].
    pub message: String,
}

/// Sink for debug log entries.
pub trait DebugLogger: Send + Sync + fmt::Debug {
    /// Records `entry`.
    fn log(&self, entry: &LogEntry);
}

/// Writes entries as `tracing` events.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl DebugLogger for TracingLogger {
    fn log(&self, entry: &LogEntry) {
        match entry.level {
            LogLevel::Debug => debug!(operation = %entry.operation, "{}", entry.message),
            LogLevel::Warn => warn!(operation = %entry.operation, "{}", entry.message),
        }
    }
}

/// Formats a request exchange in the classic debug layout:
///
/// ```text
/// >>>>>>>>
/// GET http://example.com/ping HTTP/1.1
/// <<<<<<<<
/// HTTP/1.1 200 OK
/// --------
/// <error, if any>
/// ```
pub fn format_debug(
    request: &HttpRequest,
    response: Option<&HttpResponse>,
    error: Option<&ApiError>,
) -> String {
    let response = response.map(ToString::to_string).unwrap_or_default();
    let error = error.map(ToString::to_string).unwrap_or_default();
    format!(">>>>>>>>\n{request}\n<<<<<<<<\n{response}\n--------\n{error}")
}

/// Subscriber that logs every finished exchange.
#[derive(Debug)]
pub struct LogSubscriber {
    logger: Arc<dyn DebugLogger>,
}

impl LogSubscriber {
    /// Logs to `logger`.
    pub fn new(logger: Arc<dyn DebugLogger>) -> Self {
        Self { logger }
    }

    /// The sink entries are written to.
    pub fn logger(&self) -> &Arc<dyn DebugLogger> {
        &self.logger
    }
}

impl Subscriber for LogSubscriber {
    fn name(&self) -> &str {
        "log"
    }

    fn events(&self) -> &[RequestEvent] {
        &[RequestEvent::Complete, RequestEvent::Error]
    }

    fn on_complete(&self, event: &CompleteEvent<'_>) {
        self.logger.log(&LogEntry {
            level: LogLevel::Debug,
            operation: event.operation.to_string(),
            message: format_debug(event.request, Some(event.response), None),
        });
    }

    fn on_error(&self, event: &ErrorEvent<'_>) {
        self.logger.log(&LogEntry {
            level: LogLevel::Warn,
            operation: event.operation.to_string(),
            message: format_debug(event.request, event.response, Some(event.error)),
        });
    }
}

/// Attaches a [`LogSubscriber`] to `emitter`.
///
/// Uses `logger` when given, the [`TracingLogger`] otherwise. Returns the
/// attached subscriber so it can be detached again.
pub fn attach_debugger(
    emitter: &Emitter,
    logger: Option<Arc<dyn DebugLogger>>,
) -> Arc<dyn Subscriber> {
    let logger = logger.unwrap_or_else(|| Arc::new(TracingLogger));
    let subscriber: Arc<dyn Subscriber> = Arc::new(LogSubscriber::new(logger));
    let registrations = emitter.attach(Arc::clone(&subscriber));
    debug!(registrations, "Attached debug log subscriber");
    subscriber
}
