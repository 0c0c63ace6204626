//! Unified error types.

use thiserror::Error;

/// The error type returned by resto's fallible configuration operations.
///
/// Request-level failures (no matching route, handler faults) are expressed
/// as HTTP responses or as [`ServeError`] values, not as `Error`s. This type
/// surfaces contract violations: an unknown HTTP method string, a status code
/// outside the registered table, a malformed declarative route record.
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

/// A fault raised by a lifecycle callback.
///
/// The Rust rendition of "the handler threw": `before` and `serve` callbacks
/// return `Err(ServeError)` to route control to the spec's `catch` callback
/// (or the default catch, which renders the standard error body). A fault
/// raised by a `catch` callback itself is the one unrecovered path: it is
/// logged and propagated out of [`execute`](crate::HttpController::execute).
#[derive(Debug, Clone, Error)]
#[error("{name}: {message}")]
pub struct ServeError {
    pub name: String,
    pub message: String,
}

impl ServeError {
    pub fn new(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self { name: name.into(), message: message.into() }
    }
}

/// `Err("boom".into())` inside a handler reads like a thrown error.
impl From<&str> for ServeError {
    fn from(message: &str) -> Self {
        Self::new("Error", message)
    }
}

impl From<String> for ServeError {
    fn from(message: String) -> Self {
        Self::new("Error", message)
    }
}
