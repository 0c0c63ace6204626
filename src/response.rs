//! Consumed response capability.

/// Write access to one outbound HTTP response.
///
/// The engine drives this surface during dispatch: handlers print bodies and
/// set headers through it, the default error path renders the standard error
/// body into it, and the controller flushes and closes it unconditionally at
/// the end of every lifecycle, fatal path included.
///
/// `is_committed` gates the lifecycle: once a `before` callback commits the
/// response (typically by writing output), `serve` no longer runs.
pub trait Response {
    fn set_status(&mut self, code: u16);

    /// Sends a platform-rendered error page, e.g. the container's HTML error
    /// view. Used for HTML-compatible clients; JSON clients get a printed
    /// error envelope instead.
    fn send_error(&mut self, code: u16, message: Option<&str>);

    fn set_header(&mut self, name: &str, value: &str);

    /// Appends text to the response body.
    fn print(&mut self, text: &str);

    fn is_committed(&self) -> bool;

    fn flush(&mut self);

    fn close(&mut self);
}
