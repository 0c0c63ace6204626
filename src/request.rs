//! Consumed request capability.
//!
//! The engine does not parse HTTP itself. The host (a server runtime, a test
//! harness, a CGI-ish bridge) implements [`Request`] over whatever transport
//! object it already has, and the engine reads method, path and headers
//! through it.

use crate::context::{QueryValue, parse_query};

/// Read access to one inbound HTTP request.
pub trait Request {
    /// The HTTP method string as received, e.g. `"GET"`. Matching against
    /// routing tables is case-insensitive.
    fn method(&self) -> &str;

    /// The resource path this request addresses, without scheme or query.
    fn resource_path(&self) -> &str;

    /// Case-insensitive header lookup.
    fn header(&self, name: &str) -> Option<&str>;

    /// The raw query string, if any, without the leading `?`.
    fn query_string(&self) -> Option<&str>;

    /// The request body's media type.
    fn content_type(&self) -> Option<&str> {
        self.header("Content-Type")
    }

    /// Query parameters parsed with the engine's rules: `&`-split,
    /// `=`-split, bare flags, repeated keys accumulating in encounter order.
    fn query_parameters_map(&self) -> Vec<(String, QueryValue)> {
        self.query_string().map(parse_query).unwrap_or_default()
    }
}
