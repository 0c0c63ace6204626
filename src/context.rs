//! Per-request dispatch context.
//!
//! A [`DispatchContext`] is created fresh inside every
//! [`execute`](crate::HttpController::execute) call and dropped when the call
//! returns. It is never shared or reused across requests. Lifecycle callbacks
//! receive it by mutable reference and use it for three things:
//!
//! - reading matched path parameters and parsed query parameters,
//! - reaching the request/response pair (also under the short aliases
//!   [`req`](DispatchContext::req) / [`res`](DispatchContext::res)),
//! - shaping default error rendering by setting `http_error_code`,
//!   `error_message`, `error_name`, `error_code` or `suppress_stack` before
//!   returning a fault.

use std::collections::HashMap;

use crate::request::Request;
use crate::response::Response;

/// A parsed query-string value.
///
/// A bare key with no `=` is a boolean flag; repeated keys accumulate into
/// [`QueryValue::Multi`] in encounter order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryValue {
    Flag,
    Single(String),
    Multi(Vec<String>),
}

/// Parses a raw query string: `&`-split, `=`-split, bare flags, repeats.
///
/// ```rust
/// use resto::{parse_query, QueryValue};
///
/// let params = parse_query("a=1&flag&a=2");
/// assert_eq!(params[0], ("a".to_owned(), QueryValue::Multi(vec!["1".into(), "2".into()])));
/// assert_eq!(params[1], ("flag".to_owned(), QueryValue::Flag));
/// ```
pub fn parse_query(query: &str) -> Vec<(String, QueryValue)> {
    let mut params: Vec<(String, QueryValue)> = Vec::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = match pair.split_once('=') {
            Some((key, value)) => (key, Some(value)),
            None => (pair, None),
        };
        match params.iter_mut().find(|(k, _)| k == key) {
            None => {
                let parsed = match value {
                    Some(value) => QueryValue::Single(value.to_owned()),
                    None => QueryValue::Flag,
                };
                params.push((key.to_owned(), parsed));
            }
            Some((_, existing)) => {
                // A repeated bare flag accumulates as the literal "true".
                let appended = value.unwrap_or("true").to_owned();
                let mut values = match std::mem::replace(existing, QueryValue::Flag) {
                    QueryValue::Flag => vec!["true".to_owned()],
                    QueryValue::Single(v) => vec![v],
                    QueryValue::Multi(vs) => vs,
                };
                values.push(appended);
                *existing = QueryValue::Multi(values);
            }
        }
    }
    params
}

/// The per-request mutable bag passed through the handler lifecycle.
pub struct DispatchContext<'a> {
    /// Path parameters captured by the winning route template.
    pub path_parameters: HashMap<String, String>,
    /// Query parameters in encounter order.
    pub query_parameters: Vec<(String, QueryValue)>,
    /// Overrides the HTTP status the default catch emits (500 otherwise).
    pub http_error_code: Option<u16>,
    /// Overrides the fault message in the default error body.
    pub error_message: Option<String>,
    /// Overrides the fault name in the default error body.
    pub error_name: Option<String>,
    /// Application error code carried into the error body's `code` field.
    pub error_code: Option<i64>,
    /// Demotes the default catch's log line from `error` to a compact `info`.
    pub suppress_stack: bool,
    request: &'a dyn Request,
    response: &'a mut dyn Response,
}

impl<'a> DispatchContext<'a> {
    pub(crate) fn new(
        request: &'a dyn Request,
        response: &'a mut dyn Response,
        path_parameters: HashMap<String, String>,
        query_parameters: Vec<(String, QueryValue)>,
    ) -> Self {
        Self {
            path_parameters,
            query_parameters,
            http_error_code: None,
            error_message: None,
            error_name: None,
            error_code: None,
            suppress_stack: false,
            request,
            response,
        }
    }

    pub fn request(&self) -> &dyn Request {
        self.request
    }

    pub fn response(&mut self) -> &mut dyn Response {
        &mut *self.response
    }

    /// Short alias for [`request`](Self::request).
    pub fn req(&self) -> &dyn Request {
        self.request
    }

    /// Short alias for [`response`](Self::response).
    pub fn res(&mut self) -> &mut dyn Response {
        &mut *self.response
    }

    /// Whether the response has been committed, without needing `&mut self`.
    pub fn committed(&self) -> bool {
        self.response.is_committed()
    }

    /// Named path parameter captured by the route template.
    pub fn path_param(&self, name: &str) -> Option<&str> {
        self.path_parameters.get(name).map(String::as_str)
    }

    /// Named query parameter.
    pub fn query_param(&self, name: &str) -> Option<&QueryValue> {
        self.query_parameters
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v)
    }

    pub(crate) fn parts(&mut self) -> (&dyn Request, &mut dyn Response) {
        (self.request, &mut *self.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_values_and_flags() {
        let params = parse_query("a=1&b&c=x");
        assert_eq!(params[0], ("a".to_owned(), QueryValue::Single("1".to_owned())));
        assert_eq!(params[1], ("b".to_owned(), QueryValue::Flag));
        assert_eq!(params[2], ("c".to_owned(), QueryValue::Single("x".to_owned())));
    }

    #[test]
    fn repeated_keys_accumulate_in_encounter_order() {
        let params = parse_query("k=1&k=2&k=3");
        assert_eq!(
            params,
            vec![(
                "k".to_owned(),
                QueryValue::Multi(vec!["1".to_owned(), "2".to_owned(), "3".to_owned()])
            )]
        );
    }

    #[test]
    fn empty_pairs_are_skipped() {
        assert!(parse_query("").is_empty());
        assert_eq!(parse_query("&&a=1&").len(), 1);
    }

    #[test]
    fn empty_value_is_not_a_flag() {
        let params = parse_query("a=");
        assert_eq!(params[0].1, QueryValue::Single(String::new()));
    }
}
