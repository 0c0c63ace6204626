//! Brace-style path-template matcher.
//!
//! A template is compiled once at registration time and tested against many
//! concrete request paths. `{name}` matches exactly one non-empty segment,
//! `{name*}` matches one or more trailing segments captured jointly, and
//! everything else matches verbatim:
//!
//! ```rust
//! use resto::PathTemplate;
//!
//! let t = PathTemplate::compile("files/{path*}");
//! let m = t.test("files/a/b/c").unwrap();
//! assert_eq!(m.params(), vec![("path".to_owned(), "a/b/c".to_owned())]);
//! assert!(t.test("files").is_none());
//! ```
//!
//! A failed test is `None`, never an error: the caller is probing many
//! templates against one path and only cares which ones apply.

use std::fmt;

/// One compiled template segment.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
    Wildcard(String),
}

/// A compiled path template.
///
/// Compilation normalizes away one leading `/`, so `"/orders/{id}"` and
/// `"orders/{id}"` compile to the same matcher. The placeholder count is
/// recorded for the route-specificity tie-break: among templated routes that
/// both match a path, the one with fewer placeholders wins.
#[derive(Clone, Debug)]
pub struct PathTemplate {
    raw: String,
    segments: Vec<Segment>,
    placeholder_count: usize,
}

impl PathTemplate {
    /// Compiles a template string.
    ///
    /// # Panics
    ///
    /// Panics if a placeholder is malformed (empty name, characters outside
    /// `[A-Za-z0-9_]`) or if a `{name*}` wildcard is not the final segment.
    /// Templates are registration-time configuration, so misuse fails fast
    /// and loudly, like registering an invalid route.
    pub fn compile(template: &str) -> Self {
        let raw = template.to_owned();
        let normalized = template.strip_prefix('/').unwrap_or(template);
        let mut segments = Vec::new();
        let mut placeholder_count = 0;

        let parts: Vec<&str> = if normalized.is_empty() {
            Vec::new()
        } else {
            normalized.split('/').collect()
        };

        for (i, part) in parts.iter().enumerate() {
            let segment = match part.strip_prefix('{').and_then(|p| p.strip_suffix('}')) {
                Some(name) => {
                    placeholder_count += 1;
                    match name.strip_suffix('*') {
                        Some(name) => {
                            validate_placeholder_name(template, name);
                            if i + 1 != parts.len() {
                                panic!(
                                    "invalid template `{template}`: wildcard `{{{name}*}}` must be the final segment"
                                );
                            }
                            Segment::Wildcard(name.to_owned())
                        }
                        None => {
                            validate_placeholder_name(template, name);
                            Segment::Param(name.to_owned())
                        }
                    }
                }
                None => Segment::Literal((*part).to_owned()),
            };
            segments.push(segment);
        }

        Self { raw, segments, placeholder_count }
    }

    /// Tests a concrete request path against this template.
    ///
    /// One leading `/` on the path is ignored, mirroring the normalization
    /// applied at compile time.
    pub fn test(&self, path: &str) -> Option<RouteMatch> {
        let path = path.strip_prefix('/').unwrap_or(path);
        let parts: Vec<&str> = if path.is_empty() {
            Vec::new()
        } else {
            path.split('/').collect()
        };

        let mut params = Vec::new();
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Literal(lit) => {
                    if parts.get(i).copied() != Some(lit.as_str()) {
                        return None;
                    }
                }
                Segment::Param(name) => {
                    let value = parts.get(i).copied()?;
                    if value.is_empty() {
                        return None;
                    }
                    params.push((name.clone(), value.to_owned()));
                }
                Segment::Wildcard(name) => {
                    // One or more trailing segments, captured slash-joined.
                    let rest = parts.get(i..).filter(|r| !r.is_empty())?.join("/");
                    if rest.is_empty() {
                        return None;
                    }
                    params.push((name.clone(), rest));
                    return Some(RouteMatch { params });
                }
            }
        }

        if parts.len() != self.segments.len() {
            return None;
        }
        Some(RouteMatch { params })
    }

    /// The template string as registered.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Number of `{…}` placeholder tokens in the template.
    pub fn placeholder_count(&self) -> usize {
        self.placeholder_count
    }
}

impl fmt::Display for PathTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

fn validate_placeholder_name(template: &str, name: &str) {
    let valid = !name.is_empty()
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        panic!("invalid template `{template}`: bad placeholder name `{{{name}}}`");
    }
}

/// Result of testing one concrete path against one template.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMatch {
    params: Vec<(String, String)>,
}

impl RouteMatch {
    /// Captured path parameters, in template order. Wildcard captures are the
    /// `/`-joined concatenation of the matched segments.
    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Whether any placeholder captured a value. Matches without captures
    /// come from pure literal templates, which outrank templated ones during
    /// route selection.
    pub fn has_params(&self) -> bool {
        !self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched(template: &str, path: &str) -> Vec<(String, String)> {
        PathTemplate::compile(template)
            .test(path)
            .unwrap_or_else(|| panic!("`{template}` should match `{path}`"))
            .params()
            .to_vec()
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_owned(), value.to_owned())
    }

    #[test]
    fn literal_segments_match_verbatim() {
        assert!(matched("orders/pending", "orders/pending").is_empty());
        assert!(PathTemplate::compile("orders/pending").test("orders/shipped").is_none());
        assert!(PathTemplate::compile("orders").test("orders/pending").is_none());
    }

    #[test]
    fn leading_slash_is_normalized_on_both_sides() {
        assert!(PathTemplate::compile("/orders").test("orders").is_some());
        assert!(PathTemplate::compile("orders").test("/orders").is_some());
    }

    #[test]
    fn empty_template_matches_empty_path() {
        assert!(PathTemplate::compile("").test("").is_some());
        assert!(PathTemplate::compile("").test("/").is_some());
        assert!(PathTemplate::compile("").test("orders").is_none());
    }

    #[test]
    fn named_placeholder_captures_one_segment() {
        assert_eq!(matched("orders/{id}", "orders/42"), vec![pair("id", "42")]);
        assert!(PathTemplate::compile("orders/{id}").test("orders").is_none());
        assert!(PathTemplate::compile("orders/{id}").test("orders/42/items").is_none());
    }

    #[test]
    fn placeholder_requires_non_empty_segment() {
        assert!(PathTemplate::compile("orders/{id}").test("orders//").is_none());
    }

    #[test]
    fn wildcard_captures_slash_joined_tail() {
        assert_eq!(matched("files/{path*}", "files/a/b/c"), vec![pair("path", "a/b/c")]);
        assert_eq!(matched("files/{path*}", "files/a"), vec![pair("path", "a")]);
    }

    #[test]
    fn wildcard_requires_at_least_one_segment() {
        assert!(PathTemplate::compile("files/{path*}").test("files").is_none());
    }

    #[test]
    fn mixed_template() {
        assert_eq!(
            matched("api/{version}/files/{path*}", "api/v2/files/x/y"),
            vec![pair("version", "v2"), pair("path", "x/y")]
        );
    }

    #[test]
    fn placeholder_count_counts_brace_tokens() {
        assert_eq!(PathTemplate::compile("a/b").placeholder_count(), 0);
        assert_eq!(PathTemplate::compile("a/{x}/{y}").placeholder_count(), 2);
        assert_eq!(PathTemplate::compile("a/{x}/{rest*}").placeholder_count(), 2);
    }

    #[test]
    #[should_panic(expected = "must be the final segment")]
    fn wildcard_must_be_last() {
        PathTemplate::compile("files/{path*}/extra");
    }

    #[test]
    #[should_panic(expected = "bad placeholder name")]
    fn empty_placeholder_name_is_rejected() {
        PathTemplate::compile("orders/{}");
    }
}
