//! Media-type normalization and compatibility.
//!
//! Dispatch narrows a route's handler specs to the first one whose declared
//! `consumes`/`produces` constraints are compatible with the request's
//! `Content-Type` and `Accept` headers. Compatibility is semantic, not
//! strict equality: `type/*` accepts any subtype and `*/sub` any type, so a
//! request accepting `*/json` lands on a spec producing `application/json`.

use crate::request::Request;

/// Splits a media-type header value into its individual entries.
///
/// Each entry is stripped of backslash escaping and of `;`-separated
/// attributes (quality factors and the like), then trimmed. `None` in means
/// the header was absent, which callers treat as "no restriction".
pub fn normalize_media_type_header(value: Option<&str>) -> Option<Vec<String>> {
    let value = value?;
    Some(
        value
            .split(',')
            .map(|entry| {
                let entry = entry.replace('\\', "");
                entry.split(';').next().unwrap_or_default().trim().to_owned()
            })
            .collect(),
    )
}

/// MIME compatibility: exact equality, or one side's type or subtype is `*`
/// while the other half matches (`type/*` vs `type/anything`, `*/sub` vs
/// `anything/sub`).
pub fn is_mime_compatible(source: &str, target: &str) -> bool {
    if source == target {
        return true;
    }
    let (Some((s_type, s_sub)), Some((t_type, t_sub))) =
        (source.split_once('/'), target.split_once('/'))
    else {
        return false;
    };
    ((s_type == "*" || t_type == "*") && s_sub == t_sub)
        || ((s_sub == "*" || t_sub == "*") && s_type == t_type)
}

/// Decides whether a handler spec's media-type constraints admit a request.
///
/// Produces side: satisfied when `Accept` is absent or contains `*/*`;
/// otherwise at least one `Accept` entry must be compatible with at least one
/// `produces` entry. An unset `produces` does NOT satisfy a specific
/// `Accept`.
///
/// Consumes side: satisfied when `consumes` is absent or contains the `*`
/// marker; otherwise the request's `Content-Type` must be compatible with at
/// least one entry, so a request without a `Content-Type` fails a specific
/// `consumes`.
pub fn match_media_type(
    request: &dyn Request,
    produces: Option<&[String]>,
    consumes: Option<&[String]>,
) -> bool {
    let accepts = normalize_media_type_header(request.header("Accept"));
    let content_types = normalize_media_type_header(request.content_type());
    media_constraints_admit(accepts.as_deref(), content_types.as_deref(), produces, consumes)
}

pub(crate) fn media_constraints_admit(
    accepts: Option<&[String]>,
    content_types: Option<&[String]>,
    produces: Option<&[String]>,
    consumes: Option<&[String]>,
) -> bool {
    let produce_matched = match accepts {
        None => true,
        Some(accepts) if accepts.iter().any(|a| a == "*/*") => true,
        Some(accepts) => match produces {
            Some(produces) if !produces.is_empty() => accepts
                .iter()
                .any(|a| produces.iter().any(|p| is_mime_compatible(a, p))),
            _ => false,
        },
    };

    let consume_matched = match consumes {
        None => true,
        Some(consumes) if consumes.iter().any(|c| c == "*") => true,
        Some(consumes) => match content_types {
            Some(content_types) if !consumes.is_empty() => content_types
                .iter()
                .any(|ct| consumes.iter().any(|c| is_mime_compatible(ct, c))),
            _ => false,
        },
    };

    produce_matched && consume_matched
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(entries: &[&str]) -> Vec<String> {
        entries.iter().map(|e| (*e).to_owned()).collect()
    }

    fn admit(
        accepts: Option<Vec<String>>,
        content_types: Option<Vec<String>>,
        produces: Option<Vec<String>>,
        consumes: Option<Vec<String>>,
    ) -> bool {
        media_constraints_admit(
            accepts.as_deref(),
            content_types.as_deref(),
            produces.as_deref(),
            consumes.as_deref(),
        )
    }

    #[test]
    fn normalization_strips_attributes_and_whitespace() {
        assert_eq!(
            normalize_media_type_header(Some("text/html; q=0.9, application/json")),
            Some(list(&["text/html", "application/json"]))
        );
        assert_eq!(normalize_media_type_header(None), None);
    }

    #[test]
    fn compatibility_table() {
        assert!(is_mime_compatible("application/json", "application/json"));
        assert!(is_mime_compatible("application/*", "application/json"));
        assert!(is_mime_compatible("application/json", "application/*"));
        assert!(is_mime_compatible("*/json", "text/json"));
        assert!(!is_mime_compatible("application/json", "text/json"));
        assert!(!is_mime_compatible("application/json", "application/xml"));
        assert!(!is_mime_compatible("garbage", "application/json"));
    }

    #[test]
    fn absent_accept_admits_anything() {
        assert!(admit(None, None, Some(list(&["application/json"])), None));
        assert!(admit(None, None, None, None));
    }

    #[test]
    fn star_star_accept_admits_anything() {
        assert!(admit(Some(list(&["*/*"])), None, None, None));
        assert!(admit(Some(list(&["*/*"])), None, Some(list(&["application/json"])), None));
    }

    #[test]
    fn specific_accept_requires_compatible_produces() {
        let accepts = Some(list(&["text/html"]));
        assert!(!admit(accepts.clone(), None, Some(list(&["application/json"])), None));
        assert!(admit(accepts, None, Some(list(&["text/html"])), None));
    }

    #[test]
    fn unset_produces_does_not_satisfy_specific_accept() {
        assert!(!admit(Some(list(&["application/json"])), None, None, None));
    }

    #[test]
    fn consumes_star_marker_is_unrestricted() {
        assert!(admit(None, None, None, Some(list(&["*"]))));
    }

    #[test]
    fn specific_consumes_requires_content_type() {
        let consumes = Some(list(&["application/json"]));
        assert!(!admit(None, None, None, consumes.clone()));
        assert!(admit(None, Some(list(&["application/json"])), None, consumes.clone()));
        assert!(!admit(None, Some(list(&["text/plain"])), None, consumes));
    }

    #[test]
    fn empty_consumes_list_admits_nothing() {
        assert!(!admit(None, Some(list(&["application/json"])), None, Some(Vec::new())));
    }
}
