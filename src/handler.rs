//! Handler specs and the shared callback plumbing.
//!
//! # How lifecycle callbacks are stored
//!
//! A routing table holds callbacks of *different* concrete types in one
//! structure, so each callback is erased behind `Arc<dyn Fn…>`. `Arc` rather
//! than `Box` because a [`HandlerSpec`] must be `Clone`: a
//! [`configuration()`](crate::ResourceMappings::configuration) snapshot
//! shares the registered callbacks instead of copying them, one atomic
//! reference-count bump per callback.
//!
//! The four lifecycle phases share one callback shape,
//! `Fn(&mut DispatchContext) -> Result<(), ServeError>`; `catch`
//! additionally receives the fault it is recovering from. A phase with no
//! callback is `None`, which dispatch treats as a no-op (or, for `catch`,
//! as "use the default catch").

use std::fmt;
use std::sync::Arc;

use crate::context::DispatchContext;
use crate::error::ServeError;

/// A `before`, `serve` or `finally` lifecycle callback.
pub type Callback =
    Arc<dyn Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync>;

/// A `catch` lifecycle callback. The second argument is the fault raised by
/// `before` or `serve`.
pub type CatchCallback =
    Arc<dyn Fn(&mut DispatchContext<'_>, &ServeError) -> Result<(), ServeError> + Send + Sync>;

/// A redirect target resolver, returning the URI to redirect to.
pub type RedirectCallback = Arc<dyn Fn(&mut DispatchContext<'_>) -> String + Send + Sync>;

/// One method+media-type-filtered handler registration: the atomic routable
/// unit.
///
/// Identity for de-duplication and update is the `(consumes, produces)` pair
/// under exact array equality; registering a second spec with the same
/// identity under the same method merges into the first instead of appending.
#[derive(Clone, Default)]
pub struct HandlerSpec {
    /// Request content types accepted. `None` or a `"*"` entry means
    /// unrestricted.
    pub consumes: Option<Vec<String>>,
    /// Response content types offered. `None` means unrestricted on the
    /// spec's side (a specific `Accept` still will not match it).
    pub produces: Option<Vec<String>>,
    pub before: Option<Callback>,
    pub serve: Option<Callback>,
    pub catch: Option<CatchCallback>,
    pub finally: Option<Callback>,
}

impl HandlerSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// A spec whose `serve` phase is `f`, the shape the `get`/`post`/…
    /// sugar produces from a bare callback.
    pub fn serving<F>(f: F) -> Self
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        Self { serve: Some(Arc::new(f)), ..Self::default() }
    }

    /// Exact structural identity match: both sides' `consumes` and
    /// `produces` must be array-equal, and `None` only equals `None`.
    pub fn matches(&self, consumes: Option<&[String]>, produces: Option<&[String]>) -> bool {
        self.consumes.as_deref() == consumes && self.produces.as_deref() == produces
    }

    /// Update semantics: every field present on `patch` overwrites the
    /// corresponding field here, so a later registration can add a `catch`
    /// to a spec created by an earlier `serve`-only registration.
    pub(crate) fn merge(&mut self, patch: HandlerSpec) {
        if patch.consumes.is_some() {
            self.consumes = patch.consumes;
        }
        if patch.produces.is_some() {
            self.produces = patch.produces;
        }
        if patch.before.is_some() {
            self.before = patch.before;
        }
        if patch.serve.is_some() {
            self.serve = patch.serve;
        }
        if patch.catch.is_some() {
            self.catch = patch.catch;
        }
        if patch.finally.is_some() {
            self.finally = patch.finally;
        }
    }
}

impl fmt::Debug for HandlerSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerSpec")
            .field("consumes", &self.consumes)
            .field("produces", &self.produces)
            .field("before", &self.before.is_some())
            .field("serve", &self.serve.is_some())
            .field("catch", &self.catch.is_some())
            .field("finally", &self.finally.is_some())
            .finish()
    }
}

/// Fluent handle over one registered [`HandlerSpec`].
///
/// Returned by [`Resource::method`](crate::Resource::method) and the
/// per-method sugar so registrations chain naturally:
///
/// ```rust
/// use resto::service;
///
/// let mut svc = service();
/// svc.resource("orders")
///     .get(|_ctx| Ok(()))
///     .produces(&["application/json"]);
/// ```
pub struct ResourceMethod<'r> {
    spec: &'r mut HandlerSpec,
}

impl<'r> ResourceMethod<'r> {
    pub(crate) fn new(spec: &'r mut HandlerSpec) -> Self {
        Self { spec }
    }

    /// The spec this handle configures.
    pub fn configuration(&self) -> &HandlerSpec {
        self.spec
    }

    /// Declares the request content types this spec consumes.
    ///
    /// # Panics
    ///
    /// Panics when an entry is not in `type/subtype` form. Registration-time
    /// misuse fails fast, like registering an invalid route.
    pub fn consumes(self, mime_types: &[&str]) -> Self {
        mime_setting(&mut self.spec.consumes, "consumes", mime_types);
        self
    }

    /// Declares the response content types this spec produces.
    ///
    /// # Panics
    ///
    /// Panics when an entry is not in `type/subtype` form.
    pub fn produces(self, mime_types: &[&str]) -> Self {
        mime_setting(&mut self.spec.produces, "produces", mime_types);
        self
    }

    pub fn before<F>(self, f: F) -> Self
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.spec.before = Some(Arc::new(f));
        self
    }

    pub fn serve<F>(self, f: F) -> Self
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.spec.serve = Some(Arc::new(f));
        self
    }

    pub fn catch<F>(self, f: F) -> Self
    where
        F: Fn(&mut DispatchContext<'_>, &ServeError) -> Result<(), ServeError>
            + Send
            + Sync
            + 'static,
    {
        self.spec.catch = Some(Arc::new(f));
        self
    }

    pub fn finally<F>(self, f: F) -> Self
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.spec.finally = Some(Arc::new(f));
        self
    }
}

/// Common initializer for the `consumes`/`produces` lists: validates the
/// `type/subtype` shape and appends with exact-match de-duplication.
fn mime_setting(slot: &mut Option<Vec<String>>, setting: &str, mime_types: &[&str]) {
    for mime_type in mime_types {
        let well_formed = mime_type
            .split_once('/')
            .is_some_and(|(t, s)| !t.is_empty() && !s.is_empty());
        if !well_formed {
            panic!("invalid {setting} entry `{mime_type}`: expected type/subtype");
        }
    }
    let entries = slot.get_or_insert_with(Vec::new);
    for mime_type in mime_types {
        if !entries.iter().any(|e| e == mime_type) {
            entries.push((*mime_type).to_owned());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_treats_none_and_some_as_distinct() {
        let json = vec!["application/json".to_owned()];
        let empty: Vec<String> = Vec::new();
        let spec = HandlerSpec { produces: Some(json.clone()), ..HandlerSpec::new() };
        assert!(spec.matches(None, Some(json.as_slice())));
        assert!(!spec.matches(None, None));
        assert!(!spec.matches(Some(empty.as_slice()), Some(json.as_slice())));
    }

    #[test]
    fn merge_overwrites_only_present_fields() {
        let mut spec = HandlerSpec::serving(|_ctx| Ok(()));
        assert!(spec.catch.is_none());
        spec.merge(HandlerSpec {
            catch: Some(Arc::new(|_ctx: &mut DispatchContext, _err: &ServeError| Ok(()))),
            ..HandlerSpec::new()
        });
        assert!(spec.serve.is_some(), "merge must not clear the earlier serve");
        assert!(spec.catch.is_some());
    }

    #[test]
    fn mime_setting_deduplicates() {
        let mut spec = HandlerSpec::new();
        ResourceMethod::new(&mut spec)
            .produces(&["application/json", "text/json"])
            .produces(&["application/json"]);
        assert_eq!(
            spec.produces,
            Some(vec!["application/json".to_owned(), "text/json".to_owned()])
        );
    }

    #[test]
    #[should_panic(expected = "expected type/subtype")]
    fn malformed_mime_type_is_rejected() {
        let mut spec = HandlerSpec::new();
        ResourceMethod::new(&mut spec).consumes(&["json"]);
    }
}
