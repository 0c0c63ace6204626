//! Per-path resource configuration.
//!
//! A [`Resource`] owns everything registered under one path template: an
//! ordered list of [`HandlerSpec`]s per HTTP method, plus an optional
//! redirect. Resources are created lazily by their owning
//! [`ResourceMappings`](crate::ResourceMappings) the first time a path is
//! referenced and live for the lifetime of the controller; routes are
//! added, updated or disabled, never removed individually.

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::context::DispatchContext;
use crate::error::ServeError;
use crate::handler::{HandlerSpec, RedirectCallback, ResourceMethod};
use crate::matcher::PathTemplate;
use crate::method::Method;

/// A path template plus its per-method handler specs.
pub struct Resource {
    path: String,
    template: PathTemplate,
    methods: BTreeMap<Method, Vec<HandlerSpec>>,
    redirect: Option<RedirectCallback>,
}

impl Resource {
    pub(crate) fn new(path: &str) -> Self {
        Self {
            path: path.to_owned(),
            template: PathTemplate::compile(path),
            methods: BTreeMap::new(),
            redirect: None,
        }
    }

    /// The path template this resource is registered under.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Re-registers this resource under a new path template.
    pub fn set_path(&mut self, path: &str) -> &mut Self {
        self.path = path.to_owned();
        self.template = PathTemplate::compile(path);
        self
    }

    pub(crate) fn template(&self) -> &PathTemplate {
        &self.template
    }

    /// Registers `config` under `verb`.
    ///
    /// If a spec with the same `(consumes, produces)` identity already exists
    /// for that method, `config` is merged into it (update); otherwise it is
    /// appended. Either way the returned handle points at the surviving spec,
    /// so chain-setters refine it in place.
    pub fn method(&mut self, verb: Method, config: HandlerSpec) -> ResourceMethod<'_> {
        let specs = self.methods.entry(verb).or_default();
        let position = specs
            .iter()
            .position(|s| s.matches(config.consumes.as_deref(), config.produces.as_deref()));
        let index = match position {
            Some(i) => {
                specs[i].merge(config);
                i
            }
            None => {
                specs.push(config);
                specs.len() - 1
            }
        };
        ResourceMethod::new(&mut specs[index])
    }

    /// Registers several specs under `verb` in one call.
    pub fn method_each(&mut self, verb: Method, configs: Vec<HandlerSpec>) -> &mut Self {
        for config in configs {
            self.method(verb, config);
        }
        self
    }

    pub fn get<F>(&mut self, serve: F) -> ResourceMethod<'_>
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.method(Method::Get, HandlerSpec::serving(serve))
    }

    pub fn post<F>(&mut self, serve: F) -> ResourceMethod<'_>
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.method(Method::Post, HandlerSpec::serving(serve))
    }

    pub fn put<F>(&mut self, serve: F) -> ResourceMethod<'_>
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.method(Method::Put, HandlerSpec::serving(serve))
    }

    pub fn delete<F>(&mut self, serve: F) -> ResourceMethod<'_>
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.method(Method::Delete, HandlerSpec::serving(serve))
    }

    /// Alias for [`delete`](Self::delete).
    pub fn remove<F>(&mut self, serve: F) -> ResourceMethod<'_>
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.delete(serve)
    }

    /// Finds the first spec matching the given constraints exactly.
    ///
    /// A `None` method filter means "any method". The `consumes`/`produces`
    /// filters are structural: `None` only matches specs whose corresponding
    /// list is unset.
    pub fn find(
        &mut self,
        verb: Option<Method>,
        consumes: Option<&[String]>,
        produces: Option<&[String]>,
    ) -> Option<ResourceMethod<'_>> {
        for (v, specs) in self.methods.iter_mut() {
            if verb.is_none() || verb == Some(*v) {
                if let Some(spec) = specs.iter_mut().find(|s| s.matches(consumes, produces)) {
                    return Some(ResourceMethod::new(spec));
                }
            }
        }
        None
    }

    /// Installs a redirect to a fixed target URI.
    pub fn redirect(&mut self, target: &str) -> &mut Self {
        let target = target.to_owned();
        self.redirect = Some(Arc::new(move |_ctx| target.clone()));
        self
    }

    /// Installs a redirect whose target is computed per request.
    pub fn redirect_with<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&mut DispatchContext<'_>) -> String + Send + Sync + 'static,
    {
        self.redirect = Some(Arc::new(f));
        self
    }

    pub(crate) fn redirect_target(&self) -> Option<&RedirectCallback> {
        self.redirect.as_ref()
    }

    /// Removes specs matching the `(consumes, produces)` filters from every
    /// method that does NOT equal `verb`.
    ///
    /// The method filter is deliberately inverted relative to
    /// [`find`](Self::find): `find` treats `None` as "any method", while
    /// `disable` treats a given method as the one to exclude and a `None`
    /// filter as a no-op. The asymmetry is long-standing observed behavior
    /// that callers depend on; keep it.
    pub fn disable(
        &mut self,
        verb: Option<Method>,
        consumes: Option<&[String]>,
        produces: Option<&[String]>,
    ) -> &mut Self {
        let Some(excluded) = verb else {
            return self;
        };
        for (v, specs) in self.methods.iter_mut() {
            if *v != excluded {
                specs.retain(|s| !s.matches(consumes, produces));
            }
        }
        self
    }

    /// Strips every method except GET, HEAD and TRACE.
    pub fn readonly(&mut self) -> &mut Self {
        self.methods
            .retain(|m, _| matches!(m, Method::Get | Method::Head | Method::Trace));
        self
    }

    /// The raw `{method: [spec]}` table, for aggregation by the owning
    /// mappings.
    pub fn configuration(&self) -> &BTreeMap<Method, Vec<HandlerSpec>> {
        &self.methods
    }

    pub(crate) fn handles(&self, verb: Method) -> bool {
        self.methods.get(&verb).is_some_and(|specs| !specs.is_empty())
    }

    pub(crate) fn specs(&self, verb: Method) -> &[HandlerSpec] {
        self.methods.get(&verb).map_or(&[], Vec::as_slice)
    }
}
