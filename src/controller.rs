//! The dispatch entry point.
//!
//! [`HttpController::execute`] is invoked once per inbound request. It reads
//! the routing table built during registration (and never mutates it: the
//! `&self` receiver enforces that), matches path templates against the
//! request path, ranks the matches by specificity, narrows to a single
//! handler spec by media-type negotiation, and runs the four-phase handler
//! lifecycle with commit-aware short-circuiting.
//!
//! # Lifecycle
//!
//! ```text
//! before ──► serve ──► (catch on fault) ──► finally ──► flush + close
//! ```
//!
//! - `serve` is skipped when `before` commits the response.
//! - A fault in `before` or `serve` routes to the spec's `catch`, or to the
//!   default catch, which renders the standard error body.
//! - A fault in `catch` itself is fatal: logged, then propagated to the
//!   caller after `finally` and the unconditional flush/close.
//! - A fault in `finally` is logged and swallowed.

use std::collections::HashMap;

use tracing::{error, info, trace};

use crate::context::DispatchContext;
use crate::error::ServeError;
use crate::handler::HandlerSpec;
use crate::mappings::{ResourceMappings, RoutingTable};
use crate::matcher::RouteMatch;
use crate::media::{is_mime_compatible, match_media_type, normalize_media_type_header};
use crate::method::Method;
use crate::request::Request;
use crate::resource::Resource;
use crate::response::Response;
use crate::status::Status;

/// Creates a service with an empty mapping set.
///
/// ```rust
/// use resto::service;
///
/// let mut svc = service();
/// svc.resource("orders/{id}").get(|ctx| {
///     let id = ctx.path_param("id").unwrap_or("unknown").to_owned();
///     ctx.res().print(&format!(r#"{{"id":"{id}"}}"#));
///     Ok(())
/// });
/// ```
pub fn service() -> HttpController {
    HttpController::new()
}

/// The request-dispatch engine.
pub struct HttpController {
    mappings: ResourceMappings,
}

impl HttpController {
    pub fn new() -> Self {
        Self { mappings: ResourceMappings::new() }
    }

    /// Wraps an already-built mapping set.
    pub fn with_mappings(mappings: ResourceMappings) -> Self {
        Self { mappings }
    }

    /// Builds a controller from a routing-table snapshot.
    pub fn from_table(table: RoutingTable) -> Self {
        Self::with_mappings(ResourceMappings::from_table(table))
    }

    /// The resource registered under `path`, created on first reference.
    pub fn resource(&mut self, path: &str) -> &mut Resource {
        self.mappings.resource(path)
    }

    /// Alias for [`resource`](Self::resource).
    pub fn resource_path(&mut self, path: &str) -> &mut Resource {
        self.mappings.resource(path)
    }

    pub fn mappings(&self) -> &ResourceMappings {
        &self.mappings
    }

    pub fn mappings_mut(&mut self) -> &mut ResourceMappings {
        &mut self.mappings
    }

    // ── Registration shortcuts ───────────────────────────────────────────────
    // service().get("orders", h).post("orders", h2) without naming the
    // resource in between.

    pub fn get<F>(&mut self, path: &str, serve: F) -> &mut Self
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.mappings.resource(path).get(serve);
        self
    }

    pub fn post<F>(&mut self, path: &str, serve: F) -> &mut Self
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.mappings.resource(path).post(serve);
        self
    }

    pub fn put<F>(&mut self, path: &str, serve: F) -> &mut Self
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.mappings.resource(path).put(serve);
        self
    }

    pub fn delete<F>(&mut self, path: &str, serve: F) -> &mut Self
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.mappings.resource(path).delete(serve);
        self
    }

    /// Alias for [`delete`](Self::delete).
    pub fn remove<F>(&mut self, path: &str, serve: F) -> &mut Self
    where
        F: Fn(&mut DispatchContext<'_>) -> Result<(), ServeError> + Send + Sync + 'static,
    {
        self.delete(path, serve)
    }

    /// Registers `config` under `path` and `verb`, merging by
    /// `(consumes, produces)` identity.
    pub fn method(&mut self, path: &str, verb: Method, config: HandlerSpec) -> &mut Self {
        self.mappings.resource(path).method(verb, config);
        self
    }

    // ── Dispatch ─────────────────────────────────────────────────────────────

    /// Alias for [`execute`](Self::execute).
    pub fn listen(
        &self,
        request: &dyn Request,
        response: &mut dyn Response,
    ) -> Result<(), ServeError> {
        self.execute(request, response)
    }

    /// Dispatches one request.
    ///
    /// The only `Err` this returns is a fault raised by a `catch` callback,
    /// which is deliberately not swallowed. Every other failure mode ends in
    /// a well-formed error response and `Ok(())`.
    pub fn execute(
        &self,
        request: &dyn Request,
        response: &mut dyn Response,
    ) -> Result<(), ServeError> {
        let request_path = request.resource_path();
        let verb = request.method().parse::<Method>().ok();

        let accepts = normalize_media_type_header(request.header("Accept"));
        let content_types = normalize_media_type_header(request.content_type());
        let log = LogContext {
            path: request_path.to_owned(),
            method: verb.map_or_else(|| request.method().to_ascii_uppercase(), Method::upper),
            content_type: fmt_media_list(content_types.as_deref()),
            accept: fmt_media_list(accepts.as_deref()),
        };

        // Every template whose resource can answer this method, tested
        // against the request path, best first.
        let mut matches: Vec<(&Resource, RouteMatch)> = Vec::new();
        if let Some(verb) = verb {
            for resource in self.mappings.resources().values() {
                if resource.handles(verb) {
                    if let Some(route) = resource.template().test(request_path) {
                        matches.push((resource, route));
                    }
                }
            }
            matches.sort_by(rank);
        }

        let Some((resource, route)) = matches.into_iter().next() else {
            // No route for this path+method. A registered redirect may still
            // answer before the default 400 does.
            if let Some((resource, route)) = self.find_redirect(request_path) {
                return self.run_redirect(request, response, resource, &route, &log);
            }
            return self.reject(request, response, &log);
        };

        // First spec in registration order whose media types admit the
        // request.
        let spec = verb.and_then(|v| {
            resource
                .specs(v)
                .iter()
                .find(|s| match_media_type(request, s.produces.as_deref(), s.consumes.as_deref()))
        });

        match spec {
            Some(spec) => self.run_lifecycle(request, response, &route, spec, &log),
            None if resource.redirect_target().is_some() => {
                self.run_redirect(request, response, resource, &route, &log)
            }
            None => self.reject(request, response, &log),
        }
    }

    /// Sends a standardized error response.
    ///
    /// HTML-compatible clients (an `Accept` entry compatible with `*/html`)
    /// get the platform error page with a `"<name>[<code>]: <details>"`
    /// message; everyone else gets the JSON error envelope. The response is
    /// flushed and closed either way.
    pub fn send_error(
        &self,
        request: &dyn Request,
        response: &mut dyn Response,
        http_code: u16,
        application_code: Option<i64>,
        error_name: &str,
        error_details: Option<&str>,
    ) {
        let accepts = normalize_media_type_header(request.header("Accept"))
            .unwrap_or_else(|| vec!["application/json".to_owned()]);
        let is_html = accepts.iter().any(|a| is_mime_compatible("*/html", a));

        response.set_status(http_code);
        if is_html {
            let mut message = error_name.to_owned();
            if let Some(code) = application_code {
                message.push_str(&format!("[{code}]"));
            }
            if let Some(details) = error_details {
                message.push_str(": ");
                message.push_str(details);
            }
            response.send_error(http_code, Some(&message));
        } else {
            let body = serde_json::json!({
                "code": application_code,
                "error": error_name,
                "details": error_details,
            });
            response.set_header("Content-Type", "application/json");
            response.print(&serde_json::to_string_pretty(&body).unwrap_or_default());
        }
        response.flush();
        response.close();
    }

    // ── Internals ────────────────────────────────────────────────────────────

    /// Best-ranked redirect-carrying resource whose template matches, if any.
    fn find_redirect(&self, request_path: &str) -> Option<(&Resource, RouteMatch)> {
        let mut candidates: Vec<(&Resource, RouteMatch)> = Vec::new();
        for resource in self.mappings.resources().values() {
            if resource.redirect_target().is_some() {
                if let Some(route) = resource.template().test(request_path) {
                    candidates.push((resource, route));
                }
            }
        }
        candidates.sort_by(rank);
        candidates.into_iter().next()
    }

    fn run_redirect(
        &self,
        request: &dyn Request,
        response: &mut dyn Response,
        resource: &Resource,
        route: &RouteMatch,
        log: &LogContext,
    ) -> Result<(), ServeError> {
        let Some(redirect) = resource.redirect_target() else {
            return self.reject(request, response, log);
        };
        let mut ctx = DispatchContext::new(
            request,
            response,
            route.params().iter().cloned().collect(),
            request.query_parameters_map(),
        );
        let location = redirect(&mut ctx);
        trace!(resource = %log.path, location = %location, "redirecting request");
        let res = ctx.res();
        res.set_status(Status::Found.code());
        res.set_header("Location", &location);
        res.flush();
        res.close();
        Ok(())
    }

    fn run_lifecycle(
        &self,
        request: &dyn Request,
        response: &mut dyn Response,
        route: &RouteMatch,
        spec: &HandlerSpec,
        log: &LogContext,
    ) -> Result<(), ServeError> {
        let mut ctx = DispatchContext::new(
            request,
            response,
            route.params().iter().cloned().collect::<HashMap<_, _>>(),
            request.query_parameters_map(),
        );

        trace!(
            resource = %log.path,
            method = %log.method,
            content_type = %log.content_type,
            accept = %log.accept,
            "before serving request"
        );
        let mut fault = match &spec.before {
            Some(before) => before(&mut ctx).err(),
            None => None,
        };

        if fault.is_none() && !ctx.committed() {
            if let Some(serve) = &spec.serve {
                trace!(resource = %log.path, method = %log.method, "serving request");
                fault = serve(&mut ctx).err();
                trace!(resource = %log.path, method = %log.method, "serving request finished");
            }
        }

        let mut fatal = None;
        if let Some(err) = fault {
            let caught = match &spec.catch {
                Some(catch) => catch(&mut ctx, &err),
                None => {
                    self.default_catch(&mut ctx, &err, log);
                    Ok(())
                }
            };
            if let Err(catch_err) = caught {
                error!(
                    resource = %log.path,
                    method = %log.method,
                    error = %catch_err,
                    "error handler failed"
                );
                fatal = Some(catch_err);
            }
        }

        if let Some(finally) = &spec.finally {
            if let Err(finally_err) = finally(&mut ctx) {
                error!(
                    resource = %log.path,
                    method = %log.method,
                    error = %finally_err,
                    "post handler failed"
                );
            }
        }

        // Unconditional, fatal path included.
        let res = ctx.res();
        res.flush();
        res.close();

        match fatal {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    /// The default catch: derives status, name and message from the fields
    /// the handler set on the context, falling back to the fault itself,
    /// then emits the standard error body. Stack-level detail goes to the
    /// server log only, never to the client.
    fn default_catch(&self, ctx: &mut DispatchContext<'_>, err: &ServeError, log: &LogContext) {
        if ctx.suppress_stack {
            let mut details = ctx.error_name.clone().unwrap_or_default();
            if let Some(code) = ctx.error_code {
                details.push_str(&format!(" [{code}]"));
            }
            if let Some(message) = &ctx.error_message {
                details.push_str(": ");
                details.push_str(message);
            }
            info!(
                resource = %log.path,
                method = %log.method,
                content_type = %log.content_type,
                accept = %log.accept,
                "serving finished in error. {details}"
            );
        } else {
            error!(
                resource = %log.path,
                method = %log.method,
                content_type = %log.content_type,
                accept = %log.accept,
                error = %err,
                "serving finished in error"
            );
        }

        let http_code = ctx.http_error_code.unwrap_or(Status::InternalServerError.code());
        let application_code = ctx.error_code;
        let error_name = ctx.error_name.clone().unwrap_or_else(|| err.name.clone());
        let error_message = ctx.error_message.clone().unwrap_or_else(|| err.message.clone());
        let (request, response) = ctx.parts();
        self.send_error(
            request,
            response,
            http_code,
            application_code,
            &error_name,
            Some(&error_message),
        );
    }

    fn reject(
        &self,
        request: &dyn Request,
        response: &mut dyn Response,
        log: &LogContext,
    ) -> Result<(), ServeError> {
        error!(
            resource = %log.path,
            method = %log.method,
            content_type = %log.content_type,
            accept = %log.accept,
            "no suitable resource handler found"
        );
        self.send_error(
            request,
            response,
            Status::BadRequest.code(),
            None,
            "Bad Request",
            Some("No suitable processor for this request."),
        );
        Ok(())
    }
}

impl Default for HttpController {
    fn default() -> Self {
        Self::new()
    }
}

struct LogContext {
    path: String,
    method: String,
    content_type: String,
    accept: String,
}

/// Specificity ordering, best match first: literal routes (no captured
/// parameters) outrank templated ones; among templated routes the one with
/// fewer placeholders wins.
fn rank<'r>(
    a: &(&'r Resource, RouteMatch),
    b: &(&'r Resource, RouteMatch),
) -> std::cmp::Ordering {
    let (wa, wb) = (route_weight(&a.1), route_weight(&b.1));
    wb.cmp(&wa).then_with(|| {
        a.0.template()
            .placeholder_count()
            .cmp(&b.0.template().placeholder_count())
    })
}

fn route_weight(route: &RouteMatch) -> u8 {
    if route.has_params() { 0 } else { 1 }
}

fn fmt_media_list(entries: Option<&[String]>) -> String {
    match entries {
        Some(entries) => format!("[{}]", entries.join(", ")),
        None => "[]".to_owned(),
    }
}
