//! The collection of resources a controller serves.
//!
//! [`ResourceMappings`] owns [`Resource`] instances keyed by normalized path
//! and aggregates their configuration into the routing table the controller
//! matches against. It is populated during service registration, through the
//! fluent API or from declarative [`RouteDecl`] records, and read for the
//! rest of the process lifetime.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::handler::{HandlerSpec, ResourceMethod};
use crate::method::Method;
use crate::resource::Resource;

/// The aggregate `{path: {method: [spec]}}` snapshot produced by
/// [`ResourceMappings::configuration`]. Feeding it back into
/// [`ResourceMappings::from_table`] reproduces an equivalent mapping set.
pub type RoutingTable = BTreeMap<String, BTreeMap<Method, Vec<HandlerSpec>>>;

/// One declarative route record.
///
/// The declarative entry point deliberately carries no callbacks: records
/// declare the routable shape (path, method, media-type constraints) and the
/// handlers are attached afterwards via [`ResourceMappings::find`] or the
/// registration API, which merges by `(consumes, produces)` identity.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RouteDecl {
    pub path: String,
    pub method: String,
    #[serde(default)]
    pub consumes: Option<Vec<String>>,
    #[serde(default)]
    pub produces: Option<Vec<String>>,
}

/// Mappings between path templates and their resource configurations.
#[derive(Default)]
pub struct ResourceMappings {
    resources: BTreeMap<String, Resource>,
}

/// Strips one leading `/`, so `"/orders"` and `"orders"` denote the same
/// resource.
fn normalize_path(path: &str) -> &str {
    path.strip_prefix('/').unwrap_or(path)
}

impl ResourceMappings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a mapping set from declarative records, parsed once at load
    /// time into the typed model.
    pub fn from_declared(decls: Vec<RouteDecl>) -> Result<Self, Error> {
        let mut mappings = Self::new();
        for decl in decls {
            let verb: Method = decl.method.parse()?;
            mappings.resource(&decl.path).method(
                verb,
                HandlerSpec { consumes: decl.consumes, produces: decl.produces, ..HandlerSpec::new() },
            );
        }
        Ok(mappings)
    }

    /// Rebuilds a mapping set from a [`configuration`](Self::configuration)
    /// snapshot.
    pub fn from_table(table: RoutingTable) -> Self {
        let mut mappings = Self::new();
        for (path, methods) in table {
            let resource = mappings.resource(&path);
            for (verb, specs) in methods {
                resource.method_each(verb, specs);
            }
        }
        mappings
    }

    /// Returns the resource registered under `path`, creating it on first
    /// reference.
    pub fn resource(&mut self, path: &str) -> &mut Resource {
        let key = normalize_path(path);
        self.resources
            .entry(key.to_owned())
            .or_insert_with(|| Resource::new(key))
    }

    /// Alias for [`resource`](Self::resource).
    pub fn path(&mut self, path: &str) -> &mut Resource {
        self.resource(path)
    }

    /// Alias for [`resource`](Self::resource).
    pub fn resource_path(&mut self, path: &str) -> &mut Resource {
        self.resource(path)
    }

    /// Aggregates every resource's configuration into one routing table.
    pub fn configuration(&self) -> RoutingTable {
        self.resources
            .iter()
            .map(|(path, resource)| (path.clone(), resource.configuration().clone()))
            .collect()
    }

    /// Finds a registered spec by path and structural constraints. `None`
    /// when the path was never registered or nothing matches.
    pub fn find(
        &mut self,
        path: &str,
        verb: Option<Method>,
        consumes: Option<&[String]>,
        produces: Option<&[String]>,
    ) -> Option<ResourceMethod<'_>> {
        self.resources
            .get_mut(normalize_path(path))?
            .find(verb, consumes, produces)
    }

    /// Strips every resource down to GET, HEAD and TRACE.
    pub fn readonly(&mut self) -> &mut Self {
        for resource in self.resources.values_mut() {
            resource.readonly();
        }
        self
    }

    /// Broadcasts [`Resource::disable`] to every owned resource.
    pub fn disable(
        &mut self,
        verb: Option<Method>,
        consumes: Option<&[String]>,
        produces: Option<&[String]>,
    ) -> &mut Self {
        for resource in self.resources.values_mut() {
            resource.disable(verb, consumes, produces);
        }
        self
    }

    pub(crate) fn resources(&self) -> &BTreeMap<String, Resource> {
        &self.resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leading_slash_is_normalized() {
        let mut mappings = ResourceMappings::new();
        mappings.resource("/orders").get(|_ctx| Ok(()));
        mappings.resource("orders").post(|_ctx| Ok(()));
        assert_eq!(mappings.resources().len(), 1);

        let table = mappings.configuration();
        let methods = table.get("orders").expect("normalized key");
        assert_eq!(methods.len(), 2);
    }

    #[test]
    fn configuration_round_trips() {
        let mut mappings = ResourceMappings::new();
        mappings.resource("orders").get(|_ctx| Ok(())).produces(&["application/json"]);
        mappings.resource("orders/{id}").get(|_ctx| Ok(()));
        mappings.resource("files/{path*}").put(|_ctx| Ok(())).consumes(&["*"]);

        let rebuilt = ResourceMappings::from_table(mappings.configuration());

        let shape = |m: &ResourceMappings| -> Vec<(String, Method, Option<Vec<String>>, Option<Vec<String>>)> {
            m.configuration()
                .into_iter()
                .flat_map(|(path, methods)| {
                    methods.into_iter().flat_map(move |(verb, specs)| {
                        let path = path.clone();
                        specs
                            .into_iter()
                            .map(move |s| (path.clone(), verb, s.consumes, s.produces))
                    })
                })
                .collect()
        };
        assert_eq!(shape(&mappings), shape(&rebuilt));
    }

    #[test]
    fn declarative_records_build_the_typed_model() {
        let decls: Vec<RouteDecl> = serde_json::from_str(
            r#"[
                {"path": "orders", "method": "GET", "produces": ["application/json"]},
                {"path": "orders", "method": "post", "consumes": ["application/json"]}
            ]"#,
        )
        .unwrap();
        let mut mappings = ResourceMappings::from_declared(decls).unwrap();

        let json = vec!["application/json".to_owned()];
        assert!(mappings.find("orders", Some(Method::Get), None, Some(json.as_slice())).is_some());
        assert!(mappings.find("/orders", Some(Method::Post), Some(json.as_slice()), None).is_some());
        assert!(mappings.find("orders", Some(Method::Get), None, None).is_none());
    }

    #[test]
    fn declarative_records_reject_unknown_methods() {
        let decls = vec![RouteDecl {
            path: "orders".to_owned(),
            method: "BREW".to_owned(),
            consumes: None,
            produces: None,
        }];
        assert!(ResourceMappings::from_declared(decls).is_err());
    }

    #[test]
    fn readonly_broadcasts_to_all_resources() {
        let mut mappings = ResourceMappings::new();
        mappings.resource("a").post(|_ctx| Ok(()));
        mappings.resource("b").get(|_ctx| Ok(()));
        mappings.resource("b").put(|_ctx| Ok(()));

        mappings.readonly();
        let table = mappings.configuration();
        assert!(table.get("a").map_or(true, |m| m.is_empty()));
        assert_eq!(table.get("b").map(|m| m.len()), Some(1));
    }

    #[test]
    fn find_on_unknown_path_is_none() {
        let mut mappings = ResourceMappings::new();
        assert!(mappings.find("nope", None, None, None).is_none());
    }
}
