//! # resto
//!
//! A minimal resource-routing and request-dispatch engine for REST services.
//! Nothing more. Nothing less.
//!
//! ## The contract
//!
//! The host runtime owns the transport: sockets, TLS, body parsing, sessions.
//! resto does not. It consumes an abstract [`Request`] /
//! [`Response`] capability pair and owns the only part that changes between
//! services:
//!
//! - **Path-template routing** — `orders/{id}`, `files/{path*}`, with
//!   literal-first specificity ranking
//! - **Method and media-type negotiation** — `consumes`/`produces` matched
//!   against `Content-Type`/`Accept`
//! - **A four-phase handler lifecycle** — before/serve/catch/finally with
//!   commit-aware short-circuiting and a standardized error envelope
//!
//! ## Quick start
//!
//! ```rust
//! use resto::service;
//!
//! let mut svc = service();
//! svc.resource("orders/{id}")
//!     .get(|ctx| {
//!         let id = ctx.path_param("id").unwrap_or("unknown").to_owned();
//!         ctx.res().set_header("Content-Type", "application/json");
//!         ctx.res().print(&format!(r#"{{"id":"{id}"}}"#));
//!         Ok(())
//!     })
//!     .produces(&["application/json"]);
//!
//! // svc.execute(&request, &mut response) dispatches one request against
//! // whatever transport objects the host wraps in the capability traits.
//! ```
//!
//! Registration happens once at startup; [`HttpController::execute`] then
//! serves requests through `&self`, so the routing table is immutable for
//! the life of the service.

mod context;
mod controller;
mod error;
mod handler;
mod mappings;
mod matcher;
mod media;
mod method;
mod request;
mod resource;
mod response;
mod status;

pub use context::{DispatchContext, QueryValue, parse_query};
pub use controller::{HttpController, service};
pub use error::{Error, ServeError};
pub use handler::{Callback, CatchCallback, HandlerSpec, RedirectCallback, ResourceMethod};
pub use mappings::{ResourceMappings, RouteDecl, RoutingTable};
pub use matcher::{PathTemplate, RouteMatch};
pub use media::{is_mime_compatible, match_media_type, normalize_media_type_header};
pub use method::Method;
pub use request::Request;
pub use resource::Resource;
pub use response::Response;
pub use status::Status;
