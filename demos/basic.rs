//! Minimal resto example: CRUD-style JSON endpoints dispatched in-process.
//!
//! Run with:
//!   RUST_LOG=trace cargo run --example basic
//!
//! resto has no transport of its own. This demo wraps plain structs in the
//! `Request`/`Response` capability traits and pushes a few requests through
//! the controller, printing what comes out the other side.

use resto::{QueryValue, Request, Response, ServeError, service};

fn main() {
    tracing_subscriber::fmt::init();

    let mut svc = service();

    // GET /users/{id}
    svc.resource("users/{id}")
        .get(|ctx| {
            let id = ctx.path_param("id").unwrap_or("unknown").to_owned();
            ctx.res().set_header("Content-Type", "application/json");
            ctx.res().print(&format!(r#"{{"id":"{id}","name":"alice"}}"#));
            Ok(())
        })
        .produces(&["application/json"]);

    // POST /users insists on JSON input, guards with a before callback.
    svc.resource("users")
        .post(|ctx| {
            ctx.res().set_status(201);
            ctx.res().set_header("Location", "/users/99");
            ctx.res().print(r#"{"id":"99","name":"new_user"}"#);
            Ok(())
        })
        .consumes(&["application/json"])
        .before(|ctx| {
            if ctx.query_param("dryRun") == Some(&QueryValue::Flag) {
                ctx.res().set_status(204);
                ctx.res().print("");
            }
            Ok(())
        });

    // DELETE /users/{id} faults demonstrate the default catch.
    svc.resource("users/{id}").delete(|_ctx| {
        Err(ServeError::new("NotAllowed", "users cannot be deleted yet"))
    });

    run(&svc, DemoRequest::get("users/42"));
    run(
        &svc,
        DemoRequest::new("POST", "users").header("Content-Type", "application/json"),
    );
    run(&svc, DemoRequest::new("DELETE", "users/42"));
    run(&svc, DemoRequest::get("nowhere"));
}

fn run(svc: &resto::HttpController, request: DemoRequest) {
    let mut response = DemoResponse::default();
    match svc.execute(&request, &mut response) {
        Ok(()) => println!(
            "{} {} -> {} {}\n",
            request.method,
            request.path,
            response.status,
            response.body
        ),
        Err(fatal) => println!("{} {} -> fatal: {fatal}\n", request.method, request.path),
    }
}

// ── Demo transport ────────────────────────────────────────────────────────────

struct DemoRequest {
    method: String,
    path: String,
    query: Option<String>,
    headers: Vec<(String, String)>,
}

impl DemoRequest {
    fn new(method: &str, path: &str) -> Self {
        Self {
            method: method.to_owned(),
            path: path.to_owned(),
            query: None,
            headers: Vec::new(),
        }
    }

    fn get(path: &str) -> Self {
        Self::new("GET", path)
    }

    fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_owned(), value.to_owned()));
        self
    }
}

impl Request for DemoRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn resource_path(&self) -> &str {
        &self.path
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    fn query_string(&self) -> Option<&str> {
        self.query.as_deref()
    }
}

struct DemoResponse {
    status: u16,
    body: String,
    committed: bool,
}

impl Default for DemoResponse {
    fn default() -> Self {
        Self { status: 200, body: String::new(), committed: false }
    }
}

impl Response for DemoResponse {
    fn set_status(&mut self, code: u16) {
        self.status = code;
    }

    fn send_error(&mut self, code: u16, message: Option<&str>) {
        self.status = code;
        self.body = message.unwrap_or_default().to_owned();
        self.committed = true;
    }

    fn set_header(&mut self, _name: &str, _value: &str) {}

    fn print(&mut self, text: &str) {
        self.body.push_str(text);
        self.committed = true;
    }

    fn is_committed(&self) -> bool {
        self.committed
    }

    fn flush(&mut self) {}

    fn close(&mut self) {}
}
