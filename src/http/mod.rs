//! Request/response values, the transport the serving loop polls, and the
//! route table handlers are registered in.
//!
//! Sockets and HTTP parsing belong to a real server (`EspHttpServer` on the
//! board, axum on a desktop) running on its own thread. It forwards each
//! finished request over a [`bridge`].

pub use ::http::{Method, StatusCode};

pub mod bridge;
pub mod handlers;
#[cfg(not(target_os = "espidf"))]
pub mod host;
pub mod router;
pub mod transport;

pub use bridge::{ChannelTransport, RequestSender};
pub use router::{Handler, RouteError, RouteTable, RouteTableBuilder};
pub use transport::{ScriptedTransport, Transport, TransportError};

pub const TEXT_PLAIN: &str = "text/plain";
pub const APPLICATION_JSON: &str = "application/json";

/// Largest request body a front end hands to the loop.
pub const MAX_BODY: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Path part of the request target, without the query string.
    pub uri: String,
    /// Query and form arguments in the order they were received.
    pub args: Vec<(String, String)>,
}

impl Request {
    pub fn new(method: Method, uri: impl Into<String>) -> Self {
        Self {
            method,
            uri: uri.into(),
            args: Vec::new(),
        }
    }

    /// Build a request from what a server hands over: the raw request target,
    /// the `Content-Type` header and the body.
    ///
    /// Query arguments come first, then the fields of an
    /// `application/x-www-form-urlencoded` body. Any other non-empty body
    /// becomes a single `plain` argument.
    pub fn from_wire(
        method: Method,
        target: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((p, q)) => (p, Some(q)),
            None => (target, None),
        };
        let mut request = Self::new(method, path);
        if let Some(query) = query {
            request.append_form_args(query.as_bytes());
        }

        let form_body = content_type.is_some_and(|ct| {
            ct.trim_start()
                .to_ascii_lowercase()
                .starts_with("application/x-www-form-urlencoded")
        });
        if form_body {
            request.append_form_args(body);
        } else if !body.is_empty() {
            request
                .args
                .push(("plain".to_string(), String::from_utf8_lossy(body).into_owned()));
        }
        request
    }

    fn append_form_args(&mut self, input: &[u8]) {
        self.args.extend(
            url::form_urlencoded::parse(input).map(|(n, v)| (n.into_owned(), v.into_owned())),
        );
    }

    pub fn get(uri: impl Into<String>) -> Self {
        Self::new(Method::GET, uri)
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.args.push((name.into(), value.into()));
        self
    }

    /// First value of the named argument.
    pub fn arg(&self, name: &str) -> Option<&str> {
        self.args
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: StatusCode,
    pub content_type: &'static str,
    pub body: String,
}

impl Response {
    pub fn new(status: StatusCode, content_type: &'static str, body: impl Into<String>) -> Self {
        Self {
            status,
            content_type,
            body: body.into(),
        }
    }

    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, TEXT_PLAIN, body)
    }

    pub fn json(status: StatusCode, body: impl Into<String>) -> Self {
        Self::new(status, APPLICATION_JSON, body)
    }
}

#[test]
fn test_request_arg_lookup() {
    let req = Request::get("/x").with_arg("a", "1").with_arg("a", "2");
    assert_eq!(req.arg("a"), Some("1"));
    assert_eq!(req.arg("b"), None);
}

#[test]
fn test_from_wire_query_args_in_order() {
    let req = Request::from_wire(Method::GET, "/nope?b=2&a=hello+world&c=%2F", None, b"");
    assert_eq!(req.uri, "/nope");
    assert_eq!(
        req.args,
        vec![
            ("b".to_string(), "2".to_string()),
            ("a".to_string(), "hello world".to_string()),
            ("c".to_string(), "/".to_string()),
        ]
    );
}

#[test]
fn test_from_wire_form_body_follows_query() {
    let req = Request::from_wire(
        Method::POST,
        "/form?q=1",
        Some("application/x-www-form-urlencoded; charset=utf-8"),
        b"x=9&y=8",
    );
    let names: Vec<_> = req.args.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, ["q", "x", "y"]);
}

#[test]
fn test_from_wire_plain_body() {
    let req = Request::from_wire(Method::PUT, "/raw", Some("application/json"), b"{\"a\":1}\n");
    assert_eq!(req.args.len(), 1);
    assert_eq!(req.arg("plain"), Some("{\"a\":1}\n"));

    let empty = Request::from_wire(Method::POST, "/raw", None, b"");
    assert!(empty.args.is_empty());
}
