//! Exact-path route table with a mandatory fallback.
//!
//! Routes are registered on a [`RouteTableBuilder`] during startup. `build()`
//! refuses a table without a fallback, so a built [`RouteTable`] always
//! resolves and can no longer be changed.

use super::{Request, Response};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("route {0:?} registered twice")]
    DuplicatePath(String),
    #[error("fallback handler registered twice")]
    DuplicateFallback,
    #[error("no fallback handler registered")]
    MissingFallback,
}

pub trait Handler {
    fn handle(&self, request: &Request) -> Response;
}

impl<F> Handler for F
where
    F: Fn(&Request) -> Response,
{
    fn handle(&self, request: &Request) -> Response {
        self(request)
    }
}

#[derive(Default)]
pub struct RouteTableBuilder {
    routes: Vec<(String, Box<dyn Handler>)>,
    fallback: Option<Box<dyn Handler>>,
}

impl RouteTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<H>(&mut self, path: impl Into<String>, handler: H) -> Result<(), RouteError>
    where
        H: Handler + 'static,
    {
        let path = path.into();
        if self.routes.iter().any(|(p, _)| *p == path) {
            return Err(RouteError::DuplicatePath(path));
        }
        log::debug!("route {}", path);
        self.routes.push((path, Box::new(handler)));
        Ok(())
    }

    pub fn register_fallback<H>(&mut self, handler: H) -> Result<(), RouteError>
    where
        H: Handler + 'static,
    {
        if self.fallback.is_some() {
            return Err(RouteError::DuplicateFallback);
        }
        self.fallback = Some(Box::new(handler));
        Ok(())
    }

    pub fn build(self) -> Result<RouteTable, RouteError> {
        let fallback = self.fallback.ok_or(RouteError::MissingFallback)?;
        Ok(RouteTable {
            routes: self.routes,
            fallback,
        })
    }
}

pub struct RouteTable {
    routes: Vec<(String, Box<dyn Handler>)>,
    fallback: Box<dyn Handler>,
}

impl RouteTable {
    pub fn builder() -> RouteTableBuilder {
        RouteTableBuilder::new()
    }

    /// Exact match on the path, otherwise the fallback.
    pub fn resolve(&self, path: &str) -> &dyn Handler {
        self.routes
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, h)| h.as_ref())
            .unwrap_or(self.fallback.as_ref())
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|(p, _)| p.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    fn fixed(body: &'static str) -> impl Fn(&Request) -> Response {
        move |_| Response::text(StatusCode::OK, body)
    }

    #[test]
    fn test_duplicate_path_rejected() {
        let mut b = RouteTable::builder();
        b.register("/", fixed("a")).unwrap();
        assert_eq!(
            b.register("/", fixed("b")),
            Err(RouteError::DuplicatePath("/".to_string()))
        );
    }

    #[test]
    fn test_fallback_required_once() {
        let mut b = RouteTable::builder();
        b.register("/", fixed("a")).unwrap();
        assert_eq!(b.build().err(), Some(RouteError::MissingFallback));

        let mut b = RouteTable::builder();
        b.register_fallback(fixed("nf")).unwrap();
        assert_eq!(
            b.register_fallback(fixed("nf")),
            Err(RouteError::DuplicateFallback)
        );
    }

    #[test]
    fn test_resolve() {
        let mut b = RouteTable::builder();
        b.register("/", fixed("root")).unwrap();
        b.register("/inline", fixed("inline")).unwrap();
        b.register_fallback(|_: &Request| Response::text(StatusCode::NOT_FOUND, "nf"))
            .unwrap();
        let table = b.build().unwrap();

        let req = Request::get("/");
        assert_eq!(table.resolve("/").handle(&req).body, "root");
        assert_eq!(table.resolve("/inline").handle(&req).body, "inline");
        // exact match only
        assert_eq!(table.resolve("/inline/").handle(&req).body, "nf");
        assert_eq!(table.resolve("").handle(&req).body, "nf");
        assert_eq!(table.paths().collect::<Vec<_>>(), ["/", "/inline"]);
    }
}
