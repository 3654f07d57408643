//! Request sources the dispatcher can poll without blocking.

use std::collections::VecDeque;
use std::time::Duration;

use super::{Request, Response};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The server side of the request channel is gone.
    #[error("request channel closed")]
    Closed,
    #[error("request was dropped without a response")]
    Dropped,
    /// The server stopped waiting before the response was ready.
    #[error("client stopped waiting for the response")]
    ClientGone,
    #[error("no response within {0:?}")]
    TimedOut(Duration),
    #[error("no request is waiting for a response")]
    NoPendingRequest,
}

pub trait Transport {
    /// Take the next waiting request, if any. Must not block.
    fn poll_request(&mut self) -> Result<Option<Request>, TransportError>;

    /// Answer the request most recently returned by `poll_request`.
    fn respond(&mut self, response: &Response) -> Result<(), TransportError>;
}

/// In-memory transport: requests are queued by hand, responses are recorded.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    incoming: VecDeque<Request>,
    in_flight: Option<Request>,
    answered: Vec<(Request, Response)>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, request: Request) {
        self.incoming.push_back(request);
    }

    pub fn is_idle(&self) -> bool {
        self.incoming.is_empty()
    }

    /// Every answered request with its response, oldest first.
    pub fn answered(&self) -> &[(Request, Response)] {
        &self.answered
    }

    pub fn last_response(&self) -> Option<&Response> {
        self.answered.last().map(|(_, r)| r)
    }
}

impl Transport for ScriptedTransport {
    fn poll_request(&mut self) -> Result<Option<Request>, TransportError> {
        let next = self.incoming.pop_front();
        self.in_flight = next.clone();
        Ok(next)
    }

    fn respond(&mut self, response: &Response) -> Result<(), TransportError> {
        let request = self
            .in_flight
            .take()
            .ok_or(TransportError::NoPendingRequest)?;
        self.answered.push((request, response.clone()));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;

    #[test]
    fn test_scripted_roundtrip() {
        let mut t = ScriptedTransport::new();
        assert!(t.poll_request().unwrap().is_none());
        assert!(matches!(
            t.respond(&Response::text(StatusCode::OK, "x")),
            Err(TransportError::NoPendingRequest)
        ));

        t.push(Request::get("/"));
        let req = t.poll_request().unwrap().unwrap();
        t.respond(&Response::text(StatusCode::OK, "hi")).unwrap();
        assert_eq!(t.answered()[0].0, req);
        assert_eq!(t.last_response().unwrap().body, "hi");
    }
}
