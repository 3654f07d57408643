//! Services at most one pending request per call.

use crate::http::{RouteTable, StatusCode, Transport};
use crate::indicator::StatusIndicator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Nothing was waiting.
    Idle,
    Served { path: String, status: StatusCode },
    /// Receiving or answering the request failed. Already logged.
    TransportFault,
}

pub struct Dispatcher<I> {
    routes: RouteTable,
    indicator: I,
}

impl<I: StatusIndicator> Dispatcher<I> {
    pub fn new(routes: RouteTable, mut indicator: I) -> Self {
        indicator.set(false);
        Self { routes, indicator }
    }

    /// Poll the transport once and answer whatever was waiting.
    ///
    /// Returns immediately when no request is pending. Transport errors are
    /// logged and swallowed so they never reach the serving loop.
    pub fn dispatch<T: Transport>(&mut self, transport: &mut T) -> Outcome {
        let request = match transport.poll_request() {
            Ok(Some(request)) => request,
            Ok(None) => return Outcome::Idle,
            Err(e) => {
                log::warn!("Failed to receive request: {}", e);
                return Outcome::TransportFault;
            }
        };

        self.indicator.set(true);
        let response = self.routes.resolve(&request.uri).handle(&request);
        self.indicator.set(false);

        log::debug!(
            "{} {} -> {}",
            request.method,
            request.uri,
            response.status.as_u16()
        );

        match transport.respond(&response) {
            Ok(()) => Outcome::Served {
                path: request.uri,
                status: response.status,
            },
            Err(e) => {
                log::warn!("Failed to send response for {}: {}", request.uri, e);
                Outcome::TransportFault
            }
        }
    }
}
