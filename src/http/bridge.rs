//! Hands finished requests from an HTTP server thread to the serving loop.
//!
//! The server side parks in [`RequestSender::exchange`] until the loop has
//! answered. The loop side only ever polls, so a slow or stalled client
//! costs it nothing. The channel holds a single request.

use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};

use super::{Request, Response, Transport, TransportError};

/// How often a blocking exchange checks for the loop's answer.
const REPLY_POLL: Duration = Duration::from_millis(1);

struct Exchange {
    request: Request,
    reply: oneshot::Sender<Response>,
}

/// Create both ends. The server gives up on a request after `reply_timeout`.
pub fn channel(reply_timeout: Duration) -> (RequestSender, ChannelTransport) {
    let (tx, rx) = mpsc::channel(1);
    (
        RequestSender { tx, reply_timeout },
        ChannelTransport { rx, pending: None },
    )
}

/// Server end. Cheap to clone, one per handler.
#[derive(Clone)]
pub struct RequestSender {
    tx: mpsc::Sender<Exchange>,
    reply_timeout: Duration,
}

impl RequestSender {
    /// Queue `request` and wait for the loop's response.
    pub async fn exchange(&self, request: Request) -> Result<Response, TransportError> {
        let (reply, response) = oneshot::channel();
        let exchange = async {
            self.tx
                .send(Exchange { request, reply })
                .await
                .map_err(|_| TransportError::Closed)?;
            response.await.map_err(|_| TransportError::Dropped)
        };
        tokio::time::timeout(self.reply_timeout, exchange)
            .await
            .map_err(|_| TransportError::TimedOut(self.reply_timeout))?
    }

    /// Same as [`exchange`](Self::exchange), for server threads without an
    /// async runtime. Must not be called from inside one.
    pub fn blocking_exchange(&self, request: Request) -> Result<Response, TransportError> {
        let deadline = Instant::now() + self.reply_timeout;
        let (reply, mut response) = oneshot::channel();
        self.tx
            .blocking_send(Exchange { request, reply })
            .map_err(|_| TransportError::Closed)?;

        loop {
            match response.try_recv() {
                Ok(response) => return Ok(response),
                Err(oneshot::error::TryRecvError::Closed) => return Err(TransportError::Dropped),
                Err(oneshot::error::TryRecvError::Empty) if Instant::now() < deadline => {
                    std::thread::sleep(REPLY_POLL)
                }
                Err(oneshot::error::TryRecvError::Empty) => {
                    return Err(TransportError::TimedOut(self.reply_timeout))
                }
            }
        }
    }
}

/// Loop end. Polling never blocks.
pub struct ChannelTransport {
    rx: mpsc::Receiver<Exchange>,
    pending: Option<oneshot::Sender<Response>>,
}

impl Transport for ChannelTransport {
    fn poll_request(&mut self) -> Result<Option<Request>, TransportError> {
        if self.pending.take().is_some() {
            log::warn!("dropping unanswered request");
        }

        match self.rx.try_recv() {
            Ok(Exchange { request, reply }) => {
                self.pending = Some(reply);
                Ok(Some(request))
            }
            Err(mpsc::error::TryRecvError::Empty) => Ok(None),
            Err(mpsc::error::TryRecvError::Disconnected) => Err(TransportError::Closed),
        }
    }

    fn respond(&mut self, response: &Response) -> Result<(), TransportError> {
        let reply = self
            .pending
            .take()
            .ok_or(TransportError::NoPendingRequest)?;
        reply
            .send(response.clone())
            .map_err(|_| TransportError::ClientGone)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::StatusCode;
    use std::thread;

    fn next_request(t: &mut ChannelTransport) -> Request {
        for _ in 0..1000 {
            if let Some(request) = t.poll_request().unwrap() {
                return request;
            }
            thread::sleep(Duration::from_millis(1));
        }
        panic!("request never arrived");
    }

    #[test]
    fn test_idle_poll() {
        let (_tx, mut t) = channel(Duration::from_secs(1));
        assert_eq!(t.poll_request(), Ok(None));
        assert_eq!(
            t.respond(&Response::text(StatusCode::OK, "")),
            Err(TransportError::NoPendingRequest)
        );
    }

    #[test]
    fn test_blocking_roundtrip() {
        let (tx, mut t) = channel(Duration::from_secs(5));
        let server = thread::spawn(move || tx.blocking_exchange(Request::get("/inline")));

        assert_eq!(next_request(&mut t).uri, "/inline");
        t.respond(&Response::text(StatusCode::OK, "this works as well"))
            .unwrap();
        let response = server.join().unwrap().unwrap();
        assert_eq!(response.body, "this works as well");
    }

    #[test]
    fn test_async_roundtrip() {
        let (tx, mut t) = channel(Duration::from_secs(5));
        let server = thread::spawn(move || {
            tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap()
                .block_on(tx.exchange(Request::get("/")))
        });

        next_request(&mut t);
        t.respond(&Response::text(StatusCode::OK, "hello from esp32!"))
            .unwrap();
        assert_eq!(server.join().unwrap().unwrap().status, StatusCode::OK);
    }

    #[test]
    fn test_closed_when_loop_side_gone() {
        let (tx, t) = channel(Duration::from_secs(1));
        drop(t);
        assert_eq!(
            tx.blocking_exchange(Request::get("/")),
            Err(TransportError::Closed)
        );
    }

    #[test]
    fn test_closed_when_server_side_gone() {
        let (tx, mut t) = channel(Duration::from_secs(1));
        drop(tx);
        assert_eq!(t.poll_request(), Err(TransportError::Closed));
    }

    #[test]
    fn test_unanswered_request_times_out() {
        let timeout = Duration::from_millis(20);
        let (tx, mut t) = channel(timeout);
        assert_eq!(
            tx.blocking_exchange(Request::get("/slow")),
            Err(TransportError::TimedOut(timeout))
        );

        // the loop picks it up late and finds nobody waiting
        assert_eq!(next_request(&mut t).uri, "/slow");
        assert_eq!(
            t.respond(&Response::text(StatusCode::OK, "")),
            Err(TransportError::ClientGone)
        );
    }

    #[test]
    fn test_request_dropped_by_loop() {
        let (tx, mut t) = channel(Duration::from_secs(5));
        let server = thread::spawn(move || tx.blocking_exchange(Request::get("/")));
        next_request(&mut t);
        drop(t);
        assert_eq!(server.join().unwrap(), Err(TransportError::Dropped));
    }
}
