//! Desktop front end: axum owns the sockets and the HTTP parsing and forwards
//! every request it finishes reading to the serving loop.

use std::io;
use std::net::{SocketAddr, TcpListener, ToSocketAddrs};

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, Uri},
    response::IntoResponse,
    routing::any,
    Router,
};

use super::{Method, Request, RequestSender, StatusCode, MAX_BODY};

/// Bind `addr` and serve on a background thread with its own runtime.
///
/// Returns the bound address, which matters when binding port 0.
pub fn spawn<A: ToSocketAddrs>(addr: A, sender: RequestSender) -> io::Result<SocketAddr> {
    let listener = TcpListener::bind(addr)?;
    listener.set_nonblocking(true)?;
    let local_addr = listener.local_addr()?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;

    std::thread::Builder::new()
        .name("http".to_string())
        .spawn(move || {
            runtime.block_on(async move {
                if let Err(e) = serve(listener, sender).await {
                    log::error!("HTTP server stopped: {}", e);
                }
            })
        })?;

    Ok(local_addr)
}

async fn serve(listener: TcpListener, sender: RequestSender) -> io::Result<()> {
    let listener = tokio::net::TcpListener::from_std(listener)?;
    let app = Router::new()
        .route("/", any(forward))
        .route("/{*path}", any(forward))
        .layer(DefaultBodyLimit::max(MAX_BODY))
        .with_state(sender);

    axum::serve(listener, app).await
}

async fn forward(
    State(sender): State<RequestSender>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> axum::response::Response {
    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok());
    let request = Request::from_wire(method, target, content_type, &body);

    match sender.exchange(request).await {
        Ok(response) => (
            response.status,
            [(header::CONTENT_TYPE, response.content_type)],
            response.body,
        )
            .into_response(),
        Err(e) => {
            log::warn!("No response for {}: {}", uri, e);
            (StatusCode::SERVICE_UNAVAILABLE, e.to_string()).into_response()
        }
    }
}
