//! `EspHttpServer` front end. The server task does the socket and HTTP work
//! and forwards each request to the serving loop.

use esp_idf_svc::{
    http::{
        server::{Configuration, EspHttpConnection, EspHttpServer, Request},
        Headers, Method,
    },
    io::{Read, Write},
};

use climate_web::http::{self as web, RequestSender, MAX_BODY};

/// Methods forwarded to the loop. Anything else is refused by the server.
const METHODS: [(Method, web::Method); 6] = [
    (Method::Get, web::Method::GET),
    (Method::Post, web::Method::POST),
    (Method::Put, web::Method::PUT),
    (Method::Delete, web::Method::DELETE),
    (Method::Patch, web::Method::PATCH),
    (Method::Head, web::Method::HEAD),
];

pub fn start(port: u16, sender: RequestSender) -> anyhow::Result<EspHttpServer<'static>> {
    let config = Configuration {
        http_port: port,
        stack_size: 8192,
        uri_match_wildcard: true,
        ..Default::default()
    };

    let mut server = EspHttpServer::new(&config)?;

    for (esp_method, method) in METHODS {
        let sender = sender.clone();
        server.fn_handler::<anyhow::Error, _>("/*", esp_method, move |req| {
            forward(req, method.clone(), &sender)
        })?;
    }

    Ok(server)
}

fn forward(
    mut req: Request<&mut EspHttpConnection<'_>>,
    method: web::Method,
    sender: &RequestSender,
) -> anyhow::Result<()> {
    let target = req.uri().to_owned();
    let content_type = req.header("Content-Type").map(str::to_owned);

    let len = req.content_len().unwrap_or(0) as usize;
    if len > MAX_BODY {
        log::warn!("Refusing {} byte body for {}", len, target);
        req.into_status_response(413)?;
        return Ok(());
    }

    let mut body = vec![0u8; len];
    let mut filled = 0;
    while filled < len {
        let n = req.read(&mut body[filled..])?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    body.truncate(filled);

    let request = web::Request::from_wire(method, &target, content_type.as_deref(), &body);
    match sender.blocking_exchange(request) {
        Ok(response) => {
            let mut resp = req.into_response(
                response.status.as_u16(),
                response.status.canonical_reason(),
                &[("Content-Type", response.content_type)],
            )?;
            resp.write_all(response.body.as_bytes())?;
        }
        Err(e) => {
            log::warn!("No response for {}: {}", target, e);
            let mut resp = req.into_status_response(503)?;
            resp.write_all(e.to_string().as_bytes())?;
        }
    }
    Ok(())
}
