//! HTTP route handlers

#[cfg(feature = "sensor")]
use serde::Serialize;

use super::{Request, Response, RouteError, RouteTable, StatusCode};
use crate::sampler::ReadingHandle;

pub const GREETING: &str = "hello from esp32!";
pub const INLINE_BODY: &str = "this works as well";

/// Register every route and build the table.
#[cfg_attr(not(feature = "sensor"), allow(unused_variables))]
pub fn register_routes(reading: ReadingHandle) -> Result<RouteTable, RouteError> {
    let mut routes = RouteTable::builder();

    routes.register("/", handle_root)?;

    routes.register("/inline", |_: &Request| {
        Response::text(StatusCode::OK, INLINE_BODY)
    })?;

    #[cfg(feature = "sensor")]
    routes.register("/data", move |_: &Request| handle_data(&reading))?;

    routes.register_fallback(handle_not_found)?;

    routes.build()
}

fn handle_root(_req: &Request) -> Response {
    Response::text(StatusCode::OK, GREETING)
}

#[cfg(feature = "sensor")]
#[derive(Debug, Serialize)]
struct DataBody {
    #[serde(rename = "Temperature")]
    temperature: f32,
    #[serde(rename = "Humidity")]
    humidity: f32,
}

/// Latest published reading. Never samples on the spot.
#[cfg(feature = "sensor")]
fn handle_data(reading: &ReadingHandle) -> Response {
    let reading = reading.get();
    let body = DataBody {
        temperature: reading.temperature,
        humidity: reading.humidity,
    };

    match serde_json::to_string(&body) {
        Ok(json) => Response::json(StatusCode::OK, json),
        Err(e) => {
            log::error!("Failed to encode reading {:?}: {}", reading, e);
            Response::text(StatusCode::INTERNAL_SERVER_ERROR, "reading unavailable")
        }
    }
}

/// Echo back what was asked for, to make misrouted requests easy to spot.
fn handle_not_found(req: &Request) -> Response {
    let mut message = format!(
        "File Not Found\n\nURI: {}\nMethod: {}\nArguments: {}\n",
        req.uri,
        req.method,
        req.args.len()
    );
    for (name, value) in &req.args {
        message.push_str(&format!(" {}: {}\n", name, value));
    }

    Response::text(StatusCode::NOT_FOUND, message)
}
