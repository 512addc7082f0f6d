use log::{info, warn};

use crate::adapters::http::wire::{ComputeQuery, WireFrame, encode_png};
use crate::core::actions::cancellation::NeverCancel;
use crate::core::actions::dispatch::dispatch::dispatch;
use crate::server::response_format::ResponseFormat;

/// Headers added to every response so browser front ends can call the worker.
pub const CORS_HEADERS: [(&str, &str); 3] = [
    ("Access-Control-Allow-Origin", "*"),
    ("Access-Control-Allow-Methods", "GET, POST, OPTIONS"),
    ("Access-Control-Allow-Headers", "Content-Type, Accept"),
];

const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, Copy)]
pub struct WorkerRequest<'a> {
    pub method: &'a str,
    /// Path and query string, as sent on the request line.
    pub url: &'a str,
    pub accept: Option<&'a str>,
    pub body: &'a [u8],
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpReply {
    pub status: u16,
    pub content_type: Option<&'static str>,
    pub body: Vec<u8>,
}

impl HttpReply {
    fn empty(status: u16) -> Self {
        Self {
            status,
            content_type: None,
            body: Vec::new(),
        }
    }

    fn text(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            content_type: Some(TEXT_CONTENT_TYPE),
            body: message.into().into_bytes(),
        }
    }
}

/// Routes one worker request.
///
/// - `OPTIONS` on any path: 200, for CORS pre-flight
/// - `GET /fractal`, `GET /compute`: parameters in the query string
/// - `POST /compute`: parameters as a JSON body
pub fn handle(request: &WorkerRequest<'_>, default_format: ResponseFormat) -> HttpReply {
    let (path, query) = request.url.split_once('?').unwrap_or((request.url, ""));

    let parsed = match (request.method, path) {
        ("OPTIONS", _) => return HttpReply::empty(200),
        ("GET", "/fractal" | "/compute") => {
            serde_urlencoded::from_str::<ComputeQuery>(query).map_err(|err| err.to_string())
        }
        ("POST", "/compute") => {
            serde_json::from_slice::<ComputeQuery>(request.body).map_err(|err| err.to_string())
        }
        (_, "/fractal" | "/compute") => return HttpReply::text(405, "method not allowed"),
        _ => return HttpReply::text(404, "not found"),
    };

    let query = match parsed {
        Ok(query) => query,
        Err(message) => return HttpReply::text(400, format!("bad request: {message}")),
    };

    let method = query.method.clone().unwrap_or_default();
    let render_request = match query.into_request() {
        Ok(render_request) => render_request,
        Err(error) => return HttpReply::text(400, format!("bad request: {error}")),
    };

    info!(
        "{} {path}: `{method}` {} {}x{} row {:?}",
        request.method,
        render_request.mode,
        render_request.width,
        render_request.height,
        render_request.row_index
    );

    let rows = match dispatch(&render_request) {
        Ok(stream) => match stream.collect_rows(&NeverCancel) {
            Ok(rows) => rows,
            Err(cancelled) => return HttpReply::text(500, cancelled.to_string()),
        },
        Err(error) => return HttpReply::text(400, format!("bad request: {error}")),
    };

    let format = ResponseFormat::negotiate(request.accept, default_format);
    let body = match format {
        ResponseFormat::Json => serde_json::to_vec(&WireFrame::from(rows)).map_err(|err| err.to_string()),
        ResponseFormat::Png => encode_png(&rows).map_err(|err| err.to_string()),
    };

    match body {
        Ok(body) => HttpReply {
            status: 200,
            content_type: Some(format.content_type()),
            body,
        },
        Err(message) => {
            warn!("cannot encode {format:?} response: {message}");
            HttpReply::text(500, "cannot encode response")
        }
    }
}
