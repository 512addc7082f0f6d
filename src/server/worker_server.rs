use std::io::Read;
use std::net::SocketAddr;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use log::{debug, info, warn};
use thiserror::Error;
use tiny_http::{Header, Request, Response, Server, StatusCode};

use crate::server::handler::{CORS_HEADERS, HttpReply, WorkerRequest, handle};
use crate::server::response_format::ResponseFormat;

/// Largest request body accepted by `POST /compute`.
const MAX_REQUEST_BYTES: u64 = 64 * 1024;

#[derive(Debug, Error)]
#[error("cannot bind compute worker to {addr}: {source}")]
pub struct BindError {
    addr: String,
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

/// A running compute worker: one listener shared by `threads` handler
/// threads, each serving one request at a time.
pub struct WorkerServer {
    server: Arc<Server>,
    handlers: Vec<JoinHandle<()>>,
}

impl WorkerServer {
    pub fn bind(
        addr: &str,
        threads: usize,
        default_format: ResponseFormat,
    ) -> Result<Self, BindError> {
        let server = Server::http(addr).map_err(|source| BindError {
            addr: addr.to_owned(),
            source,
        })?;
        let server = Arc::new(server);

        let handlers = (0..threads.max(1))
            .map(|_| {
                let server = Arc::clone(&server);
                thread::spawn(move || {
                    for request in server.incoming_requests() {
                        Self::respond(request, default_format);
                    }
                    debug!("worker handler thread stopped");
                })
            })
            .collect();

        let worker = Self { server, handlers };
        if let Some(local_addr) = worker.local_addr() {
            info!("compute worker listening on {local_addr}");
        }

        Ok(worker)
    }

    #[must_use]
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.server.server_addr().to_ip()
    }

    /// Blocks until every handler thread has stopped.
    pub fn join(mut self) {
        for handle in self.handlers.drain(..) {
            let _ = handle.join();
        }
    }

    pub fn shutdown(&mut self) {
        for _ in &self.handlers {
            self.server.unblock();
        }

        for handle in self.handlers.drain(..) {
            let _ = handle.join();
        }
    }

    fn respond(mut request: Request, default_format: ResponseFormat) {
        let mut body = Vec::new();
        if let Err(err) = request
            .as_reader()
            .take(MAX_REQUEST_BYTES)
            .read_to_end(&mut body)
        {
            warn!("cannot read request body: {err}");
            return;
        }

        let method = request.method().to_string();
        let accept = request
            .headers()
            .iter()
            .find(|header| header.field.equiv("Accept"))
            .map(|header| header.value.as_str().to_owned());

        let reply = handle(
            &WorkerRequest {
                method: &method,
                url: request.url(),
                accept: accept.as_deref(),
                body: &body,
            },
            default_format,
        );
        debug!("{method} {} -> {}", request.url(), reply.status);

        if let Err(err) = request.respond(Self::to_response(reply)) {
            warn!("cannot send response: {err}");
        }
    }

    fn to_response(reply: HttpReply) -> Response<std::io::Cursor<Vec<u8>>> {
        let content_type = reply.content_type.map(|value| ("Content-Type", value));

        CORS_HEADERS
            .into_iter()
            .chain(content_type)
            .filter_map(|(field, value)| Header::from_bytes(field.as_bytes(), value.as_bytes()).ok())
            .fold(
                Response::from_data(reply.body).with_status_code(StatusCode(reply.status)),
                Response::with_header,
            )
    }
}

impl Drop for WorkerServer {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpStream;

    fn raw_request(addr: SocketAddr, request: &str) -> (String, Vec<String>) {
        let mut stream = TcpStream::connect(addr).unwrap();
        stream.write_all(request.as_bytes()).unwrap();

        let mut reader = BufReader::new(stream);
        let mut status_line = String::new();
        reader.read_line(&mut status_line).unwrap();

        let mut headers = Vec::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).unwrap();
            let line = line.trim_end().to_owned();
            if line.is_empty() {
                break;
            }
            headers.push(line.to_ascii_lowercase());
        }

        (status_line, headers)
    }

    #[test]
    fn test_preflight_carries_cors_headers() {
        let mut server = WorkerServer::bind("127.0.0.1:0", 1, ResponseFormat::Json).unwrap();
        let addr = server.local_addr().unwrap();

        let (status, headers) = raw_request(
            addr,
            "OPTIONS /compute HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        );

        assert!(status.starts_with("HTTP/1.1 200"), "{status}");
        assert!(headers.iter().any(|h| h == "access-control-allow-origin: *"));

        server.shutdown();
    }

    #[test]
    fn test_unknown_path_is_not_found() {
        let mut server = WorkerServer::bind("127.0.0.1:0", 1, ResponseFormat::Json).unwrap();
        let addr = server.local_addr().unwrap();

        let (status, headers) = raw_request(
            addr,
            "GET /missing HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        );

        assert!(status.starts_with("HTTP/1.1 404"), "{status}");
        assert!(headers.iter().any(|h| h.starts_with("access-control-allow-methods:")));

        server.shutdown();
    }

    #[test]
    fn test_bind_failure_is_reported() {
        let result = WorkerServer::bind("not an address", 1, ResponseFormat::Json);

        assert!(result.is_err());
    }

    #[test]
    fn test_shutdown_stops_all_handlers() {
        let mut server = WorkerServer::bind("127.0.0.1:0", 4, ResponseFormat::Png).unwrap();

        server.shutdown();

        assert!(server.handlers.is_empty());
    }
}
