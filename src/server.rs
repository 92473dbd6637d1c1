use std::fmt::Display;
use std::net::SocketAddr;

use thiserror::Error;

use crate::service::UserService;

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("failed to bind {addr}: {message}")]
    Bind { addr: SocketAddr, message: String },
}

/// Status and plain-text body produced by a handler, independent of the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub body: String,
}

impl Reply {
    fn new(status: u16, body: impl Into<String>) -> Self {
        Reply {
            status,
            body: body.into(),
        }
    }

    /// Error replies end with a newline, like the plain-text errors of Go's net/http.
    fn error(status: u16, message: impl Display) -> Self {
        Reply::new(status, format!("{message}\n"))
    }

    fn into_response(self) -> tiny_http::Response<std::io::Cursor<Vec<u8>>> {
        let mut response = tiny_http::Response::from_string(self.body).with_status_code(self.status);
        if let Ok(header) =
            tiny_http::Header::from_bytes(&b"Content-Type"[..], &b"text/plain; charset=utf-8"[..])
        {
            response = response.with_header(header);
        }
        response
    }
}

/// `"<prefix>-<id>"`, no escaping.
pub fn format_id(prefix: &str, id: impl Display) -> String {
    format!("{prefix}-{id}")
}

/// Health check: always 200 "ok", whatever the method.
pub fn handle_health() -> Reply {
    Reply::new(200, "ok")
}

/// `/user?id=<id>`: greet the user, falling back to the synthesized name.
/// A missing `id` is treated as the empty id.
pub fn handle_user(service: &UserService, query: &str) -> Reply {
    let id = url::form_urlencoded::parse(query.as_bytes())
        .find(|(k, _)| k == "id")
        .map(|(_, v)| v.into_owned())
        .unwrap_or_default();

    match service.get_user(&id) {
        Ok(name) => Reply::new(200, format!("Hello, {name}")),
        Err(e) => {
            tracing::error!(id, error = %e, "user lookup failed");
            Reply::error(500, e)
        }
    }
}

/// Dispatch on the request path. The method is not checked.
pub fn route(service: &UserService, url: &str) -> Reply {
    let (path, query) = url.split_once('?').unwrap_or((url, ""));
    match path {
        "/health" => handle_health(),
        "/user" => handle_user(service, query),
        _ => Reply::error(404, "404 page not found"),
    }
}

/// Binds an HTTP server to `addr`. Pass the result to `run_server` to start serving.
pub fn init_server(addr: SocketAddr) -> Result<tiny_http::Server, ServerError> {
    let server = tiny_http::Server::http(addr).map_err(|e| ServerError::Bind {
        addr,
        message: e.to_string(),
    })?;
    tracing::info!("listening on http://{}", server.server_addr());
    Ok(server)
}

/// Run the server loop, one thread per request. Blocks for as long as the server is open.
pub fn run_server(server: tiny_http::Server, service: UserService) {
    for request in server.incoming_requests() {
        let service = service.clone();
        std::thread::spawn(move || {
            let method = request.method().as_str().to_string();
            let url = request.url().to_string();
            let reply = route(&service, &url);
            tracing::debug!(%method, %url, status = reply.status, "request served");
            if let Err(e) = request.respond(reply.into_response()) {
                tracing::debug!(%url, error = %e, "failed to write response");
            }
        });
    }
}
