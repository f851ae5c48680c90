//! Application gateway: translates a parsed request into a generic callback
//! invocation with a two-phase response protocol, and its structured result
//! back into wire bytes.

use std::time::SystemTime;

use anyhow::bail;
use bytes::Bytes;

use crate::http::request::Request;

/// Identity header appended to every gateway response.
pub const SERVER_IDENT: &str = "ember/0.1";

/// Version marker of the gateway protocol itself.
pub const GATEWAY_VERSION: (u8, u8) = (1, 0);

/// Error sink exposed to the application; every line written to it reaches
/// the server log.
pub struct ErrorSink;

impl ErrorSink {
    pub fn write_line(&self, line: &str) {
        tracing::error!("{}", line);
    }
}

/// Read-only environment handed to the application for one request. Not
/// retained after the call returns.
pub struct AppEnvironment {
    /// Gateway protocol version marker.
    pub gateway_version: (u8, u8),
    /// URL scheme marker.
    pub url_scheme: &'static str,
    /// The decoded request bytes, readable by the application.
    pub input: Bytes,
    /// Where the application writes its own diagnostics.
    pub errors: ErrorSink,
    /// Request method token, forwarded verbatim.
    pub method: String,
    /// Request path.
    pub path: String,
    /// Server host name.
    pub server_name: String,
    /// Server port.
    pub server_port: u16,
    /// Always false: one thread per connection lifetime.
    pub multithread: bool,
    /// Always false: single process.
    pub multiprocess: bool,
    /// Always false: the server outlives the request.
    pub run_once: bool,
}

/// Two-phase response-start handle. `begin` commits the status line and
/// headers before any body is produced; it is callable at most once and
/// performs no I/O.
pub struct StartResponse {
    committed: Option<(String, Vec<(String, String)>)>,
}

impl StartResponse {
    pub fn new() -> Self {
        Self { committed: None }
    }

    /// Records the status line (e.g. "200 OK") and headers, appending the
    /// fixed server identity headers.
    pub fn begin(
        &mut self,
        status: impl Into<String>,
        mut headers: Vec<(String, String)>,
    ) -> anyhow::Result<()> {
        if self.committed.is_some() {
            bail!("start_response called twice");
        }

        headers.push((
            "Date".to_string(),
            httpdate::fmt_http_date(SystemTime::now()),
        ));
        headers.push(("Server".to_string(), SERVER_IDENT.to_string()));

        self.committed = Some((status.into(), headers));
        Ok(())
    }
}

impl Default for StartResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// The external application contract: called once per request with the
/// environment and a response-start handle, returning the body chunks. The
/// application must call `begin` exactly once before returning.
pub trait Application: Send + Sync {
    fn handle(
        &self,
        env: &AppEnvironment,
        start: &mut StartResponse,
    ) -> anyhow::Result<Vec<Bytes>>;
}

/// Invokes the application and assembles one full response: status line,
/// headers, blank line, concatenated body chunks. Failures are fatal to the
/// connection only; nothing is retried.
pub fn dispatch(
    req: &Request,
    app: &dyn Application,
    server_name: &str,
    server_port: u16,
) -> anyhow::Result<Vec<u8>> {
    let env = AppEnvironment {
        gateway_version: GATEWAY_VERSION,
        url_scheme: "http",
        input: Bytes::from(req.raw.clone()),
        errors: ErrorSink,
        method: req.method.clone(),
        path: req.path.clone(),
        server_name: server_name.to_string(),
        server_port,
        multithread: false,
        multiprocess: false,
        run_once: false,
    };

    let mut start = StartResponse::new();
    let chunks = app.handle(&env, &mut start)?;

    let (status, headers) = start
        .committed
        .ok_or_else(|| anyhow::anyhow!("application returned without calling start_response"))?;

    let mut head = format!("HTTP/1.1 {status}\r\n");
    for (k, v) in &headers {
        head.push_str(k);
        head.push_str(": ");
        head.push_str(v);
        head.push_str("\r\n");
    }
    head.push_str("\r\n");

    let mut bytes = head.into_bytes();
    for chunk in chunks {
        bytes.extend_from_slice(&chunk);
    }

    Ok(bytes)
}

/// Minimal application shipped with the binary; also the stub used by tests.
pub struct HelloApp;

impl Application for HelloApp {
    fn handle(
        &self,
        env: &AppEnvironment,
        start: &mut StartResponse,
    ) -> anyhow::Result<Vec<Bytes>> {
        start.begin(
            "200 OK",
            vec![("Content-Type".to_string(), "text/plain".to_string())],
        )?;

        Ok(vec![Bytes::from(format!(
            "Hello from {} {}\n",
            env.method, env.path
        ))])
    }
}
