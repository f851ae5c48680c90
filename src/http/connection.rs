use std::sync::Arc;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};

use crate::config::Config;
use crate::gateway::{self, Application};
use crate::http::parser::parse_request;
use crate::http::request::Request;
use crate::http::writer::ResponseWriter;
use crate::statics;

/// One inbound chunk is read per connection; a request head that does not
/// fit is treated as malformed.
const READ_CHUNK: usize = 1024;

/// Per-connection state machine, generic over the stream so the same handler
/// drives plain TCP and TLS connections.
pub struct Connection<S> {
    stream: S,
    state: ConnectionState,
    config: Arc<Config>,
    app: Arc<dyn Application>,
}

pub enum ConnectionState {
    Reading,
    Dispatching(Request),
    Writing(ResponseWriter),
    Closed,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Connection<S> {
    pub fn new(stream: S, config: Arc<Config>, app: Arc<dyn Application>) -> Self {
        Self {
            stream,
            state: ConnectionState::Reading,
            config,
            app,
        }
    }

    /// Drives the connection to completion: read -> parse -> dispatch ->
    /// respond -> close, strictly sequential. Exactly one terminal response
    /// is written on the success path; parse failures and empty reads close
    /// with no response. The socket is torn down when the connection drops.
    pub async fn run(&mut self) -> anyhow::Result<()> {
        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    match self.read_request().await? {
                        Some(req) => {
                            self.state = ConnectionState::Dispatching(req);
                        }
                        None => {
                            // Peer closed before sending anything.
                            self.state = ConnectionState::Closed;
                        }
                    }
                }

                ConnectionState::Dispatching(req) => {
                    let writer = dispatch(req, &self.config, self.app.as_ref()).await?;
                    self.state = ConnectionState::Writing(writer);
                }

                ConnectionState::Writing(writer) => {
                    writer.write_to_stream(&mut self.stream).await?;

                    // No keep-alive: one response, then teardown.
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    break;
                }
            }
        }

        Ok(())
    }

    /// Reads at most one chunk and parses it. `None` means the peer closed.
    async fn read_request(&mut self) -> anyhow::Result<Option<Request>> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = self.stream.read(&mut chunk).await?;

        if n == 0 {
            return Ok(None);
        }

        match parse_request(&chunk[..n]) {
            Ok(request) => Ok(Some(request)),
            Err(e) => Err(anyhow::anyhow!("HTTP parse error: {:?}", e)),
        }
    }
}

/// Routes a parsed request. The static prefix test is a literal,
/// case-sensitive prefix match, not a general router.
async fn dispatch(
    req: &Request,
    config: &Config,
    app: &dyn Application,
) -> anyhow::Result<ResponseWriter> {
    if req.path.starts_with(statics::STATIC_PREFIX) {
        let response = statics::respond(req, &config.static_root).await;
        Ok(ResponseWriter::new(&response))
    } else {
        let raw = gateway::dispatch(req, app, &config.server_name(), config.port())?;
        Ok(ResponseWriter::from_raw(raw))
    }
}
