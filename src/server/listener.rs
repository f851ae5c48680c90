use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_rustls::TlsAcceptor;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::gateway::Application;
use crate::http::connection::Connection;
use crate::server::tls;

/// The listening socket plus the optional TLS context, bound once at
/// startup. TLS material is loaded here and nowhere else.
pub struct Server {
    listener: TcpListener,
    acceptor: Option<TlsAcceptor>,
    config: Arc<Config>,
    app: Arc<dyn Application>,
}

impl Server {
    /// Binds the listening socket and, when the configured port indicates a
    /// secure deployment, loads the TLS acceptor from the PEM files.
    pub async fn bind(config: Config, app: Arc<dyn Application>) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(&config.listen_addr).await?;

        let acceptor = if config.tls_enabled() {
            Some(tls::load_acceptor(&config.tls_cert, &config.tls_key)?)
        } else {
            None
        };

        info!("Listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            acceptor,
            config: Arc::new(config),
            app,
        })
    }

    /// Address actually bound, for callers that bind port 0.
    pub fn local_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accepts forever. Each accepted socket is driven by its own task, so
    /// per-connection handling stays strictly sequential while connections
    /// multiplex freely. A failure on one connection never touches another
    /// and never stops this loop.
    pub async fn serve(&self) -> anyhow::Result<()> {
        loop {
            let (socket, peer) = match self.listener.accept().await {
                Ok(pair) => pair,
                Err(e) => {
                    error!("Accept failed: {}", e);
                    continue;
                }
            };
            info!("Accepted connection from {}", peer);

            let acceptor = self.acceptor.clone();
            let config = self.config.clone();
            let app = self.app.clone();

            tokio::spawn(async move {
                match acceptor {
                    Some(acceptor) => {
                        // Handshake failure closes the raw socket; the
                        // server keeps serving.
                        match acceptor.accept(socket).await {
                            Ok(stream) => {
                                let mut conn = Connection::new(stream, config, app);
                                if let Err(e) = conn.run().await {
                                    warn!("Connection error from {}: {}", peer, e);
                                }
                            }
                            Err(e) => {
                                warn!("TLS handshake failed for {}: {}", peer, e);
                            }
                        }
                    }
                    None => {
                        let mut conn = Connection::new(socket, config, app);
                        if let Err(e) = conn.run().await {
                            warn!("Connection error from {}: {}", peer, e);
                        }
                    }
                }
            });
        }
    }
}
