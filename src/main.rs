use std::sync::Arc;

use ember::config::Config;
use ember::gateway::HelloApp;
use ember::server::listener::Server;
use ember::server::reaper;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .init();

    let cfg = Config::load();

    // The reaper must be in place before the first connection can fork anything.
    reaper::install()?;

    let server = Server::bind(cfg, Arc::new(HelloApp)).await?;

    tokio::select! {
        res = server.serve() => {
            res?;
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
