//! Child-process reaping, for deployments where connection handling forks.
//!
//! A SIGCHLD subscription drives a non-blocking drain of every terminated
//! child; the drain never blocks its caller and never panics past this
//! module.

/// Subscribes to SIGCHLD and drains terminated children on every delivery.
/// Must be called from within the runtime, before the accept loop starts.
#[cfg(unix)]
pub fn install() -> anyhow::Result<()> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigchld = signal(SignalKind::child())?;

    tokio::spawn(async move {
        while sigchld.recv().await.is_some() {
            drain_terminated_children();
        }
    });

    Ok(())
}

#[cfg(not(unix))]
pub fn install() -> anyhow::Result<()> {
    Ok(())
}

/// Repeatedly waits with WNOHANG until no terminated child remains (0) or
/// there are no children at all (-1).
#[cfg(unix)]
pub fn drain_terminated_children() {
    use tracing::info;

    loop {
        let mut status: libc::c_int = 0;
        let pid = unsafe { libc::waitpid(-1, &mut status, libc::WNOHANG) };

        if pid <= 0 {
            return;
        }

        info!("Child {} terminated with status {}", pid, status);
    }
}
