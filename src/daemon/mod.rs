//! Daemon mode for stemix - owns the job orchestrator and the IPC server.

pub mod handler;

use crate::config::Config;
use crate::error::{Result, StemixError};
use crate::exec::SystemToolRunner;
use crate::ipc::server::IpcServer;
use crate::job::orchestrator::Orchestrator;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Notify;

/// Run the daemon: build the orchestrator, start the IPC server, wait for
/// shutdown.
///
/// Returns Ok(()) on graceful shutdown, error otherwise.
pub async fn run_daemon(config: Config, socket_path: Option<PathBuf>, quiet: bool) -> Result<()> {
    let jobs_dir = config.jobs.dir.clone();
    std::fs::create_dir_all(&jobs_dir)?;

    let orchestrator = Arc::new(Orchestrator::new(config, Arc::new(SystemToolRunner)));

    if !quiet {
        eprintln!("Job directory: {}", jobs_dir.display());
    }

    let socket_path = socket_path.unwrap_or_else(IpcServer::default_socket_path);
    let server = Arc::new(IpcServer::new(socket_path));

    if !quiet {
        eprintln!(
            "IPC server listening at: {}",
            server.socket_path().display()
        );
        eprintln!("Daemon ready.");
    }

    let shutdown = Arc::new(Notify::new());
    let handler = handler::DaemonCommandHandler::new(orchestrator, shutdown.clone(), quiet);

    let server_clone = Arc::clone(&server);
    let server_handle = tokio::spawn(async move { server_clone.start(handler).await });

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            if !quiet {
                eprintln!("\nReceived SIGINT, shutting down...");
            }
        }
        res = wait_for_sigterm() => {
            if let Err(e) = res {
                eprintln!("Error setting up signal handler: {}", e);
            }
            if !quiet {
                eprintln!("\nReceived SIGTERM, shutting down...");
            }
        }
        _ = shutdown.notified() => {
            if !quiet {
                eprintln!("Shutdown requested over IPC...");
            }
        }
    }

    server.stop()?;

    if let Err(e) = server_handle.await {
        eprintln!("stemix: daemon server task failed: {e}");
    }

    if !quiet {
        eprintln!("Daemon stopped.");
    }

    Ok(())
}

/// Wait for SIGTERM signal (used by systemd).
#[cfg(unix)]
async fn wait_for_sigterm() -> Result<()> {
    use tokio::signal::unix::{SignalKind, signal};
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| StemixError::Other(format!("Failed to register SIGTERM handler: {}", e)))?;
    sigterm.recv().await;
    Ok(())
}

#[cfg(not(unix))]
async fn wait_for_sigterm() -> Result<()> {
    // On non-Unix, just wait forever (Ctrl+C will still work)
    std::future::pending::<()>().await;
    Ok(())
}
