//! Command handler implementation for the daemon.

use crate::ipc::protocol::{Command, Response};
use crate::ipc::server::CommandHandler;
use crate::job::MixParams;
use crate::job::orchestrator::Orchestrator;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Notify;

/// Command handler for daemon IPC commands.
pub struct DaemonCommandHandler {
    orchestrator: Arc<Orchestrator>,
    shutdown: Arc<Notify>,
    quiet: bool,
}

impl DaemonCommandHandler {
    pub fn new(orchestrator: Arc<Orchestrator>, shutdown: Arc<Notify>, quiet: bool) -> Self {
        Self {
            orchestrator,
            shutdown,
            quiet,
        }
    }

    fn submit(&self, path: &str) -> Response {
        match self.orchestrator.submit(Path::new(path)) {
            Ok(job_id) => {
                if !self.quiet {
                    eprintln!("Job {} submitted for {}", job_id, path);
                }
                Response::Submitted { job_id }
            }
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }

    fn start(&self, job_id: &str, device: Option<&str>) -> Response {
        let device = device.unwrap_or(self.orchestrator.default_device());
        match self.orchestrator.start(job_id, device) {
            Ok(()) => Response::Ok,
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }

    fn status(&self, job_id: &str) -> Response {
        match self.orchestrator.status(job_id) {
            Ok(snapshot) => Response::Status {
                status: snapshot.status,
                progress: snapshot.progress,
                message: snapshot.message,
                duration_s: snapshot.duration_s,
            },
            Err(e) => Response::Error {
                message: e.to_string(),
            },
        }
    }

    /// Mixing runs subprocesses and file I/O, so it moves off the async
    /// runtime onto the blocking pool.
    async fn render(&self, job_id: String, params: MixParams) -> Response {
        let orchestrator = Arc::clone(&self.orchestrator);
        let result =
            tokio::task::spawn_blocking(move || orchestrator.render(&job_id, &params)).await;

        match result {
            Ok(Ok(path)) => Response::Artifact {
                path: path.display().to_string(),
            },
            Ok(Err(e)) => Response::Error {
                message: e.to_string(),
            },
            Err(e) => Response::Error {
                message: format!("render task failed: {}", e),
            },
        }
    }

    async fn export(&self, job_id: String) -> Response {
        let orchestrator = Arc::clone(&self.orchestrator);
        let result = tokio::task::spawn_blocking(move || orchestrator.export(&job_id)).await;

        match result {
            Ok(Ok(path)) => Response::Artifact {
                path: path.display().to_string(),
            },
            Ok(Err(e)) => Response::Error {
                message: e.to_string(),
            },
            Err(e) => Response::Error {
                message: format!("export task failed: {}", e),
            },
        }
    }
}

#[async_trait::async_trait]
impl CommandHandler for DaemonCommandHandler {
    async fn handle(&self, command: Command) -> Response {
        match command {
            Command::Submit { path } => self.submit(&path),
            Command::Start { job_id, device } => self.start(&job_id, device.as_deref()),
            Command::Status { job_id } => self.status(&job_id),
            Command::Render { job_id, params } => self.render(job_id, params).await,
            Command::Export { job_id } => self.export(job_id).await,
            Command::Shutdown => {
                self.shutdown.notify_one();
                Response::Ok
            }
        }
    }
}
