use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use stemix::cli::{Cli, Commands, MixArgs};
use stemix::config::Config;
use stemix::daemon::run_daemon;
use stemix::exec::SystemToolRunner;
use stemix::ipc::client::send_command;
use stemix::ipc::protocol::{Command, Response};
use stemix::ipc::server::IpcServer;
use stemix::job::orchestrator::Orchestrator;
use stemix::job::{JobStatus, MixParams};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let socket = cli.socket.clone();

    match cli.command {
        Commands::Daemon => {
            let config = Config::load_or_default(cli.config.as_deref())?;
            run_daemon(config, socket, cli.quiet).await?;
        }
        Commands::Submit { file } => {
            let file = absolute(&file)?;
            handle_ipc_command(
                socket,
                Command::Submit {
                    path: file.display().to_string(),
                },
            )
            .await?;
        }
        Commands::Start { job_id, device } => {
            handle_ipc_command(socket, Command::Start { job_id, device }).await?;
        }
        Commands::Status { job_id } => {
            handle_ipc_command(socket, Command::Status { job_id }).await?;
        }
        Commands::Watch { job_id } => {
            handle_watch(socket, job_id).await?;
        }
        Commands::Render { job_id, mix } => {
            handle_ipc_command(
                socket,
                Command::Render {
                    job_id,
                    params: mix_params(&mix),
                },
            )
            .await?;
        }
        Commands::Export { job_id } => {
            handle_ipc_command(socket, Command::Export { job_id }).await?;
        }
        Commands::Run { file, device, mix } => {
            let config = Config::load_or_default(cli.config.as_deref())?;
            run_one_shot(config, &file, device.as_deref(), &mix, cli.quiet)?;
        }
    }

    Ok(())
}

fn mix_params(mix: &MixArgs) -> MixParams {
    MixParams {
        voice: mix.voice,
        music: mix.music,
        background: mix.background,
        wind_reduction: mix.wind_reduction,
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(std::env::current_dir()?.join(path))
    }
}

/// Send one command to the daemon and print its response.
async fn handle_ipc_command(socket: Option<PathBuf>, command: Command) -> Result<()> {
    let socket_path = socket.unwrap_or_else(IpcServer::default_socket_path);

    match send_command(&socket_path, command).await {
        Ok(response) => {
            print_response(&response);
            if matches!(response, Response::Error { .. }) {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Failed to reach daemon: {}", e);
            eprintln!("Is the daemon running? Start it with: stemix daemon");
            std::process::exit(1);
        }
    }

    Ok(())
}

fn print_response(response: &Response) {
    match response {
        Response::Ok => println!("ok"),
        Response::Submitted { job_id } => println!("{}", job_id),
        Response::Status {
            status,
            progress,
            message,
            duration_s,
        } => {
            println!("Status:   {}", status);
            println!("Progress: {}%", progress);
            println!("Message:  {}", message);
            if let Some(duration) = duration_s {
                println!("Duration: {:.1}s", duration);
            }
        }
        Response::Artifact { path } => println!("{}", path),
        Response::Error { message } => eprintln!("Error: {}", message),
    }
}

/// Poll the daemon until the job leaves the processing phase.
async fn handle_watch(socket: Option<PathBuf>, job_id: String) -> Result<()> {
    let socket_path = socket.unwrap_or_else(IpcServer::default_socket_path);
    let interval = tokio::time::Duration::from_millis(stemix::defaults::WATCH_INTERVAL_MS);

    loop {
        let command = Command::Status {
            job_id: job_id.clone(),
        };
        match send_command(&socket_path, command).await {
            Ok(Response::Status {
                status,
                progress,
                message,
                ..
            }) => {
                println!("[{:>3}%] {} — {}", progress, status, message);
                if status.is_terminal() {
                    if status == JobStatus::Error {
                        std::process::exit(1);
                    }
                    break;
                }
            }
            Ok(Response::Error { message }) => {
                eprintln!("Error: {}", message);
                std::process::exit(1);
            }
            Ok(other) => {
                eprintln!("Unexpected response: {:?}", other);
                std::process::exit(1);
            }
            Err(e) => {
                eprintln!("Failed to reach daemon: {}", e);
                std::process::exit(1);
            }
        }
        tokio::time::sleep(interval).await;
    }

    Ok(())
}

/// Full pipeline without a daemon: submit, separate, mix, export.
fn run_one_shot(
    config: Config,
    file: &Path,
    device: Option<&str>,
    mix: &MixArgs,
    quiet: bool,
) -> Result<()> {
    std::fs::create_dir_all(&config.jobs.dir)?;
    let orchestrator = Orchestrator::new(config, Arc::new(SystemToolRunner));

    let job_id = orchestrator.submit(&absolute(file)?)?;
    if !quiet {
        eprintln!("Job {}", job_id);
    }

    let device = device
        .map(str::to_string)
        .unwrap_or_else(|| orchestrator.default_device().to_string());
    orchestrator.start(&job_id, &device)?;

    let mut failed_message = None;
    for snapshot in orchestrator.watch(&job_id)? {
        if !quiet {
            eprintln!("[{:>3}%] {}", snapshot.progress, snapshot.message);
        }
        if snapshot.status == JobStatus::Error {
            failed_message = Some(snapshot.message);
        }
    }
    if let Some(message) = failed_message {
        eprintln!("Processing failed: {}", message);
        std::process::exit(1);
    }

    orchestrator.render(&job_id, &mix_params(mix))?;
    let artifact = orchestrator.export(&job_id)?;
    println!("{}", artifact.display());

    Ok(())
}
