mod cache;
mod clients;
mod config;
mod error;
mod queue;
mod state;
mod storage;

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tokio::signal;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

use clientdesk_core::client::{Client, ClientError, CreateClientRequest, UpdateClientRequest};
use clientdesk_core::storage::PaginatedResult;

use crate::{
    clients::ClientController,
    config::Config,
    error::{exit_code, ErrorBody},
    state::AppState,
};

/// clientdesk - Manage client records with unique email and phone
#[derive(Parser, Debug)]
#[command(name = "clientdesk")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the SQLite database file
    #[arg(long, global = true, env = "SQLITE_PATH")]
    sqlite_path: Option<String>,

    /// Redis connection URL
    #[arg(long, global = true, env = "REDIS_URL")]
    redis_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a client and queue its welcome email
    Create {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
    },
    /// Show a client
    Get { id: Uuid },
    /// Replace a client's name, email and phone
    Update {
        id: Uuid,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        phone: String,
    },
    /// Delete a client
    Delete { id: Uuid },
    /// List clients one page at a time
    List {
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Page size, at most 100
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
    /// Process queued welcome emails until Ctrl+C
    Worker,
}

/// Successful command results, printed to stdout as JSON.
#[derive(Serialize)]
#[serde(untagged)]
enum Output {
    Client(Client),
    Page(PaginatedResult<Client>),
    Deleted { id: Uuid, deleted: bool },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(path) = cli.sqlite_path.clone() {
        config.sqlite_path = path;
    }
    if let Some(url) = cli.redis_url.clone() {
        config.redis_url = url;
    }

    init_tracing(&config);

    match run(cli.command, &config).await {
        Ok(code) => code,
        Err(err) => {
            tracing::error!(error = %err, "clientdesk failed");
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

/// Initialize tracing; logs go to stderr so stdout stays machine-readable.
fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "clientdesk=info".into());

    let json = config.log_json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
    });
    let text = (!config.log_json)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(text)
        .init();
}

async fn run(command: Command, config: &Config) -> Result<ExitCode> {
    let state = AppState::new(config)
        .await
        .context("failed to initialize backends")?;
    let consumer = consumes_welcome_queue(&command).then(|| state.spawn_welcome_consumer());

    let outcome = execute(&state.controller, command).await;

    // Drain the welcome queue before exiting.
    if let Some(consumer) = consumer {
        state.signal_shutdown();
        let summary = consumer
            .await
            .context("welcome consumer panicked")?
            .context("welcome consumer failed")?;
        tracing::debug!(
            handled = summary.handled,
            failed = summary.failed,
            "Welcome consumer drained"
        );
    }

    match outcome {
        Ok(Some(output)) => {
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        }
        Ok(None) => Ok(ExitCode::SUCCESS),
        Err(err) => {
            let body = ErrorBody::from(&err);
            eprintln!("{}", serde_json::to_string_pretty(&body)?);
            Ok(ExitCode::from(exit_code(err.kind())))
        }
    }
}

/// Whether this process consumes the welcome queue while running `command`.
///
/// The in-memory queue dies with the process, so every command drains its
/// own messages. A Redis queue is left to the `worker` process.
fn consumes_welcome_queue(command: &Command) -> bool {
    matches!(command, Command::Worker) || cfg!(feature = "memory")
}

/// Runs one command. `Worker` yields no output.
async fn execute(
    controller: &ClientController,
    command: Command,
) -> Result<Option<Output>, ClientError> {
    let output = match command {
        Command::Create { name, email, phone } => Output::Client(
            controller
                .create(CreateClientRequest::new(name, email, phone))
                .await?,
        ),
        Command::Get { id } => Output::Client(controller.find_by_id(id).await?),
        Command::Update {
            id,
            name,
            email,
            phone,
        } => Output::Client(
            controller
                .update(id, UpdateClientRequest::new(name, email, phone))
                .await?,
        ),
        Command::Delete { id } => {
            controller.delete(id).await?;
            Output::Deleted { id, deleted: true }
        }
        Command::List { page, limit } => {
            Output::Page(controller.find_paginated(page, limit).await?)
        }
        Command::Worker => {
            tracing::info!("Worker running, press Ctrl+C to stop");
            shutdown_signal().await;
            return Ok(None);
        }
    };
    Ok(Some(output))
}

/// Wait for shutdown signals (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            tracing::error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down...");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, shutting down...");
        }
    }
}
