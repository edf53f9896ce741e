use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use envconfig::Envconfig;
use tokio::sync::watch;
use tracing::{info, warn};

use courier_cli::api;
use courier_cli::telemetry::{self, LogFormat};
use courier_core::app::{Backend, TaskService, WorkerBuilder};
use courier_core::config::{RedisConfig, ServiceConfig, SmtpConfig, WorkerConfig, WorkerSettings};
use courier_core::domain::{CourierError, StoreError};
use courier_core::impls::SmtpMailer;
use courier_core::typed::{EmailHandler, EmailTask};

#[derive(Parser)]
#[command(name = "courier", version, about = "Background task queue: producer API and worker")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP producer API.
    Serve {
        #[arg(long, env = "COURIER_BIND", default_value = "0.0.0.0:5000")]
        bind: SocketAddr,
    },
    /// Run one worker loop until interrupted.
    Worker,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    telemetry::init(LogFormat::from_env());

    let cli = Cli::parse();
    let redis = RedisConfig::init_from_env().context("Failed to load Redis config")?;
    let Some(backend) = connect(&redis).await? else {
        info!("shutdown signal received before Redis became reachable");
        return Ok(());
    };

    match cli.command {
        Command::Serve { bind } => serve(backend, bind).await,
        Command::Worker => work(backend).await,
    }
}

/// Connect to Redis, retrying on connectivity failures until ctrl-c.
async fn connect(redis: &RedisConfig) -> anyhow::Result<Option<Backend>> {
    let backoff = WorkerSettings::default().connectivity_backoff;
    loop {
        match Backend::redis(redis).await {
            Ok(backend) => return Ok(Some(backend)),
            Err(CourierError::Queue(e)) if e.is_connectivity() => {
                warn!(error = %e, ?backoff, "Redis unreachable, retrying");
            }
            Err(CourierError::Store(StoreError::Connectivity(e))) => {
                warn!(error = %e, ?backoff, "Redis unreachable, retrying");
            }
            Err(e) => return Err(e).context("Failed to connect to Redis"),
        }
        tokio::select! {
            _ = tokio::time::sleep(backoff) => {}
            _ = tokio::signal::ctrl_c() => return Ok(None),
        }
    }
}

async fn serve(backend: Backend, bind: SocketAddr) -> anyhow::Result<()> {
    let config = ServiceConfig::init_from_env().context("Failed to load service config")?;
    info!(%config, "starting producer API");

    let service = TaskService::new(backend).with_list_limit(config.list_limit);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("Failed to bind {bind}"))?;
    info!(%bind, "listening");

    axum::serve(listener, api::router(service))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutdown signal received");
        })
        .await
        .context("HTTP server failed")
}

async fn work(backend: Backend) -> anyhow::Result<()> {
    let worker_config = WorkerConfig::init_from_env().context("Failed to load worker config")?;
    let smtp_config = SmtpConfig::init_from_env().context("Failed to load SMTP config")?;
    info!(%worker_config, %smtp_config, "starting worker");

    let mailer = SmtpMailer::from_config(&smtp_config).context("Failed to set up SMTP")?;
    let worker = WorkerBuilder::new()
        .register::<EmailTask, _>(EmailHandler::new(Arc::new(mailer)))?
        .settings(WorkerSettings::from(&worker_config))
        .build(backend)?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("shutdown signal received, finishing current task");
        let _ = shutdown_tx.send(true);
    });

    worker.run(shutdown_rx).await;
    Ok(())
}
