// src/main.rs
use anyhow::{bail, Context, Result};
use printer_watchdog::{
    api::ApiClient,
    command::{Restarter, ShellRunner},
    config::{self, Config},
    health::HealthEvaluator,
    remote::RemotePinger,
    supervisor::{ShutdownHandle, Supervisor},
};
use tokio::signal;
use tracing::{error, info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("printer_watchdog=debug".parse()?)
                .add_directive("hyper=info".parse()?)
                .add_directive("reqwest=info".parse()?),
        )
        .init();

    let mut args = std::env::args().skip(1);
    let config_path = args.next().unwrap_or_else(|| "config.yaml".to_string());
    let mode = args.next();

    info!("Loading configuration from: {}", config_path);
    let config = config::load_config(&config_path).await?;

    match mode.as_deref() {
        None => supervise(config).await,
        Some("ping") => ping(&config).await,
        Some(other) => bail!("Unknown mode '{}', expected 'ping'", other),
    }
}

async fn supervise(config: Config) -> Result<()> {
    let client = ApiClient::new(
        config.host.base_url.clone(),
        config.host.api_key.clone(),
        config.host.request_timeout(),
    )
    .context("Failed to create host service client")?;

    let restarter = Restarter::new(
        config.restart.command.clone(),
        ShellRunner::new(config.restart.timeout()),
    );

    let (mut supervisor, handle) =
        Supervisor::new(HealthEvaluator::new(client), restarter, &config.supervisor);

    info!("Supervising host service at {}", config.host.base_url);
    tokio::spawn(shutdown_on_signal(handle));

    supervisor.run().await;
    Ok(())
}

async fn ping(config: &Config) -> Result<()> {
    let Some(instance_id) = config.remote.instance_id.as_deref() else {
        warn!("No instance id configured, nothing to report");
        return Ok(());
    };

    let pinger = RemotePinger::new(config.remote.update_url.clone(), config.remote.timeout())?;
    if let Some(response) = pinger.ping(instance_id, &config.remote.api_version).await? {
        info!(status = %response.status(), "Coordination service pinged");
    }
    Ok(())
}

// Graceful shutdown handler
async fn shutdown_on_signal(handle: ShutdownHandle) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
    handle.shutdown();
}
