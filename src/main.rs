use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use iptv_refresh::{
    config::{Config, FileScheduleSource},
    job_scheduling::{ControlLoop, JobExecutor, JobScheduler, JobStatus, SystemClock},
    models::ArtifactKind,
    services::RefreshService,
    sources::DigiOnlineSession,
};

#[derive(Parser)]
#[command(name = "iptv-refresh")]
#[command(version)]
#[command(about = "Keeps an M3U playlist and an XMLTV guide for a PVR client up to date")]
#[command(long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Log level
    #[arg(short = 'v', long, default_value = "info")]
    log_level: String,

    /// Also write logs to a daily rotated file in this directory
    #[arg(long, value_name = "DIR")]
    log_dir: Option<PathBuf>,

    /// Refresh both artifacts once and exit
    #[arg(long)]
    once: bool,
}

fn init_logging(cli: &Cli) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("iptv_refresh={}", cli.log_level)));

    match &cli.log_dir {
        Some(log_dir) => {
            let file_appender = tracing_appender::rolling::daily(log_dir, "iptv-refresh.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer())
                .init();
            None
        }
    }
}

/// Cancel `shutdown` on SIGINT or SIGTERM
fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};
            let (mut sigterm, mut sigint) =
                match (signal(SignalKind::terminate()), signal(SignalKind::interrupt())) {
                    (Ok(sigterm), Ok(sigint)) => (sigterm, sigint),
                    (Err(e), _) | (_, Err(e)) => {
                        error!("Failed to install signal handlers: {}", e);
                        return;
                    }
                };

            tokio::select! {
                _ = sigterm.recv() => info!("Received SIGTERM, shutting down"),
                _ = sigint.recv() => info!("Received SIGINT (Ctrl+C), shutting down"),
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to install Ctrl+C handler: {}", e);
                return;
            }
            info!("Received Ctrl+C, shutting down");
        }

        shutdown.cancel();
    });
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Some(log_dir) = &cli.log_dir {
        std::fs::create_dir_all(log_dir)
            .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;
    }
    let _log_guard = init_logging(&cli);

    info!("Starting iptv-refresh v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load_from_file(&cli.config)?;
    info!("Configuration loaded from: {}", cli.config.display());
    config.validate()?;
    info!(
        "Artifacts: {} and {}",
        config.storage.artifact_path(ArtifactKind::Playlist).display(),
        config.storage.artifact_path(ArtifactKind::Epg).display()
    );

    let session = DigiOnlineSession::new(&config.provider)?;
    let executor = JobExecutor::new(RefreshService::new(session, &config));

    if cli.once {
        let mut failed = false;
        for kind in ArtifactKind::ALL {
            failed |= executor.execute_refresh(kind).await == JobStatus::Failed;
        }
        if failed {
            anyhow::bail!("One or more refreshes failed");
        }
        return Ok(());
    }

    let mut scheduler = JobScheduler::new(
        executor,
        Box::new(FileScheduleSource::new(&cli.config)),
        Box::new(SystemClock),
    );

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    let control_loop = ControlLoop::from_config(&config.service, shutdown);
    if let Err(e) = control_loop.run(&mut scheduler).await {
        warn!("Control loop stopped: {}", e);
        return Err(e.into());
    }

    info!("iptv-refresh stopped");
    Ok(())
}
