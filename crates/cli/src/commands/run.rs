//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{HubRunner, RunnerConfig};

/// Execute the `run` command
pub async fn run_hub(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut config = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(port) = args.metrics_port {
        info!(port, "Overriding metrics port from CLI");
        config.metrics_port = Some(port);
    }

    info!(
        input = %config.device.input_path.display(),
        sysfs = %config.device.sysfs_root.display(),
        queue_len = config.input_queue_len,
        startup = config.startup_enable.len(),
        "Configuration loaded"
    );

    // Initialize Metrics (optional)
    if let Some(port) = config.metrics_port {
        observability::init_metrics_only(port)?;
        info!("Metrics endpoint available on port {}", port);
    }

    let runner = HubRunner::new(RunnerConfig {
        hub: config,
        enable: args.enable.clone(),
        max_records: (args.max_records != 0).then_some(args.max_records),
        timeout: (args.timeout != 0).then(|| Duration::from_secs(args.timeout)),
        buffer: args.buffer,
        poll_interval: Duration::from_millis(args.poll_interval_ms),
        json: args.json,
    });
    let stop = runner.stop_handle();

    // Setup graceful shutdown handler
    let shutdown = tokio::spawn(async move {
        setup_shutdown_signal().await;
        warn!("Received shutdown signal, stopping hub...");
        stop.request();
    });

    info!("Starting sensor hub polling...");

    // The hub blocks on file I/O, so it runs off the async workers
    let joined = tokio::task::spawn_blocking(move || runner.run()).await;
    shutdown.abort();

    let stats = joined
        .context("Hub polling task panicked")?
        .context("Hub polling failed")?;

    info!(
        records = stats.records,
        duration_secs = stats.duration.as_secs_f64(),
        rate = format!("{:.2}", stats.rate()),
        "Sensor hub stopped"
    );
    stats.print_summary();

    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
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
}
