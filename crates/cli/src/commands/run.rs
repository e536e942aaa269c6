//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref endpoint) = args.endpoint {
        match blueprint.transport {
            Some(ref mut transport) => {
                info!(endpoint = %endpoint, "Overriding transport endpoint from CLI");
                transport.endpoint = endpoint.clone();
            }
            None => {
                warn!(
                    endpoint = %endpoint,
                    "--endpoint given but no [transport] section; override ignored"
                );
            }
        }
    }

    info!(
        athlete = %blueprint.session.athlete_id,
        sensors = blueprint.sensors.len(),
        sinks = blueprint.sinks.len(),
        transport = blueprint.transport.is_some(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    // Build pipeline configuration
    let pipeline_config = PipelineConfig {
        blueprint,
        max_windows: if args.max_windows == 0 {
            None
        } else {
            Some(args.max_windows)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    // Create and run pipeline
    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting pipeline...");

    // Run pipeline with shutdown signal
    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        windows_processed = stats.windows_processed,
                        alerts_dispatched = stats.alerts_dispatched,
                        duration_secs = stats.duration.as_secs_f64(),
                        "Pipeline completed successfully"
                    );

                    // Print detailed statistics
                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Pipeline execution failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping pipeline...");
        }
    }

    info!("Biosync finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::SessionBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Session:");
    println!("  Athlete: {}", blueprint.session.athlete_id);
    println!("  Quality floor: {}", blueprint.session.quality_floor);
    println!(
        "  Latency budget: {:.0}ms",
        blueprint.session.latency_budget_ms
    );

    println!("\nSensors ({}):", blueprint.sensors.len());
    for sensor in &blueprint.sensors {
        println!(
            "  - {} ({:?}, {} Hz)",
            sensor.id, sensor.channel, sensor.sample_rate_hz
        );
    }

    match &blueprint.transport {
        Some(transport) => {
            println!("\nTransport:");
            println!("  Endpoint: {}", transport.endpoint);
            println!("  Heartbeat: {}s", transport.heartbeat_interval_s);
            println!("  Compression: {}", transport.compression);
        }
        None => {
            println!("\nTransport: none (mock garment sources)");
        }
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
