//! Pipeline orchestrator - coordinates all components.
//!
//! Wires ingestion -> analytics -> alert pipeline -> dispatcher, plus the
//! optional transport link and the periodic baseline refresh task. Without a
//! `[transport]` section the pipeline runs on mock garment sources, so a
//! full session works with no hardware attached.

use std::sync::Arc;
use std::time::{Duration, Instant};

use analytics::{AnalyticsEngine, BaselineStore, SessionTracker};
use anyhow::{Context, Result};
use contracts::{CalibrationStore, PipelineUpdate, SessionBlueprint};
use dispatcher::{AlertPipeline, DispatcherBuilder, DispatcherConfig};
use ingestion::{IngestionPipeline, MockGarmentSource};
use observability::{record_alert_dispatched, record_window_report};
use tokio::sync::mpsc;
use tracing::{info, warn};

use super::PipelineStats;

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The session blueprint
    pub blueprint: SessionBlueprint,

    /// Maximum number of window reports to produce (None = unlimited)
    pub max_windows: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run the pipeline to completion
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        // Calibration store: session defaults plus validated per-sensor overrides
        let calibration = Arc::new(CalibrationStore::new(blueprint.calibration.clone()));
        for sensor in &blueprint.sensors {
            if let Some(params) = &sensor.calibration {
                calibration
                    .apply(sensor.id.as_str().into(), params.clone())
                    .with_context(|| format!("calibration for sensor '{}'", sensor.id))?;
            }
        }

        let baselines = Arc::new(BaselineStore::new());

        // Setup Ingestion
        info!("Setting up ingestion pipeline...");
        let mut ingestion =
            IngestionPipeline::new(self.config.buffer_size, blueprint.session.quality_floor);

        // Transport link feeds the ingestion channel when configured;
        // otherwise every configured sensor gets a mock garment source
        let transport_handle = if let Some(transport_config) = &blueprint.transport {
            info!(endpoint = %transport_config.endpoint, "Starting transport link");
            Some(transport::spawn_link(
                transport_config.clone(),
                ingestion.sender(),
            ))
        } else {
            info!("No transport configured - running on mock garment sources");
            for sensor in &blueprint.sensors {
                let source = match sensor.channel {
                    contracts::SensorChannel::Imu => {
                        MockGarmentSource::imu(&sensor.id, sensor.sample_rate_hz)
                    }
                    contracts::SensorChannel::Tof => {
                        MockGarmentSource::tof(&sensor.id, sensor.sample_rate_hz)
                    }
                };
                ingestion.register_source(sensor.id.clone(), Box::new(source), None);
            }
            None
        };

        let active_sensors = blueprint.sensors.len();
        info!(active_sensors, "Ingestion pipeline configured");

        // Setup Analytics Engine
        info!("Configuring analytics engine...");
        let analytics_config = blueprint.to_analytics_config();
        let placements = analytics_config.placements.clone();
        let mut engine = AnalyticsEngine::new(
            analytics_config,
            Arc::clone(&calibration),
            Arc::clone(&baselines),
        );
        let mut session = SessionTracker::new(placements);
        let mut alert_pipeline = AlertPipeline::new(blueprint.detector.anomaly_threshold);

        // Setup Dispatcher
        info!("Setting up dispatcher...");
        let (update_tx, update_rx) = mpsc::channel::<PipelineUpdate>(self.config.buffer_size);

        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - pipeline updates will be dropped");
        }

        let mut builder = DispatcherBuilder::new(
            DispatcherConfig {
                sinks: blueprint.sinks.clone(),
            },
            update_rx,
        );
        if let Some(handle) = &transport_handle {
            builder = builder.with_transport(handle.outbound());
        }
        let dispatcher = builder.build().context("Failed to create dispatcher")?;

        let active_sinks = blueprint.sinks.len();
        let dispatcher_handle = dispatcher.spawn();
        info!(active_sinks, "Dispatcher started");

        // Baseline refresh runs in the background and hands refreshed
        // profiles to the sinks for the storage collaborator
        let baseline_task = analytics::spawn_refresh_task(
            Arc::clone(&baselines),
            blueprint.baseline.refresh_interval_s,
            update_tx.clone(),
        );

        // Start Pipeline
        info!("Starting sensor data ingestion...");
        ingestion.start_all();
        let ingestion_rx = ingestion
            .take_receiver()
            .context("Failed to get ingestion receiver")?;

        let max_windows = self.config.max_windows;
        let update_tx_main = update_tx.clone();
        drop(update_tx);

        info!(max_windows = ?max_windows, "Pipeline running");

        // Pipeline processing task
        let pipeline_task = async move {
            let mut stats = PipelineStats {
                active_sensors,
                active_sinks,
                ..Default::default()
            };

            while let Ok(reading) = ingestion_rx.recv().await {
                stats.readings_received += 1;

                let Some(report) = engine.push(reading) else {
                    continue;
                };
                stats.windows_processed += 1;

                record_window_report(&report);
                stats.pipeline_metrics.update(&report);

                for alert in alert_pipeline.evaluate(&report, &calibration) {
                    record_alert_dispatched(&alert);
                    stats.pipeline_metrics.record_alert(&alert);
                    stats.alerts_dispatched += 1;

                    info!(
                        alert_id = alert.id,
                        sensor_id = %alert.sensor_id,
                        category = ?alert.category,
                        severity = ?alert.severity,
                        "Alert dispatched"
                    );

                    if update_tx_main
                        .send(PipelineUpdate::Alert(alert))
                        .await
                        .is_err()
                    {
                        warn!("Dispatcher channel closed");
                        return stats;
                    }
                }

                session.fold(&report);

                info!(
                    sensor_id = %report.sensor_id,
                    t_window = format!("{:.3}", report.t_window),
                    window_len = report.meta.window_len,
                    pass_ms = format!("{:.2}", report.meta.pass_ms),
                    anomaly = report.anomaly.is_some(),
                    "Window report produced"
                );

                let updates = [
                    PipelineUpdate::Metrics(report.metrics.clone()),
                    PipelineUpdate::HeatMap(report.heat_map.clone()),
                    PipelineUpdate::Session(session.snapshot()),
                ];
                for update in updates {
                    if update_tx_main.send(update).await.is_err() {
                        warn!("Dispatcher channel closed");
                        return stats;
                    }
                }

                // Check max windows limit
                if let Some(max) = max_windows {
                    if stats.windows_processed >= max {
                        info!(windows = stats.windows_processed, "Reached max windows limit");
                        break;
                    }
                }
            }

            stats
        };

        // Run with optional timeout
        let stats = if let Some(timeout) = self.config.timeout {
            match tokio::time::timeout(timeout, pipeline_task).await {
                Ok(stats) => stats,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Pipeline timed out");
                    PipelineStats::default()
                }
            }
        } else {
            pipeline_task.await
        };

        // Shutdown
        info!("Shutting down pipeline...");
        ingestion.stop_all();
        baseline_task.abort();

        // Wait for dispatcher to flush (all update senders are gone now)
        let _ = tokio::time::timeout(Duration::from_secs(5), dispatcher_handle).await;

        if let Some(handle) = transport_handle {
            let _ = tokio::time::timeout(Duration::from_secs(5), handle.shutdown()).await;
        }

        let mut final_stats = stats;
        final_stats.duration = start_time.elapsed();

        info!(
            duration_secs = final_stats.duration.as_secs_f64(),
            windows_per_second = format!("{:.2}", final_stats.windows_per_second()),
            "Pipeline shutdown complete"
        );

        Ok(final_stats)
    }
}
