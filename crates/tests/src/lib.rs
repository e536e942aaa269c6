//! # Integration Tests
//!
//! Cross-crate and end-to-end tests.
//!
//! Responsibilities:
//! - Contract snapshot tests
//! - Mock e2e tests (no garment hardware required)
//! - Detection and alerting scenarios that span multiple crates

#[cfg(test)]
mod contract_tests {
    use contracts::{CalibrationParams, CalibrationStore, PipelineError};

    #[test]
    fn test_contracts_compile() {
        // Verify the contracts crate surface
        let _ = contracts::ConfigVersion::V1;
    }

    #[test]
    fn test_calibration_round_trip_property() {
        // Every in-range parameter set applies; every out-of-range set is
        // rejected and leaves the prior calibration unchanged
        let store = CalibrationStore::new(CalibrationParams::default());

        let mut params = CalibrationParams::default();
        params.tof_gain = 1.0;
        params.imu_drift_correction = 2.0;
        params.pressure_threshold = 0.1;
        params.sample_window_ms = 50;
        params.filter_cutoff_hz = 10.0;
        assert!(store.apply("quad_left_tof".into(), params.clone()).is_ok());

        let mutations: [fn(&mut CalibrationParams); 5] = [
            |p| p.tof_gain = 0.5,
            |p| p.imu_drift_correction = 2.5,
            |p| p.pressure_threshold = 0.0,
            |p| p.sample_window_ms = 1000,
            |p| p.filter_cutoff_hz = 0.1,
        ];
        for bad in mutations {
            let mut broken = params.clone();
            bad(&mut broken);
            let err = store.apply("quad_left_tof".into(), broken).unwrap_err();
            assert!(matches!(err, PipelineError::CalibrationRange { .. }));
            // Prior calibration still active
            assert_eq!(store.get("quad_left_tof").tof_gain, 1.0);
        }
    }
}

#[cfg(test)]
mod e2e_tests {
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    use analytics::{AnalyticsEngine, BaselineStore};
    use contracts::{
        AlertCategory, AnalyticsConfig, CalibrationParams, CalibrationStore, PipelineUpdate,
        SensorChannel, SensorReading, SinkConfig, SinkType,
    };
    use dispatcher::{create_dispatcher, AlertPipeline};
    use ingestion::{IngestionPipeline, MockGarmentSource};
    use tokio::sync::mpsc;

    fn small_window_config(capacity: usize) -> AnalyticsConfig {
        let mut config = AnalyticsConfig::default();
        config.window.capacity = capacity;
        config
    }

    fn engine_with(config: AnalyticsConfig) -> AnalyticsEngine {
        AnalyticsEngine::new(
            config,
            Arc::new(CalibrationStore::new(CalibrationParams::default())),
            Arc::new(BaselineStore::new()),
        )
    }

    fn tof_reading(sensor: &str, timestamp: f64, distance: f64) -> SensorReading {
        SensorReading {
            sensor_id: sensor.into(),
            channel: SensorChannel::Tof,
            timestamp,
            raw_values: vec![distance, 0.5],
            quality_score: 95,
        }
    }

    /// End-to-end: MockGarmentSource -> Ingestion -> AnalyticsEngine -> Dispatcher
    ///
    /// Verifies the full data flow:
    /// 1. Mock garment sources generate readings
    /// 2. The ingestion pipeline gates and forwards them
    /// 3. The analytics engine produces window reports
    /// 4. The dispatcher fans updates out to sinks
    #[tokio::test]
    async fn test_e2e_mock_pipeline() {
        // Small windows so reports arrive quickly at mock rates
        let mut ingestion = IngestionPipeline::new(2048, 50);
        ingestion.register_source(
            "pelvis_imu".to_string(),
            Box::new(MockGarmentSource::imu("pelvis_imu", 500.0)),
            None,
        );
        ingestion.register_source(
            "quad_left_tof".to_string(),
            Box::new(MockGarmentSource::tof("quad_left_tof", 500.0)),
            None,
        );

        let mut engine = engine_with(small_window_config(32));

        let (update_tx, update_rx) = mpsc::channel::<PipelineUpdate>(100);
        let sink_configs = vec![SinkConfig {
            name: "test_log".to_string(),
            sink_type: SinkType::Log,
            queue_capacity: 50,
            params: HashMap::new(),
        }];
        let dispatcher = create_dispatcher(sink_configs, update_rx).unwrap();
        let dispatcher_handle = dispatcher.spawn();

        ingestion.start_all();
        let rx = ingestion.take_receiver().unwrap();

        let target_reports = 4u64;
        let pipeline_handle = tokio::spawn(async move {
            let mut reports = 0u64;
            let mut sensors_seen = std::collections::HashSet::new();

            while let Ok(reading) = rx.recv().await {
                sensors_seen.insert(reading.sensor_id.clone());
                if let Some(report) = engine.push(reading) {
                    reports += 1;
                    let _ = update_tx
                        .send(PipelineUpdate::Metrics(report.metrics.clone()))
                        .await;
                    let _ = update_tx
                        .send(PipelineUpdate::HeatMap(report.heat_map))
                        .await;
                    if reports >= target_reports {
                        break;
                    }
                }
            }
            (reports, sensors_seen.len())
        });

        let result = tokio::time::timeout(Duration::from_secs(10), pipeline_handle).await;

        ingestion.stop_all();

        assert!(result.is_ok(), "Pipeline timed out");
        let (reports, sensor_count) = result.unwrap().unwrap();
        assert!(
            reports >= target_reports,
            "Should produce at least {target_reports} reports, got {reports}"
        );
        assert_eq!(sensor_count, 2, "Both mock sensors should deliver readings");

        // Dispatcher drains and shuts down once senders are gone
        let _ = tokio::time::timeout(Duration::from_secs(2), dispatcher_handle).await;
    }

    /// A window of 90 normal and 10 spiked values produces a confident
    /// anomaly, and the cooldown dedups the immediate repeat
    #[tokio::test]
    async fn test_outlier_window_alerts_once() {
        let mut engine = engine_with(small_window_config(100));
        let calibration = CalibrationStore::new(CalibrationParams::default());
        let mut alerts = AlertPipeline::new(0.85);

        // One spiked window: 90 normal values, 10 spiked
        let mut report = None;
        for i in 0..100u64 {
            let value = if i < 90 { 10.0 } else { 100.0 };
            let t = i as f64 * 0.0001;
            if let Some(r) = engine.push(tof_reading("quad_left_tof", t, value)) {
                report = Some(r);
            }
        }

        let report = report.expect("window should complete");
        let anomaly = report.anomaly.as_ref().expect("anomaly computed");
        assert!(
            anomaly.confidence >= 0.85,
            "confidence {} below threshold",
            anomaly.confidence
        );

        // The identical trigger again shortly after: same pair, inside cooldown
        let mut repeat = report.clone();
        repeat.t_window += 0.1;
        if let Some(a) = repeat.anomaly.as_mut() {
            a.timestamp += 0.1;
        }

        let mut dispatched = alerts.evaluate(&report, &calibration);
        dispatched.extend(alerts.evaluate(&repeat, &calibration));

        // The spiked load also crosses the pressure threshold; count anomaly
        // alerts specifically: exactly one survives the cooldown
        let anomaly_alerts: Vec<_> = dispatched
            .iter()
            .filter(|a| {
                matches!(
                    a.payload,
                    contracts::AlertPayload::Anomaly(_)
                )
            })
            .collect();
        assert_eq!(
            anomaly_alerts.len(),
            1,
            "cooldown should suppress the repeat anomaly"
        );
        assert!(alerts.suppressed_count() >= 1);
    }

    /// Sensor faults and anomaly alerts dedup independently per category
    #[tokio::test]
    async fn test_sensor_fault_category_independent() {
        let mut alerts = AlertPipeline::new(0.85);

        let first = alerts.sensor_fault("pelvis_imu".into(), 1.0, "stream stalled");
        let second = alerts.sensor_fault("pelvis_imu".into(), 2.0, "still stalled");
        let third = alerts.sensor_fault("pelvis_imu".into(), 7.0, "stalled again");

        assert!(first.is_some());
        assert!(second.is_none(), "within the 5s sensor-fault cooldown");
        assert!(third.is_some(), "cooldown expired");
        assert_eq!(first.unwrap().category, AlertCategory::SensorFault);
    }
}

#[cfg(test)]
mod config_tests {
    use config_loader::{ConfigFormat, ConfigLoader};

    const FULL_TOML: &str = r#"
[session]
athlete_id = "athlete_07"
quality_floor = 60

[[sensors]]
id = "pelvis_imu"
channel = "imu"
sample_rate_hz = 200.0
[sensors.placement]
muscle = "lower_back"
region = "core"
joint = "hip"

[[sensors]]
id = "quad_left_tof"
channel = "tof"
sample_rate_hz = 100.0
[sensors.placement]
muscle = "quadriceps"
region = "left_lower"
joint = "knee"
[sensors.calibration]
tof_gain = 8.0
imu_drift_correction = 0.5
pressure_threshold = 1.5
sample_window_ms = 200
filter_cutoff_hz = 4.0

[calibration]
tof_gain = 4.0
imu_drift_correction = 0.5
pressure_threshold = 2.0
sample_window_ms = 250
filter_cutoff_hz = 5.0

[detector]
sub_window = 10
anomaly_threshold = 0.85

[window]
capacity = 1024

[heatmap]
resolution = 32

[baseline]
refresh_interval_s = 300.0

[transport]
endpoint = "garment-hub.local:7700"
heartbeat_interval_s = 5.0

[[sinks]]
name = "dashboard"
sink_type = "transport"

[[sinks]]
name = "session_files"
sink_type = "file"
[sinks.params]
base_path = "/tmp/biosync"
"#;

    #[test]
    fn test_full_blueprint_loads() {
        let bp = ConfigLoader::load_from_str(FULL_TOML, ConfigFormat::Toml).unwrap();

        assert_eq!(bp.session.quality_floor, 60);
        assert_eq!(bp.sensors.len(), 2);
        assert!(bp.transport.is_some());
        // Defaults fill unspecified transport fields
        assert_eq!(bp.transport.as_ref().unwrap().backoff_cap_s, 30);

        let config = bp.to_analytics_config();
        assert_eq!(config.quality_floor, 60);
        assert_eq!(config.sensor_intervals.len(), 2);

        // Per-sensor calibration override survives loading
        assert_eq!(bp.calibration_for("quad_left_tof").tof_gain, 8.0);
        assert_eq!(bp.calibration_for("pelvis_imu").tof_gain, 4.0);
    }

    #[test]
    fn test_transport_sink_without_transport_rejected() {
        let toml = FULL_TOML.replace("[transport]\nendpoint = \"garment-hub.local:7700\"\nheartbeat_interval_s = 5.0\n", "");
        let result = ConfigLoader::load_from_str(&toml, ConfigFormat::Toml);
        assert!(result.is_err());
    }
}
