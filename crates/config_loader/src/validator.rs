//! Configuration validation
//!
//! Validation rules:
//! - sensor id unique (global)
//! - sample_rate_hz > 0
//! - quality_floor <= 100
//! - anomaly_threshold in (0, 1]
//! - window capacity >= detector sub_window
//! - calibration ranges (session defaults and per-sensor overrides)
//! - transport bounds (non-empty endpoint, positive heartbeat/backoff)
//! - sink required fields present

use std::collections::HashSet;

use contracts::{PipelineError, SessionBlueprint, SinkType};

/// Validate a SessionBlueprint
///
/// Returns the first error encountered, or Ok(()).
pub fn validate(blueprint: &SessionBlueprint) -> Result<(), PipelineError> {
    validate_sensors(blueprint)?;
    validate_session(blueprint)?;
    validate_tuning(blueprint)?;
    validate_calibration(blueprint)?;
    validate_transport(blueprint)?;
    validate_sinks(blueprint)?;
    Ok(())
}

/// Sensor ids unique, rates positive
fn validate_sensors(blueprint: &SessionBlueprint) -> Result<(), PipelineError> {
    if blueprint.sensors.is_empty() {
        return Err(PipelineError::config_validation(
            "sensors",
            "at least one sensor is required",
        ));
    }

    let mut seen = HashSet::new();
    for sensor in &blueprint.sensors {
        if !seen.insert(&sensor.id) {
            return Err(PipelineError::config_validation(
                format!("sensors[id={}]", sensor.id),
                "duplicate sensor id",
            ));
        }

        if sensor.sample_rate_hz <= 0.0 {
            return Err(PipelineError::config_validation(
                format!("sensors[{}].sample_rate_hz", sensor.id),
                format!("sample_rate_hz must be > 0, got {}", sensor.sample_rate_hz),
            ));
        }
    }
    Ok(())
}

/// Session-level bounds
fn validate_session(blueprint: &SessionBlueprint) -> Result<(), PipelineError> {
    if blueprint.session.athlete_id.is_empty() {
        return Err(PipelineError::config_validation(
            "session.athlete_id",
            "athlete_id cannot be empty",
        ));
    }

    if blueprint.session.quality_floor > 100 {
        return Err(PipelineError::config_validation(
            "session.quality_floor",
            format!(
                "quality_floor must be <= 100, got {}",
                blueprint.session.quality_floor
            ),
        ));
    }

    if blueprint.session.latency_budget_ms <= 0.0 {
        return Err(PipelineError::config_validation(
            "session.latency_budget_ms",
            "latency budget must be positive",
        ));
    }

    Ok(())
}

/// Component tuning bounds
fn validate_tuning(blueprint: &SessionBlueprint) -> Result<(), PipelineError> {
    let threshold = blueprint.detector.anomaly_threshold;
    if !(threshold > 0.0 && threshold <= 1.0) {
        return Err(PipelineError::config_validation(
            "detector.anomaly_threshold",
            format!("anomaly_threshold must be in (0, 1], got {threshold}"),
        ));
    }

    if blueprint.detector.sub_window == 0 {
        return Err(PipelineError::config_validation(
            "detector.sub_window",
            "sub_window must be >= 1",
        ));
    }

    if blueprint.window.capacity < blueprint.detector.sub_window {
        return Err(PipelineError::config_validation(
            "window.capacity / detector.sub_window",
            format!(
                "window capacity ({}) must be >= detector sub_window ({})",
                blueprint.window.capacity, blueprint.detector.sub_window
            ),
        ));
    }

    if blueprint.heatmap.resolution == 0 {
        return Err(PipelineError::config_validation(
            "heatmap.resolution",
            "resolution must be >= 1",
        ));
    }

    if blueprint.baseline.refresh_interval_s <= 0.0 {
        return Err(PipelineError::config_validation(
            "baseline.refresh_interval_s",
            "refresh interval must be positive",
        ));
    }

    Ok(())
}

/// Calibration ranges (defaults and per-sensor overrides)
fn validate_calibration(blueprint: &SessionBlueprint) -> Result<(), PipelineError> {
    blueprint.calibration.check()?;

    for sensor in &blueprint.sensors {
        if let Some(params) = &sensor.calibration {
            params.check().map_err(|e| {
                PipelineError::config_validation(
                    format!("sensors[{}].calibration", sensor.id),
                    e.to_string(),
                )
            })?;
        }
    }
    Ok(())
}

/// Transport link bounds
fn validate_transport(blueprint: &SessionBlueprint) -> Result<(), PipelineError> {
    let Some(transport) = &blueprint.transport else {
        return Ok(());
    };

    if transport.endpoint.is_empty() {
        return Err(PipelineError::config_validation(
            "transport.endpoint",
            "endpoint cannot be empty",
        ));
    }

    if transport.heartbeat_interval_s <= 0.0 {
        return Err(PipelineError::config_validation(
            "transport.heartbeat_interval_s",
            "heartbeat interval must be positive",
        ));
    }

    if transport.backoff_base_ms == 0 {
        return Err(PipelineError::config_validation(
            "transport.backoff_base_ms",
            "backoff base must be >= 1ms",
        ));
    }

    if transport.queue_capacity == 0 {
        return Err(PipelineError::config_validation(
            "transport.queue_capacity",
            "queue capacity must be >= 1",
        ));
    }

    Ok(())
}

/// Sink configuration
fn validate_sinks(blueprint: &SessionBlueprint) -> Result<(), PipelineError> {
    for (idx, sink) in blueprint.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(PipelineError::config_validation(
                format!("sinks[{idx}].name"),
                "sink name cannot be empty",
            ));
        }

        if sink.sink_type == SinkType::Transport && blueprint.transport.is_none() {
            return Err(PipelineError::config_validation(
                format!("sinks[{}]", sink.name),
                "transport sink requires a [transport] section",
            ));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{
        BaselineConfig, BodyRegion, CalibrationParams, ConfigVersion, DetectorConfig,
        FilterConfig, HeatMapConfig, Joint, MuscleGroup, SensorChannel, SensorPlacement,
        SensorSpec, SessionConfig, SinkConfig, TransportConfig, WindowConfig,
    };

    fn minimal_blueprint() -> SessionBlueprint {
        SessionBlueprint {
            version: ConfigVersion::V1,
            session: SessionConfig {
                athlete_id: "athlete_07".into(),
                quality_floor: 50,
                latency_budget_ms: 100.0,
            },
            sensors: vec![SensorSpec {
                id: "quad_left_imu".into(),
                channel: SensorChannel::Imu,
                sample_rate_hz: 200.0,
                placement: SensorPlacement {
                    muscle: MuscleGroup::Quadriceps,
                    region: BodyRegion::LeftLower,
                    joint: Joint::Knee,
                },
                calibration: None,
            }],
            calibration: CalibrationParams::default(),
            filter: FilterConfig::default(),
            window: WindowConfig::default(),
            detector: DetectorConfig::default(),
            heatmap: HeatMapConfig::default(),
            baseline: BaselineConfig::default(),
            transport: None,
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                queue_capacity: 100,
                params: Default::default(),
            }],
        }
    }

    #[test]
    fn test_valid_config() {
        let bp = minimal_blueprint();
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_duplicate_sensor_id() {
        let mut bp = minimal_blueprint();
        bp.sensors.push(bp.sensors[0].clone());
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate sensor id"), "got: {err}");
    }

    #[test]
    fn test_invalid_sample_rate() {
        let mut bp = minimal_blueprint();
        bp.sensors[0].sample_rate_hz = -5.0;
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("sample_rate_hz must be > 0"), "got: {err}");
    }

    #[test]
    fn test_invalid_threshold() {
        let mut bp = minimal_blueprint();
        bp.detector.anomaly_threshold = 1.5;
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("anomaly_threshold"), "got: {err}");
    }

    #[test]
    fn test_window_smaller_than_sub_window() {
        let mut bp = minimal_blueprint();
        bp.window.capacity = 4;
        bp.detector.sub_window = 10;
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("window capacity"), "got: {err}");
    }

    #[test]
    fn test_calibration_override_out_of_range() {
        let mut bp = minimal_blueprint();
        let mut bad = CalibrationParams::default();
        bad.filter_cutoff_hz = 50.0;
        bp.sensors[0].calibration = Some(bad);
        let result = validate(&bp);
        assert!(result.is_err());
    }

    #[test]
    fn test_transport_sink_requires_transport_section() {
        let mut bp = minimal_blueprint();
        bp.sinks.push(SinkConfig {
            name: "uplink".into(),
            sink_type: SinkType::Transport,
            queue_capacity: 100,
            params: Default::default(),
        });
        let result = validate(&bp);
        assert!(result.is_err());

        bp.transport = Some(TransportConfig {
            endpoint: "127.0.0.1:7700".into(),
            heartbeat_interval_s: 5.0,
            backoff_base_ms: 500,
            backoff_cap_s: 30,
            max_attempts: 8,
            queue_capacity: 256,
            compression: true,
        });
        assert!(validate(&bp).is_ok());
    }

    #[test]
    fn test_empty_sink_name() {
        let mut bp = minimal_blueprint();
        bp.sinks[0].name = String::new();
        let result = validate(&bp);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }
}
