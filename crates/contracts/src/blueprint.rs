//! SessionBlueprint - Config Loader output
//!
//! Describes a complete monitoring session: athlete, garment sensors,
//! calibration, component tuning, transport link and output routing.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::{
    AnalyticsConfig, BaselineConfig, CalibrationParams, DetectorConfig, FilterConfig,
    HeatMapConfig, SensorChannel, SensorPlacement, TransportConfig, WindowConfig,
};

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete session configuration blueprint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Session settings
    pub session: SessionConfig,

    /// Garment sensor definitions
    pub sensors: Vec<SensorSpec>,

    /// Default calibration (individual sensors may override)
    #[serde(default)]
    pub calibration: CalibrationParams,

    /// Stream filter tuning
    #[serde(default)]
    pub filter: FilterConfig,

    /// Window buffer tuning
    #[serde(default)]
    pub window: WindowConfig,

    /// Anomaly detector tuning
    #[serde(default)]
    pub detector: DetectorConfig,

    /// Heat map tuning
    #[serde(default)]
    pub heatmap: HeatMapConfig,

    /// Baseline refresh tuning
    #[serde(default)]
    pub baseline: BaselineConfig,

    /// Transport link (None = local sources only)
    #[serde(default)]
    pub transport: Option<TransportConfig>,

    /// Output routing configuration
    pub sinks: Vec<SinkConfig>,
}

/// Session settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Athlete identifier (opaque to the core)
    pub athlete_id: String,

    /// Quality floor; readings scoring below it are rejected at ingress
    #[serde(default = "default_quality_floor")]
    pub quality_floor: u8,

    /// End-to-end latency budget (milliseconds)
    #[serde(default = "default_latency_budget_ms")]
    pub latency_budget_ms: f64,
}

fn default_quality_floor() -> u8 {
    50
}

fn default_latency_budget_ms() -> f64 {
    100.0
}

/// One garment sensor
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorSpec {
    /// Unique identifier
    pub id: String,

    /// Channel kind
    pub channel: SensorChannel,

    /// Sampling rate (Hz), must be > 0
    pub sample_rate_hz: f64,

    /// Where the sensor sits on the body
    pub placement: SensorPlacement,

    /// Calibration override for this sensor
    #[serde(default)]
    pub calibration: Option<CalibrationParams>,
}

/// Drop policy when a bounded queue is full
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DropPolicy {
    /// Drop the oldest queued entry
    #[default]
    DropOldest,
    /// Drop the incoming entry
    DropNewest,
}

/// Sink output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Queue capacity
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,

    /// Type-specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

fn default_queue_capacity() -> usize {
    100
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Log output
    Log,
    /// File output (JSON lines)
    File,
    /// Hand-off to the transport reliability layer
    Transport,
}

impl SessionBlueprint {
    /// Build an AnalyticsConfig from blueprint data
    pub fn to_analytics_config(&self) -> AnalyticsConfig {
        let mut placements = HashMap::new();
        let mut sensor_intervals = HashMap::new();

        for sensor in &self.sensors {
            placements.insert(sensor.id.as_str().into(), sensor.placement);
            if sensor.sample_rate_hz > 0.0 {
                sensor_intervals.insert(sensor.id.as_str().into(), 1.0 / sensor.sample_rate_hz);
            }
        }

        AnalyticsConfig {
            quality_floor: self.session.quality_floor,
            latency_budget_ms: self.session.latency_budget_ms,
            filter: self.filter.clone(),
            window: self.window.clone(),
            detector: self.detector.clone(),
            heatmap: self.heatmap.clone(),
            baseline: self.baseline.clone(),
            placements,
            sensor_intervals,
        }
    }

    /// Calibration for a sensor: per-sensor override or session default
    pub fn calibration_for(&self, sensor_id: &str) -> CalibrationParams {
        self.sensors
            .iter()
            .find(|s| s.id == sensor_id)
            .and_then(|s| s.calibration.clone())
            .unwrap_or_else(|| self.calibration.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{BodyRegion, Joint, MuscleGroup};

    fn sample_sensor(id: &str, channel: SensorChannel, sample_rate_hz: f64) -> SensorSpec {
        SensorSpec {
            id: id.to_string(),
            channel,
            sample_rate_hz,
            placement: SensorPlacement {
                muscle: MuscleGroup::Quadriceps,
                region: BodyRegion::LeftLower,
                joint: Joint::Knee,
            },
            calibration: None,
        }
    }

    fn sample_blueprint() -> SessionBlueprint {
        SessionBlueprint {
            version: ConfigVersion::V1,
            session: SessionConfig {
                athlete_id: "athlete_07".into(),
                quality_floor: 50,
                latency_budget_ms: 100.0,
            },
            sensors: vec![
                sample_sensor("quad_left_imu", SensorChannel::Imu, 200.0),
                sample_sensor("quad_left_tof", SensorChannel::Tof, 100.0),
            ],
            calibration: CalibrationParams::default(),
            filter: FilterConfig::default(),
            window: WindowConfig::default(),
            detector: DetectorConfig::default(),
            heatmap: HeatMapConfig::default(),
            baseline: BaselineConfig::default(),
            transport: None,
            sinks: vec![],
        }
    }

    #[test]
    fn test_analytics_config_assembly() {
        let blueprint = sample_blueprint();
        let config = blueprint.to_analytics_config();

        assert_eq!(config.quality_floor, 50);
        assert_eq!(config.placements.len(), 2);
        assert_eq!(
            config.sensor_intervals.get("quad_left_imu").copied(),
            Some(0.005)
        );
        assert_eq!(
            config.sensor_intervals.get("quad_left_tof").copied(),
            Some(0.01)
        );
    }

    #[test]
    fn test_calibration_override() {
        let mut blueprint = sample_blueprint();
        let mut custom = CalibrationParams::default();
        custom.tof_gain = 12.0;
        blueprint.sensors[1].calibration = Some(custom);

        assert_eq!(blueprint.calibration_for("quad_left_tof").tof_gain, 12.0);
        // Uncustomized sensor falls back to session defaults
        assert_eq!(blueprint.calibration_for("quad_left_imu").tof_gain, 4.0);
    }
}
