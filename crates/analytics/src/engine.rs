//! Main analytics engine implementation.
//!
//! One `SensorProcessor` per sensor owns that sensor's filter bank and
//! window buffer; nothing mutable is shared across sensors except the
//! baseline store, so per-sensor processing units can run concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use contracts::{
    AnalyticsConfig, CalibrationStore, ProcessMeta, SensorChannel, SensorId, SensorReading,
    WindowReport,
};
use tracing::{instrument, warn};

use crate::aggregator::MetricsAggregator;
use crate::baseline::BaselineStore;
use crate::detector::AnomalyDetector;
use crate::filter::FilterBank;
use crate::heatmap::HeatMapGenerator;
use crate::window::WindowBuffer;

/// One filtered sample vector
#[derive(Debug, Clone)]
pub struct FilteredFrame {
    /// Reading timestamp (seconds)
    pub timestamp: f64,

    /// Denoised channel values, same layout as the raw reading
    pub values: Vec<f64>,
}

impl FilteredFrame {
    /// L2 norm of the acceleration axes (first three values)
    pub fn accel_magnitude(&self) -> f64 {
        self.values
            .iter()
            .take(3)
            .map(|v| v * v)
            .sum::<f64>()
            .sqrt()
    }

    /// First channel value (ToF distance)
    pub fn scalar(&self) -> f64 {
        self.values.first().copied().unwrap_or(0.0)
    }
}

/// Per-sensor processing unit
///
/// Owns the sensor's filter state and window exclusively.
struct SensorProcessor {
    channel: SensorChannel,
    filters: FilterBank,
    window: WindowBuffer<FilteredFrame>,
    /// Window span from calibration (sample_window_ms)
    window_span_s: f64,
    /// ToF gain applied to the distance axis before filtering
    tof_gain: f64,
    /// IMU gyro bias correction (radians) applied before filtering
    gyro_bias_rad: f64,
    /// Timestamp anchoring the current window period
    period_start: Option<f64>,
    /// Eviction counter value at the last emitted report
    evicted_seen: u64,
    /// Readings rejected since the last emitted report
    rejected_since_pass: u64,
}

impl SensorProcessor {
    fn ingest(&mut self, reading: &SensorReading) -> Vec<f64> {
        let mut raw = reading.raw_values.clone();
        match self.channel {
            SensorChannel::Tof => {
                if let Some(distance) = raw.first_mut() {
                    *distance *= self.tof_gain;
                }
            }
            SensorChannel::Imu => {
                // Gyro axes follow the three accel axes
                for value in raw.iter_mut().skip(3) {
                    *value -= self.gyro_bias_rad;
                }
            }
        }

        let values = self.filters.apply(&raw);
        self.window.append(FilteredFrame {
            timestamp: reading.timestamp,
            values: values.clone(),
        });
        self.period_start.get_or_insert(reading.timestamp);
        values
    }

    /// A pass is due when the window fills or the calibrated span elapses
    fn pass_due(&self, now: f64) -> bool {
        if self.window.is_full() {
            return true;
        }
        self.period_start
            .is_some_and(|start| now - start >= self.window_span_s)
    }
}

/// Analytics engine
///
/// Drives filter -> window -> {detect, heat map, aggregate} for every
/// registered sensor and emits one `WindowReport` per completed pass.
pub struct AnalyticsEngine {
    config: AnalyticsConfig,
    calibration: Arc<CalibrationStore>,
    baselines: Arc<BaselineStore>,
    detector: AnomalyDetector,
    heatmap: HeatMapGenerator,
    aggregator: MetricsAggregator,
    processors: HashMap<SensorId, SensorProcessor>,
    window_count: u64,
}

impl AnalyticsEngine {
    /// Create an engine with injected collaborator stores
    pub fn new(
        config: AnalyticsConfig,
        calibration: Arc<CalibrationStore>,
        baselines: Arc<BaselineStore>,
    ) -> Self {
        let detector = AnomalyDetector::new(config.detector.clone());
        let heatmap = HeatMapGenerator::new(config.heatmap.clone());
        Self {
            config,
            calibration,
            baselines,
            detector,
            heatmap,
            aggregator: MetricsAggregator::new(),
            processors: HashMap::new(),
            window_count: 0,
        }
    }

    /// Push one validated reading into the engine
    ///
    /// Returns `Some(WindowReport)` when this reading completed a window.
    #[instrument(
        level = "trace",
        name = "analytics_engine_push",
        skip(self, reading),
        fields(sensor_id = %reading.sensor_id, timestamp = reading.timestamp)
    )]
    pub fn push(&mut self, reading: SensorReading) -> Option<WindowReport> {
        // The quality gate runs at ingestion; this is the engine's own
        // invariant guard so corrupt samples can never reach filter state.
        if reading.quality_score < self.config.quality_floor || !reading.is_well_formed() {
            if let Some(processor) = self.processors.get_mut(&reading.sensor_id) {
                processor.rejected_since_pass += 1;
            }
            metrics::counter!(
                "biosync_engine_rejected_total",
                "sensor_id" => reading.sensor_id.to_string()
            )
            .increment(1);
            return None;
        }

        let sensor_id = reading.sensor_id.clone();
        self.ensure_processor(&sensor_id, reading.channel);

        let timestamp = reading.timestamp;
        let filtered = match self.processors.get_mut(&sensor_id) {
            Some(processor) => processor.ingest(&reading),
            None => return None,
        };

        self.baselines.record(&sensor_id, &filtered, timestamp);

        if self
            .processors
            .get(&sensor_id)
            .is_some_and(|p| p.pass_due(timestamp))
        {
            self.process_window(&sensor_id, timestamp)
        } else {
            None
        }
    }

    /// Windows completed so far
    pub fn window_count(&self) -> u64 {
        self.window_count
    }

    fn ensure_processor(&mut self, sensor_id: &SensorId, channel: SensorChannel) {
        if self.processors.contains_key(sensor_id) {
            return;
        }

        let calibration = self.calibration.get(sensor_id);
        let measurement_noise = self
            .config
            .filter
            .measurement_noise_for(calibration.filter_cutoff_hz);

        let processor = SensorProcessor {
            channel,
            filters: FilterBank::new(self.config.filter.process_noise, measurement_noise),
            window: WindowBuffer::new(self.config.window.capacity),
            window_span_s: calibration.sample_window_ms as f64 / 1000.0,
            tof_gain: calibration.tof_gain,
            gyro_bias_rad: calibration.imu_drift_correction.to_radians(),
            period_start: None,
            evicted_seen: 0,
            rejected_since_pass: 0,
        };
        self.processors.insert(sensor_id.clone(), processor);
    }

    #[instrument(name = "analytics_engine_process_window", skip(self), fields(sensor_id = %sensor_id))]
    fn process_window(&mut self, sensor_id: &SensorId, now: f64) -> Option<WindowReport> {
        let started = Instant::now();

        let processor = self.processors.get_mut(sensor_id)?;
        let frames = processor.window.snapshot();

        // Anchor the next period regardless of outcome so a degenerate
        // window cannot wedge the cadence
        processor.period_start = Some(now);

        if frames.len() < 2 {
            warn!(
                sensor_id = %sensor_id,
                samples = frames.len(),
                "skipping degenerate window, prior state retained"
            );
            metrics::counter!(
                "biosync_engine_windows_skipped_total",
                "sensor_id" => sensor_id.to_string()
            )
            .increment(1);
            return None;
        }

        let window_len = frames.len();
        let series: Vec<f64> = match processor.channel {
            SensorChannel::Imu => frames.iter().map(FilteredFrame::accel_magnitude).collect(),
            SensorChannel::Tof => frames.iter().map(FilteredFrame::scalar).collect(),
        };

        let baseline = self.baselines.get(sensor_id);
        let baseline_ref = baseline.as_deref().cloned().unwrap_or_default();

        let anomaly = self
            .detector
            .detect(sensor_id, now, &series, &baseline_ref)
            .ok();

        let heat_map = self.heatmap.generate(sensor_id, now, &frames);

        let (imu_frames, tof_frames): (&[FilteredFrame], &[FilteredFrame]) =
            match processor.channel {
                SensorChannel::Imu => (&frames, &[]),
                SensorChannel::Tof => (&[], &frames),
            };
        let metrics_record =
            self.aggregator
                .aggregate(sensor_id, now, imu_frames, tof_frames, baseline.as_deref());

        processor.window.clear();

        let evicted_total = processor.window.evicted_count();
        let evicted_count = evicted_total - processor.evicted_seen;
        processor.evicted_seen = evicted_total;

        let rejected_count = processor.rejected_since_pass;
        processor.rejected_since_pass = 0;

        let pass_ms = started.elapsed().as_secs_f64() * 1000.0;
        let over_budget = pass_ms > self.config.latency_budget_ms;
        if over_budget {
            // Budget misses log and count; sensor cadence must not stall
            warn!(
                sensor_id = %sensor_id,
                pass_ms,
                budget_ms = self.config.latency_budget_ms,
                "window pass exceeded latency budget"
            );
        }
        metrics::histogram!("biosync_engine_pass_ms").record(pass_ms);

        self.window_count += 1;

        Some(WindowReport {
            sensor_id: sensor_id.clone(),
            t_window: now,
            metrics: metrics_record,
            heat_map,
            anomaly,
            meta: ProcessMeta {
                window_len,
                pass_ms,
                over_budget,
                evicted_count,
                rejected_count,
            },
        })
    }
}
