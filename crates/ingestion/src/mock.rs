//! Mock garment sources
//!
//! Synthetic IMU/ToF streams for running the pipeline without hardware.
//! Waveforms approximate a steady gait: gravity plus a stride sinusoid on
//! the IMU, a breathing pressure envelope on the ToF.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use contracts::{SensorChannel, SensorDataCallback, SensorReading, SensorSource};
use tracing::debug;

/// Mock source configuration
#[derive(Debug, Clone)]
pub struct MockSourceConfig {
    /// Sensor ID
    pub sensor_id: String,

    /// Channel kind
    pub channel: SensorChannel,

    /// Emission rate (Hz)
    pub sample_rate_hz: f64,

    /// Stride frequency of the synthetic movement (Hz)
    pub stride_hz: f64,

    /// Quality score stamped on each reading
    pub quality_score: u8,
}

impl Default for MockSourceConfig {
    fn default() -> Self {
        Self {
            sensor_id: "mock_sensor".to_string(),
            channel: SensorChannel::Imu,
            sample_rate_hz: 200.0,
            stride_hz: 1.4,
            quality_score: 90,
        }
    }
}

/// Mock garment source
///
/// Generates deterministic synthetic readings on a background thread.
pub struct MockGarmentSource {
    config: MockSourceConfig,
    listening: Arc<AtomicBool>,
}

impl MockGarmentSource {
    /// Create a new mock source
    pub fn new(config: MockSourceConfig) -> Self {
        Self {
            config,
            listening: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Create a mock IMU source (200 Hz default rate)
    pub fn imu(sensor_id: &str, sample_rate_hz: f64) -> Self {
        Self::new(MockSourceConfig {
            sensor_id: sensor_id.to_string(),
            channel: SensorChannel::Imu,
            sample_rate_hz,
            ..Default::default()
        })
    }

    /// Create a mock ToF source (100 Hz default rate)
    pub fn tof(sensor_id: &str, sample_rate_hz: f64) -> Self {
        Self::new(MockSourceConfig {
            sensor_id: sensor_id.to_string(),
            channel: SensorChannel::Tof,
            sample_rate_hz,
            ..Default::default()
        })
    }

    fn synthesize(config: &MockSourceConfig, t: f64) -> Vec<f64> {
        use std::f64::consts::TAU;
        let phase = TAU * config.stride_hz * t;

        match config.channel {
            SensorChannel::Imu => {
                // Accel: gravity on z plus stride oscillation; gyro: small sway
                vec![
                    0.6 * phase.sin(),
                    0.3 * (phase * 0.5).cos(),
                    9.8 + 1.2 * phase.cos(),
                    0.05 * phase.sin(),
                    0.04 * (phase * 0.7).cos(),
                    0.02 * phase.sin(),
                ]
            }
            SensorChannel::Tof => {
                // Compression distance with a slow breathing envelope
                vec![
                    1.0 + 0.3 * phase.sin() + 0.05 * (t * 0.4 * TAU).sin(),
                    0.5 + 0.1 * phase.cos(),
                ]
            }
        }
    }
}

impl SensorSource for MockGarmentSource {
    fn sensor_id(&self) -> &str {
        &self.config.sensor_id
    }

    fn channel(&self) -> SensorChannel {
        self.config.channel
    }

    fn listen(&self, callback: SensorDataCallback) {
        if self.listening.swap(true, Ordering::SeqCst) {
            return;
        }

        let config = self.config.clone();
        let listening = self.listening.clone();

        debug!(
            sensor_id = %config.sensor_id,
            channel = ?config.channel,
            sample_rate_hz = config.sample_rate_hz,
            "mock garment source started"
        );

        std::thread::spawn(move || {
            let interval = Duration::from_secs_f64(1.0 / config.sample_rate_hz.max(1.0));
            let mut seq: u64 = 0;

            while listening.load(Ordering::Relaxed) {
                let t = seq as f64 * interval.as_secs_f64();
                let reading = SensorReading {
                    sensor_id: config.sensor_id.as_str().into(),
                    channel: config.channel,
                    timestamp: t,
                    raw_values: Self::synthesize(&config, t),
                    quality_score: config.quality_score,
                };
                callback(reading);
                seq += 1;
                std::thread::sleep(interval);
            }

            debug!(sensor_id = %config.sensor_id, "mock garment source stopped");
        });
    }

    fn stop(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn is_listening(&self) -> bool {
        self.listening.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_mock_imu_emits_six_axes() {
        let source = MockGarmentSource::imu("pelvis_imu", 500.0);
        let readings = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&readings);
        source.listen(Arc::new(move |reading| {
            sink.lock().unwrap().push(reading);
        }));

        std::thread::sleep(Duration::from_millis(50));
        source.stop();

        let readings = readings.lock().unwrap();
        assert!(!readings.is_empty());
        for reading in readings.iter() {
            assert_eq!(reading.raw_values.len(), 6);
            assert_eq!(reading.channel, SensorChannel::Imu);
            assert!(reading.is_well_formed());
        }
        // Gravity dominates the z axis
        assert!(readings[0].raw_values[2] > 8.0);
    }

    #[test]
    fn test_mock_tof_values_positive() {
        let source = MockGarmentSource::tof("quad_left_tof", 500.0);
        let readings = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&readings);
        source.listen(Arc::new(move |reading| {
            sink.lock().unwrap().push(reading);
        }));

        std::thread::sleep(Duration::from_millis(50));
        source.stop();

        let readings = readings.lock().unwrap();
        assert!(!readings.is_empty());
        for reading in readings.iter() {
            assert_eq!(reading.raw_values.len(), 2);
            assert!(reading.raw_values[0] > 0.0);
        }
    }

    #[test]
    fn test_timestamps_monotonic() {
        let source = MockGarmentSource::imu("pelvis_imu", 1000.0);
        let readings = Arc::new(Mutex::new(Vec::new()));

        let sink = Arc::clone(&readings);
        source.listen(Arc::new(move |reading| {
            sink.lock().unwrap().push(reading.timestamp);
        }));

        std::thread::sleep(Duration::from_millis(30));
        source.stop();

        let timestamps = readings.lock().unwrap();
        assert!(timestamps.windows(2).all(|w| w[1] > w[0]));
    }
}
