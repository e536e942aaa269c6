//! Scalar Kalman-style stream filter.
//!
//! One-dimensional recursive estimator: blends each new measurement with the
//! prior estimate, weighted by relative confidence (gain). O(1) per sample,
//! no error conditions.

/// Scalar recursive filter for one channel axis
///
/// State is `(estimate, estimate_error)`. Given process noise Q and
/// measurement noise R:
///
/// ```text
/// predicted_error = estimate_error + Q
/// gain            = predicted_error / (predicted_error + R)
/// estimate       += gain * (raw - estimate)
/// estimate_error  = (1 - gain) * predicted_error
/// ```
///
/// The first measurement initializes the estimate directly.
#[derive(Debug, Clone)]
pub struct ScalarKalman {
    estimate: f64,
    estimate_error: f64,
    process_noise: f64,
    measurement_noise: f64,
    initialized: bool,
}

impl ScalarKalman {
    /// Create an uninitialized filter with the given noise terms
    pub fn new(process_noise: f64, measurement_noise: f64) -> Self {
        Self {
            estimate: 0.0,
            estimate_error: 1.0,
            process_noise: process_noise.max(1e-12),
            measurement_noise: measurement_noise.max(1e-12),
            initialized: false,
        }
    }

    /// Fold one raw measurement into the estimate and return it
    pub fn update(&mut self, raw: f64) -> f64 {
        if !self.initialized {
            self.estimate = raw;
            self.initialized = true;
            return self.estimate;
        }

        let predicted_error = self.estimate_error + self.process_noise;
        let gain = predicted_error / (predicted_error + self.measurement_noise);

        self.estimate += gain * (raw - self.estimate);
        self.estimate_error = (1.0 - gain) * predicted_error;

        self.estimate
    }

    /// Current estimate, if any measurement has been seen
    pub fn estimate(&self) -> Option<f64> {
        self.initialized.then_some(self.estimate)
    }

    /// Current estimate uncertainty
    pub fn estimate_error(&self) -> f64 {
        self.estimate_error
    }
}

/// Independent filter per channel axis of one sensor
///
/// Axes are never pooled or shared: cross-channel smoothing corrupts
/// orientation-dependent signals, so each axis owns its own state.
#[derive(Debug, Clone)]
pub struct FilterBank {
    filters: Vec<ScalarKalman>,
    process_noise: f64,
    measurement_noise: f64,
}

impl FilterBank {
    /// Create an empty bank; filters are added lazily per axis
    pub fn new(process_noise: f64, measurement_noise: f64) -> Self {
        Self {
            filters: Vec::new(),
            process_noise,
            measurement_noise,
        }
    }

    /// Filter one raw sample vector, one independent filter per axis
    pub fn apply(&mut self, raw: &[f64]) -> Vec<f64> {
        while self.filters.len() < raw.len() {
            self.filters
                .push(ScalarKalman::new(self.process_noise, self.measurement_noise));
        }

        raw.iter()
            .zip(self.filters.iter_mut())
            .map(|(value, filter)| filter.update(*value))
            .collect()
    }

    /// Number of axes seen so far
    pub fn axis_count(&self) -> usize {
        self.filters.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_call_initializes_from_measurement() {
        let mut filter = ScalarKalman::new(0.1, 0.1);
        assert_eq!(filter.estimate(), None);
        assert_eq!(filter.update(7.5), 7.5);
        assert_eq!(filter.estimate(), Some(7.5));
    }

    #[test]
    fn test_constant_input_converges_within_one_percent() {
        // 1024 samples at a constant 5.0 with Q=R=0.1 must land within 1%
        let mut filter = ScalarKalman::new(0.1, 0.1);
        filter.update(0.0); // deliberately bad initial estimate
        let mut last = 0.0;
        for _ in 0..1024 {
            last = filter.update(5.0);
        }
        assert!(
            (last - 5.0).abs() / 5.0 < 0.01,
            "expected within 1% of 5.0, got {last}"
        );
    }

    #[test]
    fn test_constant_input_converges_monotonically() {
        let mut filter = ScalarKalman::new(0.1, 0.1);
        filter.update(0.0);

        let mut prev_gap = f64::INFINITY;
        for _ in 0..100 {
            let estimate = filter.update(5.0);
            let gap = (5.0 - estimate).abs();
            assert!(gap <= prev_gap, "gap grew: {gap} > {prev_gap}");
            prev_gap = gap;
        }
    }

    #[test]
    fn test_smooths_noisy_input() {
        let mut filter = ScalarKalman::new(0.01, 0.5);
        let mut estimate = 0.0;
        for i in 0..200 {
            let noise = ((i % 7) as f64 - 3.0) * 0.5;
            estimate = filter.update(10.0 + noise);
        }
        assert!((estimate - 10.0).abs() < 0.5, "got {estimate}");
    }

    #[test]
    fn test_bank_axes_are_independent() {
        let mut bank = FilterBank::new(0.1, 0.1);

        for _ in 0..50 {
            bank.apply(&[1.0, 100.0, -1.0]);
        }
        assert_eq!(bank.axis_count(), 3);

        let out = bank.apply(&[1.0, 100.0, -1.0]);
        assert!((out[0] - 1.0).abs() < 0.1);
        assert!((out[1] - 100.0).abs() < 1.0);
        assert!((out[2] + 1.0).abs() < 0.1);
    }

    #[test]
    fn test_bank_grows_with_wider_samples() {
        let mut bank = FilterBank::new(0.1, 0.1);
        bank.apply(&[1.0]);
        assert_eq!(bank.axis_count(), 1);
        bank.apply(&[1.0, 2.0, 3.0]);
        assert_eq!(bank.axis_count(), 3);
    }
}
