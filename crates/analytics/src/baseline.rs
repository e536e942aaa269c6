//! Baseline store and periodic refresh.
//!
//! Per-sensor reference statistics accumulate continuously (Welford, per
//! axis) and are folded into fresh `BaselineProfile`s on a fixed interval.
//! Refresh swaps whole `Arc` profiles so readers never observe a partial
//! update and real-time detection is never blocked.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use contracts::{BaselineProfile, PipelineUpdate, SensorId};
use observability::RunningStats;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Minimum samples before an accumulator produces a profile
const MIN_SAMPLES: u64 = 32;

/// Per-sensor accumulation state between refreshes
#[derive(Debug, Default)]
struct Accumulator {
    axes: Vec<RunningStats>,
    last_timestamp: f64,
}

/// Baseline store
///
/// Single writer (the refresh path), multiple readers. Readers clone an
/// `Arc<BaselineProfile>` and keep using it even while a refresh swaps in a
/// newer one.
#[derive(Debug, Default)]
pub struct BaselineStore {
    profiles: RwLock<HashMap<SensorId, Arc<BaselineProfile>>>,
    accumulators: Mutex<HashMap<SensorId, Accumulator>>,
}

impl BaselineStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current profile for a sensor, if one has been computed
    pub fn get(&self, sensor_id: &str) -> Option<Arc<BaselineProfile>> {
        self.profiles
            .read()
            .expect("baseline lock poisoned")
            .get(sensor_id)
            .cloned()
    }

    /// Fold one filtered sample vector into the sensor's accumulator
    pub fn record(&self, sensor_id: &SensorId, values: &[f64], timestamp: f64) {
        let mut accumulators = self.accumulators.lock().expect("baseline lock poisoned");
        let acc = accumulators.entry(sensor_id.clone()).or_default();

        while acc.axes.len() < values.len() {
            acc.axes.push(RunningStats::default());
        }
        for (axis, value) in acc.axes.iter_mut().zip(values) {
            axis.push(*value);
        }
        acc.last_timestamp = acc.last_timestamp.max(timestamp);
    }

    /// Recompute profiles from accumulated history and swap them in.
    ///
    /// Sensors with too little history since the last refresh keep their
    /// previous profile. Returns the freshly swapped profiles so callers can
    /// hand them to the storage collaborator.
    pub fn refresh(&self) -> Vec<BaselineProfile> {
        let mut refreshed = Vec::new();

        let mut accumulators = self.accumulators.lock().expect("baseline lock poisoned");
        for (sensor_id, acc) in accumulators.iter_mut() {
            let count = acc.axes.first().map(RunningStats::count).unwrap_or(0);
            if count < MIN_SAMPLES {
                debug!(sensor_id = %sensor_id, count, "skipping baseline refresh, too few samples");
                continue;
            }

            let profile = BaselineProfile {
                sensor_id: sensor_id.clone(),
                mean: acc.axes.iter().map(RunningStats::mean).collect(),
                variance: acc.axes.iter().map(RunningStats::variance).collect(),
                last_updated: acc.last_timestamp,
            };

            refreshed.push(profile.clone());
            self.profiles
                .write()
                .expect("baseline lock poisoned")
                .insert(sensor_id.clone(), Arc::new(profile));

            // Start the next accumulation period fresh
            acc.axes.clear();
        }

        if !refreshed.is_empty() {
            info!(profiles = refreshed.len(), "baseline profiles refreshed");
        }

        refreshed
    }
}

/// Spawn the periodic refresh task.
///
/// Runs on its own scheduling unit; refreshed profiles are forwarded as
/// `PipelineUpdate::Baseline` for the storage collaborator. Never blocks the
/// numeric pipeline - a full update channel only drops the hand-off.
pub fn spawn_refresh_task(
    store: Arc<BaselineStore>,
    interval_s: f64,
    update_tx: mpsc::Sender<PipelineUpdate>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let period = Duration::from_secs_f64(interval_s.max(1.0));
        let mut ticker = tokio::time::interval(period);
        // The first tick fires immediately; skip it so the first refresh
        // happens after one full accumulation period
        ticker.tick().await;

        loop {
            ticker.tick().await;
            for profile in store.refresh() {
                if update_tx
                    .try_send(PipelineUpdate::Baseline(profile))
                    .is_err()
                {
                    warn!("baseline update dropped, channel full or closed");
                }
            }
        }
    })
}
