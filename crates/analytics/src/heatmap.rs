//! Heat-map binning and smoothing.
//!
//! Bins filtered sensor intensity into a square grid and applies one
//! horizontal smoothing pass per row. The map is fully regenerated each
//! cycle; nothing is diffed.

use contracts::{HeatMap, HeatMapCell, HeatMapConfig, SensorId};

use crate::engine::FilteredFrame;

/// Fixed 5-tap smoothing kernel (sums to 1.0)
const KERNEL: [f64; 5] = [0.1, 0.2, 0.4, 0.2, 0.1];

/// Heat map generator
#[derive(Debug, Clone)]
pub struct HeatMapGenerator {
    config: HeatMapConfig,
}

impl HeatMapGenerator {
    /// Create a generator with the given grid resolution
    pub fn new(config: HeatMapConfig) -> Self {
        Self { config }
    }

    /// Regenerate the heat map from one window of filtered frames
    pub fn generate(
        &self,
        sensor_id: &SensorId,
        timestamp: f64,
        frames: &[FilteredFrame],
    ) -> HeatMap {
        let res = self.config.resolution as usize;
        let mut sums = vec![vec![0.0f64; res]; res];
        let mut counts = vec![vec![0u32; res]; res];

        for frame in frames {
            let Some(&v0) = frame.values.first() else {
                continue;
            };
            let v1 = frame.values.get(1).copied().unwrap_or(v0);

            let x = self.grid_pos(v0);
            let y = self.grid_pos(v1);

            // Intensity is the mean of the first two dimensions, clamped
            let intensity = ((v0 + v1) / 2.0).clamp(0.0, 1.0);
            sums[y][x] += intensity;
            counts[y][x] += 1;
        }

        let mut grid = vec![vec![0.0f64; res]; res];
        for y in 0..res {
            for x in 0..res {
                if counts[y][x] > 0 {
                    grid[y][x] = sums[y][x] / counts[y][x] as f64;
                }
            }
        }

        for row in grid.iter_mut() {
            smooth_row(row);
        }

        let cells = grid
            .iter()
            .enumerate()
            .flat_map(|(y, row)| {
                row.iter().enumerate().filter_map(move |(x, &intensity)| {
                    (intensity > 0.0).then_some(HeatMapCell {
                        x: x as u32,
                        y: y as u32,
                        intensity: intensity.clamp(0.0, 1.0),
                    })
                })
            })
            .collect();

        HeatMap {
            sensor_id: sensor_id.clone(),
            timestamp,
            resolution: self.config.resolution,
            cells,
        }
    }

    /// Map a value onto the grid, clamped (never wrapped) to [0, res)
    fn grid_pos(&self, value: f64) -> usize {
        let res = self.config.resolution as i64;
        let cell = (value / self.config.resolution as f64).round() as i64;
        cell.clamp(0, res - 1) as usize
    }
}

/// One in-place horizontal smoothing pass.
///
/// Re-reads already-smoothed left neighbors during the same pass; this is the
/// intended cheap approximation, not a separable 2-D Gaussian. Edge taps
/// clamp to the row bounds.
fn smooth_row(row: &mut [f64]) {
    let len = row.len() as i64;
    for x in 0..row.len() {
        let mut acc = 0.0;
        for (k, weight) in KERNEL.iter().enumerate() {
            let idx = (x as i64 + k as i64 - 2).clamp(0, len - 1) as usize;
            acc += weight * row[idx];
        }
        row[x] = acc;
    }
}
