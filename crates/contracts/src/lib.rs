//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-crate data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Uses session-relative timestamps (seconds, f64) as primary clock,
//!   stamped by the garment edge layer before readings reach the core
//! - Reading rates are nominal: IMU 200 Hz, ToF 100 Hz

mod alert;
mod anomaly;
mod baseline;
mod blueprint;
mod calibration;
mod config;
mod error;
mod heatmap;
mod metrics;
mod reading;
mod sensor_id;
mod sink;
mod source;
mod update;

pub use alert::*;
pub use anomaly::*;
pub use baseline::*;
pub use blueprint::*;
pub use calibration::*;
pub use config::*;
pub use error::*;
pub use heatmap::*;
pub use metrics::*;
pub use reading::*;
pub use sensor_id::SensorId;
pub use sink::*;
pub use source::{SensorDataCallback, SensorSource};
pub use update::*;
