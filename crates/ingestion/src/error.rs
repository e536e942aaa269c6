//! Ingestion error types

use thiserror::Error;

/// Ingestion errors
#[derive(Debug, Error)]
pub enum IngestionError {
    /// Reading failed validation
    #[error("reading rejected for sensor {sensor_id}: {message}")]
    Rejected {
        /// Sensor ID
        sensor_id: String,
        /// Rejection reason
        message: String,
    },

    /// Channel closed
    #[error("channel closed for sensor {sensor_id}")]
    ChannelClosed {
        /// Sensor ID
        sensor_id: String,
    },

    /// Source not listening
    #[error("sensor {sensor_id} is not listening")]
    SensorNotListening {
        /// Sensor ID
        sensor_id: String,
    },

    /// Source already listening
    #[error("sensor {sensor_id} is already listening")]
    AlreadyListening {
        /// Sensor ID
        sensor_id: String,
    },
}

/// Ingestion Result type alias
pub type Result<T> = std::result::Result<T, IngestionError>;
