//! Layered error definitions
//!
//! Categorized by source: validation / processing / transport / resource

use thiserror::Error;

/// Unified error type
///
/// Nothing in the core pipeline is fatal to the process: validation errors
/// drop the offending input, processing errors skip a cycle, transport errors
/// are retried, resource errors are resolved by eviction.
#[derive(Debug, Error)]
pub enum PipelineError {
    // ===== Validation Errors (rejected at ingress) =====
    /// Malformed or out-of-range reading
    #[error("invalid reading from sensor '{sensor_id}': {message}")]
    InvalidReading { sensor_id: String, message: String },

    /// Calibration parameter outside its permitted range
    #[error("calibration rejected at '{field}': {message}")]
    CalibrationRange { field: String, message: String },

    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Processing Errors (skip the cycle, retain prior state) =====
    /// Numerically degenerate input (e.g. empty window)
    #[error("processing error in {stage} for sensor '{sensor_id}': {message}")]
    Processing {
        stage: String,
        sensor_id: String,
        message: String,
    },

    // ===== Transport Errors (retried per reconnect policy) =====
    /// Connection establishment failed
    #[error("transport connect error to {endpoint}: {message}")]
    TransportConnect { endpoint: String, message: String },

    /// Send/encode failure on an established link
    #[error("transport send error: {message}")]
    TransportSend { message: String },

    /// Retry budget exhausted; link is terminally down
    #[error("transport gave up after {attempts} attempts")]
    TransportExhausted { attempts: u32 },

    // ===== Resource Errors (resolved by eviction) =====
    /// Bounded queue or buffer saturated
    #[error("resource '{resource}' full: depth={depth}, max={max}")]
    ResourceFull {
        resource: String,
        depth: usize,
        max: usize,
    },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl PipelineError {
    /// Create an invalid-reading error
    pub fn invalid_reading(sensor_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidReading {
            sensor_id: sensor_id.into(),
            message: message.into(),
        }
    }

    /// Create a calibration range error
    pub fn calibration_range(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::CalibrationRange {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a processing error
    pub fn processing(
        stage: impl Into<String>,
        sensor_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Processing {
            stage: stage.into(),
            sensor_id: sensor_id.into(),
            message: message.into(),
        }
    }

    /// Create a sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// True for errors that are rejected at ingress rather than retried
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::InvalidReading { .. }
                | Self::CalibrationRange { .. }
                | Self::ConfigParse { .. }
                | Self::ConfigValidation { .. }
        )
    }
}
