//! # Config Loader
//!
//! Configuration loading and parsing module.
//!
//! Responsibilities:
//! - Parse TOML/JSON configuration files
//! - Validate configuration legality
//! - Generate `SessionBlueprint`
//!
//! # Example
//!
//! ```no_run
//! use config_loader::ConfigLoader;
//! use std::path::Path;
//!
//! let blueprint = ConfigLoader::load_from_path(Path::new("session.toml")).unwrap();
//! println!("Athlete: {}", blueprint.session.athlete_id);
//! ```

mod parser;
mod validator;

pub use contracts::SessionBlueprint;
pub use parser::ConfigFormat;

use contracts::PipelineError;
use std::path::Path;

/// Configuration loader
///
/// Provides static methods to load configuration from files or strings.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from file path
    ///
    /// Automatically detects format from file extension (.toml / .json).
    ///
    /// # Errors
    /// - File read failure
    /// - Unsupported format
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_path(path: &Path) -> Result<SessionBlueprint, PipelineError> {
        let format = Self::detect_format(path)?;
        let content = Self::read_file(path)?;
        Self::load_from_str(&content, format)
    }

    /// Load configuration from string
    ///
    /// # Errors
    /// - Parse failure
    /// - Validation failure
    pub fn load_from_str(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SessionBlueprint, PipelineError> {
        Self::parse_and_validate(content, format)
    }

    /// Serialize SessionBlueprint to TOML string
    pub fn to_toml(blueprint: &SessionBlueprint) -> Result<String, PipelineError> {
        toml::to_string_pretty(blueprint)
            .map_err(|e| PipelineError::config_parse(format!("TOML serialize error: {e}")))
    }

    /// Serialize SessionBlueprint to JSON string
    pub fn to_json(blueprint: &SessionBlueprint) -> Result<String, PipelineError> {
        serde_json::to_string_pretty(blueprint)
            .map_err(|e| PipelineError::config_parse(format!("JSON serialize error: {e}")))
    }
}

impl ConfigLoader {
    /// Infer configuration format from file extension
    fn detect_format(path: &Path) -> Result<ConfigFormat, PipelineError> {
        let ext = path.extension().and_then(|e| e.to_str()).ok_or_else(|| {
            PipelineError::config_parse("cannot determine file format from extension")
        })?;

        ConfigFormat::from_extension(ext).ok_or_else(|| {
            PipelineError::config_parse(format!("unsupported config format: .{ext}"))
        })
    }

    /// Read configuration file content
    fn read_file(path: &Path) -> Result<String, PipelineError> {
        Ok(std::fs::read_to_string(path)?)
    }

    /// Parse and validate configuration content
    fn parse_and_validate(
        content: &str,
        format: ConfigFormat,
    ) -> Result<SessionBlueprint, PipelineError> {
        let blueprint = parser::parse(content, format)?;
        validator::validate(&blueprint)?;
        Ok(blueprint)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL_TOML: &str = r#"
[session]
athlete_id = "athlete_07"

[[sensors]]
id = "quad_left_imu"
channel = "imu"
sample_rate_hz = 200.0
[sensors.placement]
muscle = "quadriceps"
region = "left_lower"
joint = "knee"

[[sensors]]
id = "quad_left_tof"
channel = "tof"
sample_rate_hz = 100.0
[sensors.placement]
muscle = "quadriceps"
region = "left_lower"
joint = "knee"

[[sinks]]
name = "log_sink"
sink_type = "log"
"#;

    #[test]
    fn test_load_from_str_toml() {
        let result = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.session.athlete_id, "athlete_07");
        assert_eq!(bp.session.quality_floor, 50);
    }

    #[test]
    fn test_round_trip_toml() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let serialized = ConfigLoader::to_toml(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&serialized, ConfigFormat::Toml).unwrap();
        assert_eq!(bp.session.athlete_id, bp2.session.athlete_id);
        assert_eq!(bp.sensors.len(), bp2.sensors.len());
        assert_eq!(bp.sensors[0].id, bp2.sensors[0].id);
    }

    #[test]
    fn test_round_trip_json() {
        let bp = ConfigLoader::load_from_str(MINIMAL_TOML, ConfigFormat::Toml).unwrap();
        let json = ConfigLoader::to_json(&bp).unwrap();
        let bp2 = ConfigLoader::load_from_str(&json, ConfigFormat::Json).unwrap();
        assert_eq!(bp.session.athlete_id, bp2.session.athlete_id);
    }

    #[test]
    fn test_validation_runs_after_parse() {
        // Duplicate sensor id should fail validation
        let content = r#"
[session]
athlete_id = "athlete_07"

[[sensors]]
id = "quad_left_imu"
channel = "imu"
sample_rate_hz = 200.0
[sensors.placement]
muscle = "quadriceps"
region = "left_lower"
joint = "knee"

[[sensors]]
id = "quad_left_imu"
channel = "tof"
sample_rate_hz = 100.0
[sensors.placement]
muscle = "quadriceps"
region = "left_lower"
joint = "knee"

[[sinks]]
name = "log"
sink_type = "log"
"#;
        let result = ConfigLoader::load_from_str(content, ConfigFormat::Toml);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("duplicate"));
    }
}
