//! Configuration parsing
//!
//! Supports TOML (primary) and JSON (secondary) formats.

use contracts::{PipelineError, SessionBlueprint};

/// Configuration file format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML format (recommended)
    Toml,
    /// JSON format
    Json,
}

impl ConfigFormat {
    /// Infer format from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse TOML configuration
pub fn parse_toml(content: &str) -> Result<SessionBlueprint, PipelineError> {
    toml::from_str(content).map_err(|e| PipelineError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse JSON configuration
pub fn parse_json(content: &str) -> Result<SessionBlueprint, PipelineError> {
    serde_json::from_str(content).map_err(|e| PipelineError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// Parse configuration by format
pub fn parse(content: &str, format: ConfigFormat) -> Result<SessionBlueprint, PipelineError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
[session]
athlete_id = "athlete_07"

[[sensors]]
id = "pelvis_imu"
channel = "imu"
sample_rate_hz = 200.0
[sensors.placement]
muscle = "lower_back"
region = "core"
joint = "hip"

[[sinks]]
name = "log_sink"
sink_type = "log"
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let bp = result.unwrap();
        assert_eq!(bp.session.athlete_id, "athlete_07");
        assert_eq!(bp.sensors.len(), 1);
        assert_eq!(bp.sensors[0].sample_rate_hz, 200.0);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "session": { "athlete_id": "athlete_07" },
            "sensors": [{
                "id": "calf_right_tof",
                "channel": "tof",
                "sample_rate_hz": 100.0,
                "placement": {
                    "muscle": "calves",
                    "region": "right_lower",
                    "joint": "ankle"
                }
            }],
            "sinks": [{ "name": "log", "sink_type": "log" }]
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, PipelineError::ConfigParse { .. }));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
