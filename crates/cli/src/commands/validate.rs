//! `validate` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::ValidateArgs;

/// Validation result for JSON output
#[derive(Serialize)]
struct ValidationResult {
    valid: bool,
    config_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    warnings: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<ConfigSummary>,
}

#[derive(Serialize)]
struct ConfigSummary {
    version: String,
    athlete_id: String,
    sensor_count: usize,
    imu_count: usize,
    tof_count: usize,
    sink_count: usize,
    transport: bool,
}

/// Execute the `validate` command
pub fn run_validate(args: &ValidateArgs) -> Result<()> {
    info!(config = %args.config.display(), "Validating configuration");

    let result = validate_config(args);

    if args.json {
        let json = serde_json::to_string_pretty(&result)
            .context("Failed to serialize validation result")?;
        println!("{}", json);
    } else {
        print_validation_result(&result);
    }

    if result.valid {
        Ok(())
    } else {
        anyhow::bail!("Configuration validation failed")
    }
}

fn validate_config(args: &ValidateArgs) -> ValidationResult {
    let config_path = args.config.display().to_string();

    // Check file exists
    if !args.config.exists() {
        return ValidationResult {
            valid: false,
            config_path,
            error: Some(format!("File not found: {}", args.config.display())),
            warnings: None,
            summary: None,
        };
    }

    // Try to load and validate
    match config_loader::ConfigLoader::load_from_path(&args.config) {
        Ok(blueprint) => {
            let warnings = collect_warnings(&blueprint);
            let imu_count = blueprint
                .sensors
                .iter()
                .filter(|s| s.channel == contracts::SensorChannel::Imu)
                .count();

            ValidationResult {
                valid: true,
                config_path,
                error: None,
                warnings: if warnings.is_empty() {
                    None
                } else {
                    Some(warnings)
                },
                summary: Some(ConfigSummary {
                    version: format!("{:?}", blueprint.version),
                    athlete_id: blueprint.session.athlete_id.clone(),
                    sensor_count: blueprint.sensors.len(),
                    imu_count,
                    tof_count: blueprint.sensors.len() - imu_count,
                    sink_count: blueprint.sinks.len(),
                    transport: blueprint.transport.is_some(),
                }),
            }
        }
        Err(e) => ValidationResult {
            valid: false,
            config_path,
            error: Some(e.to_string()),
            warnings: None,
            summary: None,
        },
    }
}

/// Collect configuration warnings (non-fatal issues)
fn collect_warnings(blueprint: &contracts::SessionBlueprint) -> Vec<String> {
    let mut warnings = Vec::new();

    // Check for empty sinks
    if blueprint.sinks.is_empty() {
        warnings.push("No sinks configured - pipeline updates will be dropped".to_string());
    }

    // Sensors running well below their channel's nominal rate
    for sensor in &blueprint.sensors {
        let nominal = sensor.channel.nominal_rate_hz();
        if sensor.sample_rate_hz < nominal / 2.0 {
            warnings.push(format!(
                "Sensor '{}' samples at {} Hz, well below the {} Hz nominal rate",
                sensor.id, sensor.sample_rate_hz, nominal
            ));
        }
    }

    // A permissive quality floor lets noisy readings through
    if blueprint.session.quality_floor < 25 {
        warnings.push(format!(
            "quality_floor {} is permissive - noisy readings will reach the filter",
            blueprint.session.quality_floor
        ));
    }

    warnings
}


fn print_validation_result(result: &ValidationResult) {
    if result.valid {
        println!("✓ Configuration is valid: {}", result.config_path);

        if let Some(ref summary) = result.summary {
            println!("\n  Version: {}", summary.version);
            println!("  Athlete: {}", summary.athlete_id);
            println!(
                "  Sensors: {} ({} IMU, {} ToF)",
                summary.sensor_count, summary.imu_count, summary.tof_count
            );
            println!("  Sinks: {}", summary.sink_count);
            println!(
                "  Transport: {}",
                if summary.transport { "yes" } else { "mock" }
            );
        }

        if let Some(ref warnings) = result.warnings {
            println!("\n⚠ Warnings:");
            for warning in warnings {
                println!("  - {}", warning);
            }
        }
    } else {
        println!("✗ Configuration is invalid: {}", result.config_path);
        if let Some(ref error) = result.error {
            println!("\n  Error: {}", error);
        }
    }
}
