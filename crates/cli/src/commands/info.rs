//! `info` command implementation.

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::cli::InfoArgs;

/// Configuration info for JSON output
#[derive(Serialize)]
struct ConfigInfo {
    version: String,
    session: SessionInfo,
    sensors: Vec<SensorInfo>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    sinks: Vec<SinkInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    transport: Option<TransportInfo>,
}

#[derive(Serialize)]
struct SessionInfo {
    athlete_id: String,
    quality_floor: u8,
    latency_budget_ms: f64,
}

#[derive(Serialize)]
struct SensorInfo {
    id: String,
    channel: String,
    sample_rate_hz: f64,
    muscle: String,
    region: String,
    joint: String,
    calibrated: bool,
}

#[derive(Serialize)]
struct SinkInfo {
    name: String,
    sink_type: String,
}

#[derive(Serialize)]
struct TransportInfo {
    endpoint: String,
    heartbeat_interval_s: f64,
    compression: bool,
}

/// Execute the `info` command
pub fn run_info(args: &InfoArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration info");

    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    let blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    if args.json {
        let info = build_config_info(&blueprint, args);
        let json =
            serde_json::to_string_pretty(&info).context("Failed to serialize config info")?;
        println!("{}", json);
    } else {
        print_config_info(&blueprint, args);
    }

    Ok(())
}

fn build_config_info(blueprint: &contracts::SessionBlueprint, args: &InfoArgs) -> ConfigInfo {
    let sensors = if args.sensors {
        blueprint
            .sensors
            .iter()
            .map(|s| SensorInfo {
                id: s.id.clone(),
                channel: format!("{:?}", s.channel),
                sample_rate_hz: s.sample_rate_hz,
                muscle: format!("{:?}", s.placement.muscle),
                region: format!("{:?}", s.placement.region),
                joint: format!("{:?}", s.placement.joint),
                calibrated: s.calibration.is_some(),
            })
            .collect()
    } else {
        Vec::new()
    };

    let sinks = if args.sinks {
        blueprint
            .sinks
            .iter()
            .map(|s| SinkInfo {
                name: s.name.clone(),
                sink_type: format!("{:?}", s.sink_type),
            })
            .collect()
    } else {
        Vec::new()
    };

    let transport = blueprint.transport.as_ref().map(|t| TransportInfo {
        endpoint: t.endpoint.clone(),
        heartbeat_interval_s: t.heartbeat_interval_s,
        compression: t.compression,
    });

    ConfigInfo {
        version: format!("{:?}", blueprint.version),
        session: SessionInfo {
            athlete_id: blueprint.session.athlete_id.clone(),
            quality_floor: blueprint.session.quality_floor,
            latency_budget_ms: blueprint.session.latency_budget_ms,
        },
        sensors,
        sinks,
        transport,
    }
}

fn print_config_info(blueprint: &contracts::SessionBlueprint, args: &InfoArgs) {
    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  Biosync Configuration                       ║");
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    // Session info
    println!("🏃 Session");
    println!("   ├─ Version: {:?}", blueprint.version);
    println!("   ├─ Athlete: {}", blueprint.session.athlete_id);
    println!("   ├─ Quality floor: {}", blueprint.session.quality_floor);
    println!(
        "   └─ Latency budget: {:.0}ms",
        blueprint.session.latency_budget_ms
    );

    // Sensors
    println!("\n📡 Sensors ({})", blueprint.sensors.len());
    for (i, sensor) in blueprint.sensors.iter().enumerate() {
        let is_last = i == blueprint.sensors.len() - 1;
        let prefix = if is_last { "└─" } else { "├─" };

        if args.sensors {
            println!(
                "   {} {} ({:?}, {} Hz, {:?}/{:?}/{:?})",
                prefix,
                sensor.id,
                sensor.channel,
                sensor.sample_rate_hz,
                sensor.placement.muscle,
                sensor.placement.region,
                sensor.placement.joint
            );
        } else {
            println!(
                "   {} {} ({:?}, {} Hz)",
                prefix, sensor.id, sensor.channel, sensor.sample_rate_hz
            );
        }
    }

    // Transport
    println!("\n🔌 Transport");
    match &blueprint.transport {
        Some(transport) => {
            println!("   ├─ Endpoint: {}", transport.endpoint);
            println!("   ├─ Heartbeat: {}s", transport.heartbeat_interval_s);
            println!(
                "   ├─ Backoff: {}ms base, {}s cap, {} attempts",
                transport.backoff_base_ms, transport.backoff_cap_s, transport.max_attempts
            );
            println!("   └─ Compression: {}", transport.compression);
        }
        None => {
            println!("   └─ None (mock garment sources)");
        }
    }

    // Sinks
    if !blueprint.sinks.is_empty() {
        println!("\n📤 Sinks ({})", blueprint.sinks.len());
        for (i, sink) in blueprint.sinks.iter().enumerate() {
            let is_last = i == blueprint.sinks.len() - 1;
            let prefix = if is_last { "└─" } else { "├─" };
            if args.sinks {
                println!(
                    "   {} {} ({:?}, queue {})",
                    prefix, sink.name, sink.sink_type, sink.queue_capacity
                );
            } else {
                println!("   {} {} ({:?})", prefix, sink.name, sink.sink_type);
            }
        }
    }

    println!();
}
