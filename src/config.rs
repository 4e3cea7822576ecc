use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const ENV_PREFIX: &str = "VEHICLE_TELEMETRY";
pub const CONFIG_PATH_ENV: &str = "VEHICLE_TELEMETRY_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub transport: TransportKind,
    pub kafka: KafkaConfig,
    pub simulation: SimulationConfig,
    pub aggregator: AggregatorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransportKind {
    Kafka,
    /// In-process bus; the simulator runs the aggregator itself.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaConfig {
    pub brokers: Vec<String>,
    pub client_id: String,
    pub group_id: String,
    pub topics: KafkaTopics,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KafkaTopics {
    pub position: String,
    pub total_distance: String,
    pub control: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    pub tick_interval_ms: u64,
    pub average_speed: f64,
    pub jitter: f64,
    pub waypoints_file: PathBuf,
    pub feed_path: PathBuf,
    /// Fixes the start waypoint and the jitter sequence when set.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatorConfig {
    pub report_interval_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

impl SimulationConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms.max(1))
    }
}

impl AggregatorConfig {
    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs.max(1))
    }
}

impl Config {
    /// Defaults, then the TOML file if present, then `VEHICLE_TELEMETRY__SECTION__KEY` variables.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder()
            .add_source(config::Config::try_from(&Config::default()).context("encoding defaults")?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(false));
        }

        builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("kafka.brokers")
                    .try_parsing(true),
            )
            .build()
            .context("reading configuration sources")?
            .try_deserialize()
            .context("invalid configuration")
    }

    /// Config path from the first CLI argument, then `VEHICLE_TELEMETRY_CONFIG`, then `config.toml`.
    pub fn resolve_path(cli_arg: Option<String>) -> PathBuf {
        cli_arg
            .or_else(|| std::env::var(CONFIG_PATH_ENV).ok())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            transport: TransportKind::Kafka,
            kafka: KafkaConfig {
                brokers: vec!["localhost:9092".to_string()],
                client_id: "vehicle-telemetry".to_string(),
                group_id: "vehicle-telemetry-group".to_string(),
                topics: KafkaTopics {
                    position: "position".to_string(),
                    total_distance: "totalDistance".to_string(),
                    control: "vehicle-control".to_string(),
                },
            },
            simulation: SimulationConfig {
                tick_interval_ms: 1000,
                average_speed: 0.02,
                jitter: 0.002,
                waypoints_file: PathBuf::from("resources/waypoints.json"),
                feed_path: PathBuf::from("positions.csv"),
                seed: None,
            },
            aggregator: AggregatorConfig {
                report_interval_secs: 10,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: None,
            },
        }
    }
}
