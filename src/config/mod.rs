use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

use crate::segmentation::{DatasetLayout, ModelOptions, StatisticsSource};

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub model: ModelConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("APP_LOG_FORMAT") {
            Ok(value) => LogFormat::parse(&value).ok_or(ConfigError::InvalidLogFormat(value))?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
            model: ModelConfig::from_env()?,
        })
    }
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" | "text" => Some(Self::Compact),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

/// Historical dataset location and clustering parameters.
#[derive(Debug, Clone)]
pub struct ModelConfig {
    pub dataset_path: PathBuf,
    pub label_column: String,
    pub cluster_column: String,
    pub cluster_count: Option<usize>,
    pub seed: u64,
    pub restarts: usize,
    pub statistics_source: StatisticsSource,
}

impl ModelConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = ModelOptions::default();
        let layout = DatasetLayout::default();

        let dataset_path = env::var("APP_DATASET_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("credit_risk_with_clusters.csv"));
        let label_column = env::var("APP_LABEL_COLUMN").unwrap_or(layout.label_column);
        let cluster_column = env::var("APP_CLUSTER_COLUMN").unwrap_or(layout.cluster_column);

        let cluster_count = match env::var("APP_CLUSTER_COUNT") {
            Ok(value) if !value.trim().is_empty() => Some(
                value
                    .trim()
                    .parse::<usize>()
                    .map_err(|_| ConfigError::InvalidClusterCount)?,
            ),
            _ => None,
        };
        let seed = match env::var("APP_MODEL_SEED") {
            Ok(value) => value
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidSeed)?,
            Err(_) => defaults.seed,
        };
        let restarts = match env::var("APP_MODEL_RESTARTS") {
            Ok(value) => value
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|restarts| *restarts > 0)
                .ok_or(ConfigError::InvalidRestarts)?,
            Err(_) => defaults.restarts,
        };
        let statistics_source = match env::var("APP_STATS_SOURCE") {
            Ok(value) => StatisticsSource::parse(&value)
                .ok_or(ConfigError::InvalidStatisticsSource(value))?,
            Err(_) => defaults.statistics_source,
        };

        Ok(Self {
            dataset_path,
            label_column,
            cluster_column,
            cluster_count,
            seed,
            restarts,
            statistics_source,
        })
    }

    pub fn dataset_layout(&self) -> DatasetLayout {
        DatasetLayout {
            label_column: self.label_column.clone(),
            cluster_column: self.cluster_column.clone(),
        }
    }

    pub fn model_options(&self) -> ModelOptions {
        ModelOptions {
            cluster_count: self.cluster_count,
            seed: self.seed,
            restarts: self.restarts,
            statistics_source: self.statistics_source,
            ..ModelOptions::default()
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLogFormat(String),
    InvalidClusterCount,
    InvalidSeed,
    InvalidRestarts,
    InvalidStatisticsSource(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "APP_LOG_FORMAT must be 'compact' or 'json' (got '{value}')")
            }
            ConfigError::InvalidClusterCount => {
                write!(f, "APP_CLUSTER_COUNT must be a non-negative integer")
            }
            ConfigError::InvalidSeed => write!(f, "APP_MODEL_SEED must be a valid u64"),
            ConfigError::InvalidRestarts => {
                write!(f, "APP_MODEL_RESTARTS must be a positive integer")
            }
            ConfigError::InvalidStatisticsSource(value) => write!(
                f,
                "APP_STATS_SOURCE must be 'model' or 'dataset' (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            _ => None,
        }
    }
}
