//! Server configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::cache::PlanCacheConfig;
use crate::network::{HttpSource, HttpSourceConfig, JsonFileSource, Source, SourceError};
use crate::planner::{PlannerConfig, TransferPenalty};

/// Where the stop network comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceConfig {
    /// HTTP repository at this base URL.
    Http {
        base_url: String,
        api_key: Option<String>,
    },
    /// `stops.json`/`edges.json`/`routes.json` in this directory.
    Files { dir: PathBuf },
}

impl SourceConfig {
    /// Create the configured source.
    pub fn build(&self) -> Result<Source, SourceError> {
        match self {
            SourceConfig::Http { base_url, api_key } => {
                let mut config = HttpSourceConfig::new(base_url.clone());
                if let Some(key) = api_key {
                    config = config.with_api_key(key.clone());
                }
                Ok(Source::Http(HttpSource::new(config)?))
            }
            SourceConfig::Files { dir } => Ok(Source::Files(JsonFileSource::new(dir.clone()))),
        }
    }
}

/// Error reading configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}: {message}")]
    Invalid { var: &'static str, message: String },
}

impl ConfigError {
    fn invalid(var: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            var,
            message: message.into(),
        }
    }
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub source: SourceConfig,
    pub planner: PlannerConfig,
    pub cache: PlanCacheConfig,
    /// How often the background task rebuilds the snapshot.
    pub refresh_interval: Duration,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = match get("TRANSIT_BIND_ADDR") {
            Some(addr) => addr
                .parse()
                .map_err(|e| ConfigError::invalid("TRANSIT_BIND_ADDR", format!("{e}")))?,
            None => SocketAddr::from(([127, 0, 0, 1], 3000)),
        };

        let source = match get("TRANSIT_DATA_URL") {
            Some(base_url) => SourceConfig::Http {
                base_url,
                api_key: get("TRANSIT_API_KEY"),
            },
            None => SourceConfig::Files {
                dir: get("TRANSIT_DATA_DIR").map_or("data".into(), PathBuf::from),
            },
        };

        let transfer_penalty = match get("TRANSIT_TRANSFER_PENALTY") {
            Some(raw) => {
                let var = "TRANSIT_TRANSFER_PENALTY";
                let value: f64 = raw
                    .parse()
                    .map_err(|_| ConfigError::invalid(var, format!("not a number: {raw}")))?;
                TransferPenalty::new(value)
                    .map_err(|e| ConfigError::invalid(var, e.to_string()))?
            }
            None => TransferPenalty::default(),
        };

        let require_distinct = parse_flag(&get, "TRANSIT_REQUIRE_DISTINCT", true)?;

        let refresh_secs = parse_u64(&get, "TRANSIT_REFRESH_SECS", 3600)?;
        if refresh_secs == 0 {
            return Err(ConfigError::invalid("TRANSIT_REFRESH_SECS", "must be at least 1"));
        }

        let cache = PlanCacheConfig {
            ttl: Duration::from_secs(parse_u64(&get, "TRANSIT_CACHE_TTL_SECS", 300)?),
            max_capacity: parse_u64(&get, "TRANSIT_CACHE_CAPACITY", 10_000)?,
        };

        Ok(Self {
            bind_addr,
            source,
            planner: PlannerConfig::new(transfer_penalty, require_distinct),
            cache,
            refresh_interval: Duration::from_secs(refresh_secs),
        })
    }
}

fn parse_u64(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: u64,
) -> Result<u64, ConfigError> {
    match get(var) {
        Some(raw) => raw
            .parse()
            .map_err(|_| ConfigError::invalid(var, format!("not a whole number: {raw}"))),
        None => Ok(default),
    }
}

fn parse_flag(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: bool,
) -> Result<bool, ConfigError> {
    match get(var) {
        Some(raw) => parse_bool(&raw)
            .ok_or_else(|| ConfigError::invalid(var, format!("not a boolean: {raw}"))),
        None => Ok(default),
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
