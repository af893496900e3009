//! Runtime configuration.
//!
//! Settings come from a TOML file (`lakehouse.toml`) with serde defaults for
//! every field, then environment overrides. A missing file is not an error:
//! every section has a usable default.
//!
//! ```toml
//! [repository]
//! type = "file"
//! path = "warehouse"
//!
//! [pipeline]
//! input_csv = "data/mta_subway_hourly_ridership.csv"
//! output_dir = "lakehouse"
//!
//! [generation]
//! line_count = 25
//! route_seed = 7
//!
//! [server]
//! port = 8080
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::db::{RepositoryType, RidesWindow};
use crate::generation::{BusNetworkConfig, DEFAULT_FAKE_SEED};
use crate::simulation::SimulationConfig;

/// Environment variable naming an explicit configuration file.
pub const CONFIG_ENV_VAR: &str = "LAKEHOUSE_CONFIG";

const SEARCH_PATHS: [&str; 3] = [
    "lakehouse.toml",
    "rust_backend/lakehouse.toml",
    "../lakehouse.toml",
];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid value '{value}' for {var}: {reason}")]
    InvalidOverride {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LakehouseConfig {
    #[serde(default)]
    pub repository: RepositorySettings,
    #[serde(default)]
    pub pipeline: PipelineSettings,
    #[serde(default)]
    pub generation: GenerationSettings,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub rides: RidesWindow,
}

/// Warehouse backend selection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositorySettings {
    #[serde(rename = "type", default)]
    pub repo_type: RepositoryType,
    /// Warehouse root for the file backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Inputs, outputs and dataset names of a pipeline run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    #[serde(default = "default_input_csv")]
    pub input_csv: PathBuf,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    #[serde(default = "default_staging_dataset")]
    pub staging_dataset: String,
    #[serde(default = "default_dataset")]
    pub dataset: String,
    #[serde(default = "default_teardown_staging")]
    pub teardown_staging: bool,
    #[serde(default = "default_rows_per_file")]
    pub rows_per_file: usize,
}

fn default_input_csv() -> PathBuf {
    PathBuf::from("data/mta_subway_hourly_ridership.csv")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("lakehouse")
}

fn default_staging_dataset() -> String {
    "ridership_lakehouse_staging".to_string()
}

fn default_dataset() -> String {
    "ridership_lakehouse".to_string()
}

fn default_teardown_staging() -> bool {
    true
}

fn default_rows_per_file() -> usize {
    1_000_000
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            input_csv: default_input_csv(),
            output_dir: default_output_dir(),
            staging_dataset: default_staging_dataset(),
            dataset: default_dataset(),
            teardown_staging: default_teardown_staging(),
            rows_per_file: default_rows_per_file(),
        }
    }
}

/// Fake data and bus network parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationSettings {
    #[serde(default = "default_fake_seed")]
    pub fake_seed: u64,
    #[serde(flatten)]
    pub network: BusNetworkConfig,
}

fn default_fake_seed() -> u64 {
    DEFAULT_FAKE_SEED
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            fake_seed: default_fake_seed(),
            network: BusNetworkConfig::default(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerSettings {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerSettings {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl LakehouseConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// First `lakehouse.toml` found in the standard locations, if any.
    pub fn from_default_location() -> Result<Option<Self>, ConfigError> {
        for candidate in SEARCH_PATHS {
            let path = PathBuf::from(candidate);
            if path.exists() {
                info!("Using configuration {}", path.display());
                return Self::from_file(&path).map(Some);
            }
        }
        Ok(None)
    }

    /// Resolve the configuration for a process.
    ///
    /// Order: `explicit` path, then `LAKEHOUSE_CONFIG`, then the standard
    /// locations, then defaults. Environment overrides apply last.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let from_env = std::env::var(CONFIG_ENV_VAR).ok().map(PathBuf::from);
        let mut config = match explicit.map(Path::to_path_buf).or(from_env) {
            Some(path) => Self::from_file(&path)?,
            None => Self::from_default_location()?.unwrap_or_else(|| {
                debug!("No configuration file found, using defaults");
                Self::default()
            }),
        };
        config.apply_overrides_from(|var| std::env::var(var).ok())?;
        Ok(config)
    }

    /// Apply `HOST`, `PORT`, `REPOSITORY_TYPE` and `REPOSITORY_PATH`.
    pub fn apply_overrides_from<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.server.port = port.parse().map_err(|e: std::num::ParseIntError| {
                ConfigError::InvalidOverride {
                    var: "PORT",
                    value: port.clone(),
                    reason: e.to_string(),
                }
            })?;
        }
        if let Some(repo_type) = lookup("REPOSITORY_TYPE") {
            self.repository.repo_type =
                repo_type
                    .parse()
                    .map_err(|reason| ConfigError::InvalidOverride {
                        var: "REPOSITORY_TYPE",
                        value: repo_type.clone(),
                        reason,
                    })?;
        }
        if let Some(path) = lookup("REPOSITORY_PATH") {
            self.repository.path = Some(PathBuf::from(path));
        }
        Ok(())
    }
}
