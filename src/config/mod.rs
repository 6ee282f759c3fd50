pub mod credentials;
mod raw;

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use self::credentials::CredentialSource;
use self::raw::RawConfig;
use crate::kubernetes_objects::spark_application::CustomResourceTarget;
use thiserror::Error;
use tracing::instrument;

pub use self::raw::ConfigParseError;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub credentials: CredentialSource,
    pub launch: LaunchConfig,
    pub astronauts: AstronautsConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub listen: SocketAddr,
}

#[derive(Debug, Clone)]
pub struct LaunchConfig {
    /// Path of the custom resource YAML template, read on every launch
    pub template: PathBuf,

    /// Where the custom resource is created
    pub target: CustomResourceTarget,

    /// Job names are `<name_prefix>-<YYYYMMDD-HHMMSS>`
    pub name_prefix: String,

    /// Upper bound for the create call against the cluster API
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct AstronautsConfig {
    pub url: String,
}

#[derive(Error, Debug)]
pub enum ConfigLoadError {
    #[error("Failed to read config file '{0}': {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Failed to parse config file '{0}': {1}")]
    Yaml(PathBuf, serde_yaml::Error),

    #[error("Invalid config: {0}")]
    Invalid(#[from] ConfigParseError),
}

impl Config {
    #[instrument("config/load", level = "trace")]
    pub async fn new_from_file(path: &Path) -> Result<Config, ConfigLoadError> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| ConfigLoadError::Read(path.to_path_buf(), e))?;
        Self::from_yaml_str(&text).map_err(|e| match e {
            ConfigLoadError::Yaml(_, e) => ConfigLoadError::Yaml(path.to_path_buf(), e),
            other => other,
        })
    }

    /// Config used when no file is given on the command line.
    pub fn default_config() -> Result<Config, ConfigLoadError> {
        Ok(Config::try_from(RawConfig::default())?)
    }

    pub(crate) fn from_yaml_str(text: &str) -> Result<Config, ConfigLoadError> {
        let raw: RawConfig = serde_yaml::from_str(text)
            .map_err(|e| ConfigLoadError::Yaml(PathBuf::from("<inline>"), e))?;
        Ok(Config::try_from(raw)?)
    }
}
