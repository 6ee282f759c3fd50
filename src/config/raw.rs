use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use super::credentials::CredentialSource;
use super::{AstronautsConfig, Config, LaunchConfig, ServerConfig};
use crate::kubernetes_objects::spark_application::CustomResourceTarget;
use crate::launcher::job_name::TIMESTAMP_SUFFIX_LEN;
use duration_string::DurationString;
use serde::Deserialize;
use thiserror::Error;

/// Longest name the API server accepts for the resource.
const MAX_RESOURCE_NAME_LEN: usize = 63;

const DEFAULT_LAUNCH_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub(super) struct RawConfig {
    pub(super) server: RawServer,
    pub(super) credentials: CredentialSource,
    pub(super) launch: RawLaunch,
    pub(super) astronauts: RawAstronauts,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub(super) struct RawServer {
    pub(super) listen: String,
}

impl Default for RawServer {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:8000".to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub(super) struct RawLaunch {
    pub(super) template: PathBuf,
    pub(super) namespace: String,
    pub(super) group: String,
    pub(super) version: String,
    pub(super) kind: String,
    pub(super) plural: String,
    pub(super) name_prefix: String,

    /// Example: "30s", "2m"
    pub(super) timeout: Option<DurationString>,
}

impl Default for RawLaunch {
    fn default() -> Self {
        Self {
            template: PathBuf::from("manifests/spark-template.yaml"),
            namespace: "default".to_string(),
            group: "sparkoperator.k8s.io".to_string(),
            version: "v1beta2".to_string(),
            kind: "SparkApplication".to_string(),
            plural: "sparkapplications".to_string(),
            name_prefix: "spark-astronauts".to_string(),
            timeout: None,
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub(super) struct RawAstronauts {
    pub(super) url: String,
}

impl Default for RawAstronauts {
    fn default() -> Self {
        Self {
            url: "http://api.open-notify.org/astros.json".to_string(),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigParseError {
    #[error("'{value}' is not a valid listen address: {source}")]
    InvalidListenAddress {
        value: String,
        source: std::net::AddrParseError,
    },

    #[error("'{field}' must not be empty")]
    EmptyField { field: &'static str },

    #[error(
        "Job name prefix '{prefix}' must start with a lowercase letter, contain only lowercase letters, digits and '-', and be at most {max} characters long"
    )]
    InvalidNamePrefix { prefix: String, max: usize },

    #[error("Launch timeout must be greater than zero")]
    ZeroTimeout,
}

impl TryFrom<RawConfig> for Config {
    type Error = ConfigParseError;
    fn try_from(raw: RawConfig) -> Result<Self, Self::Error> {
        let listen = raw.server.listen.parse::<SocketAddr>().map_err(|source| {
            ConfigParseError::InvalidListenAddress {
                value: raw.server.listen.clone(),
                source,
            }
        })?;

        let launch = raw.launch;
        for (field, value) in [
            ("launch.namespace", &launch.namespace),
            ("launch.group", &launch.group),
            ("launch.version", &launch.version),
            ("launch.kind", &launch.kind),
            ("launch.plural", &launch.plural),
        ] {
            if value.is_empty() {
                return Err(ConfigParseError::EmptyField { field });
            }
        }
        if launch.template.as_os_str().is_empty() {
            return Err(ConfigParseError::EmptyField {
                field: "launch.template",
            });
        }
        validate_name_prefix(&launch.name_prefix)?;

        let timeout = launch
            .timeout
            .map(Duration::from)
            .unwrap_or(DEFAULT_LAUNCH_TIMEOUT);
        if timeout.is_zero() {
            return Err(ConfigParseError::ZeroTimeout);
        }

        if raw.astronauts.url.is_empty() {
            return Err(ConfigParseError::EmptyField {
                field: "astronauts.url",
            });
        }

        Ok(Config {
            server: ServerConfig { listen },
            credentials: raw.credentials,
            launch: LaunchConfig {
                template: launch.template,
                target: CustomResourceTarget {
                    group: launch.group,
                    version: launch.version,
                    kind: launch.kind,
                    plural: launch.plural,
                    namespace: launch.namespace,
                },
                name_prefix: launch.name_prefix,
                timeout,
            },
            astronauts: AstronautsConfig {
                url: raw.astronauts.url,
            },
        })
    }
}

fn validate_name_prefix(prefix: &str) -> Result<(), ConfigParseError> {
    let max = MAX_RESOURCE_NAME_LEN - TIMESTAMP_SUFFIX_LEN;
    let valid = prefix.len() <= max
        && prefix.starts_with(|c: char| c.is_ascii_lowercase())
        && prefix
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ConfigParseError::InvalidNamePrefix {
            prefix: prefix.to_string(),
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<Config, ConfigParseError> {
        let raw: RawConfig = serde_yaml::from_str(yaml).unwrap();
        Config::try_from(raw)
    }

    #[test]
    fn test_raw_config_omitted_sections_use_defaults() {
        let config = parse("{}").unwrap();
        assert_eq!(config.launch.target.plural, "sparkapplications");
        assert_eq!(config.launch.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_raw_config_full() {
        let config = parse(
            r#"
            server:
              listen: "[::1]:8080"
            credentials:
              source: kubeconfig
              context: kind-dev
            launch:
              template: /templates/pi.yaml
              namespace: batch
              group: example.io
              version: v1
              kind: BatchRun
              plural: batchruns
              name_prefix: nightly-pi
              timeout: 2m
            astronauts:
              url: http://localhost:1234/astros.json
            "#,
        )
        .unwrap();

        assert_eq!(config.server.listen, "[::1]:8080".parse::<SocketAddr>().unwrap());
        assert!(matches!(
            config.credentials,
            CredentialSource::Kubeconfig { path: None, context: Some(ref c) } if c == "kind-dev"
        ));
        assert_eq!(config.launch.template, PathBuf::from("/templates/pi.yaml"));
        assert_eq!(
            config.launch.target,
            CustomResourceTarget {
                group: "example.io".to_string(),
                version: "v1".to_string(),
                kind: "BatchRun".to_string(),
                plural: "batchruns".to_string(),
                namespace: "batch".to_string(),
            }
        );
        assert_eq!(config.launch.name_prefix, "nightly-pi");
        assert_eq!(config.launch.timeout, Duration::from_secs(120));
        assert_eq!(config.astronauts.url, "http://localhost:1234/astros.json");
    }

    #[test]
    fn test_raw_config_rejects_unknown_fields() {
        let result: Result<RawConfig, _> = serde_yaml::from_str("launch:\n  namspace: typo\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_raw_config_rejects_empty_namespace() {
        let err = parse("launch:\n  namespace: ''\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigParseError::EmptyField {
                field: "launch.namespace"
            }
        ));
    }

    #[test]
    fn test_raw_config_rejects_bad_name_prefix() {
        for prefix in ["Spark", "1spark", "spark_job", ""] {
            let err = parse(&format!("launch:\n  name_prefix: '{prefix}'\n")).unwrap_err();
            assert!(
                matches!(err, ConfigParseError::InvalidNamePrefix { .. }),
                "prefix '{prefix}' should be rejected"
            );
        }
    }

    #[test]
    fn test_raw_config_name_prefix_length_limit() {
        let longest = format!("a{}", "b".repeat(46));
        assert!(parse(&format!("launch:\n  name_prefix: {longest}\n")).is_ok());

        let too_long = format!("{longest}c");
        let err = parse(&format!("launch:\n  name_prefix: {too_long}\n")).unwrap_err();
        assert!(matches!(
            err,
            ConfigParseError::InvalidNamePrefix { max: 47, .. }
        ));
    }

    #[test]
    fn test_raw_config_rejects_zero_timeout() {
        let err = parse("launch:\n  timeout: 0s\n").unwrap_err();
        assert!(matches!(err, ConfigParseError::ZeroTimeout));
    }
}
