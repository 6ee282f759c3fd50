//! How the service authenticates against the cluster control plane.
//!
//! The source is chosen in config and resolved once at startup into a
//! [`kube::Client`]; requests never touch credentials again.

use std::path::PathBuf;

use kube::Client;
use kube::config::{InClusterError, KubeConfigOptions, Kubeconfig, KubeconfigError};
use serde::Deserialize;
use serde_json::json;
use thiserror::Error;
use tracing::{info, instrument};
use tracing_error::{ExtractSpanTrace, SpanTrace};

use crate::error::{SpannedErr, SpannedExt};

const TOKEN_CLUSTER_NAME: &str = "explicit";

#[derive(Deserialize, Clone, Default)]
#[serde(tag = "source", rename_all = "kebab-case")]
pub enum CredentialSource {
    /// Service account token and CA mounted into the pod
    #[default]
    InCluster,

    /// A kubeconfig file; `$KUBECONFIG` or `~/.kube/config` when no path is given
    Kubeconfig {
        #[serde(default)]
        path: Option<PathBuf>,
        #[serde(default)]
        context: Option<String>,
    },

    /// Explicit API server URL and bearer token
    Token {
        server: String,
        token: String,
        #[serde(default)]
        certificate_authority: Option<PathBuf>,
        #[serde(default)]
        insecure_skip_tls_verify: bool,
    },
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialSource::InCluster => f.write_str("InCluster"),
            CredentialSource::Kubeconfig { path, context } => f
                .debug_struct("Kubeconfig")
                .field("path", path)
                .field("context", context)
                .finish(),
            CredentialSource::Token {
                server,
                certificate_authority,
                insecure_skip_tls_verify,
                ..
            } => f
                .debug_struct("Token")
                .field("server", server)
                .field("token", &"<redacted>")
                .field("certificate_authority", certificate_authority)
                .field("insecure_skip_tls_verify", insecure_skip_tls_verify)
                .finish(),
        }
    }
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("In-cluster credentials are unavailable: {0}")]
    InCluster(SpannedErr<InClusterError>),

    #[error("Failed to load kubeconfig: {0}")]
    Kubeconfig(SpannedErr<KubeconfigError>),

    #[error("Failed to build kubernetes client: {0}")]
    Client(SpannedErr<kube::Error>),
}

impl ExtractSpanTrace for CredentialError {
    fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            CredentialError::InCluster(e) => e.span_trace(),
            CredentialError::Kubeconfig(e) => e.span_trace(),
            CredentialError::Client(e) => e.span_trace(),
        }
    }
}

impl CredentialSource {
    /// Short label used in logs.
    pub fn label(&self) -> &'static str {
        match self {
            CredentialSource::InCluster => "in-cluster",
            CredentialSource::Kubeconfig { .. } => "kubeconfig",
            CredentialSource::Token { .. } => "token",
        }
    }

    #[instrument("credentials/load_config", skip(self), fields(source = self.label()))]
    pub async fn load_config(&self) -> Result<kube::Config, CredentialError> {
        match self {
            CredentialSource::InCluster => kube::Config::incluster()
                .with_span_trace()
                .map_err(CredentialError::InCluster),
            CredentialSource::Kubeconfig { path, context } => {
                let options = KubeConfigOptions {
                    context: context.clone(),
                    ..Default::default()
                };
                match path {
                    Some(path) => {
                        let kubeconfig = Kubeconfig::read_from(path)
                            .with_span_trace()
                            .map_err(CredentialError::Kubeconfig)?;
                        kube::Config::from_custom_kubeconfig(kubeconfig, &options)
                            .await
                            .with_span_trace()
                            .map_err(CredentialError::Kubeconfig)
                    }
                    None => kube::Config::from_kubeconfig(&options)
                        .await
                        .with_span_trace()
                        .map_err(CredentialError::Kubeconfig),
                }
            }
            CredentialSource::Token {
                server,
                token,
                certificate_authority,
                insecure_skip_tls_verify,
            } => {
                let kubeconfig = token_kubeconfig(
                    server,
                    token,
                    certificate_authority.as_ref(),
                    *insecure_skip_tls_verify,
                )?;
                kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
                    .await
                    .with_span_trace()
                    .map_err(CredentialError::Kubeconfig)
            }
        }
    }

    pub async fn connect(&self) -> Result<Client, CredentialError> {
        let config = self.load_config().await?;
        info!(
            "Using {} credentials for cluster '{}'.",
            self.label(),
            config.cluster_url
        );
        Client::try_from(config)
            .with_span_trace()
            .map_err(CredentialError::Client)
    }
}

fn token_kubeconfig(
    server: &str,
    token: &str,
    certificate_authority: Option<&PathBuf>,
    insecure_skip_tls_verify: bool,
) -> Result<Kubeconfig, CredentialError> {
    let kubeconfig = json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": TOKEN_CLUSTER_NAME,
            "cluster": {
                "server": server,
                "certificate-authority": certificate_authority,
                "insecure-skip-tls-verify": insecure_skip_tls_verify,
            }
        }],
        "users": [{
            "name": TOKEN_CLUSTER_NAME,
            "user": { "token": token }
        }],
        "contexts": [{
            "name": TOKEN_CLUSTER_NAME,
            "context": { "cluster": TOKEN_CLUSTER_NAME, "user": TOKEN_CLUSTER_NAME }
        }],
        "current-context": TOKEN_CLUSTER_NAME,
    });
    // JSON is valid YAML, so the kubeconfig parser takes it as is.
    Kubeconfig::from_yaml(&kubeconfig.to_string())
        .with_span_trace()
        .map_err(CredentialError::Kubeconfig)
}
