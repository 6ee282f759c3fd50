use std::sync::Arc;

use self::cli::{Cli, SubCommands};
use self::config::credentials::CredentialError;
use self::launcher::Launcher;
use self::launcher::job_name::SystemClock;
use self::launcher::submitter::KubeSubmitter;
use self::shutdown::Shutdown;
use clap::Parser;
use thiserror::Error;
use tracing::info;
use tracing_error::ExtractSpanTrace;
use tracing_error::SpanTrace;

pub mod astronauts;
pub mod cli;
pub mod config;
pub mod error;
pub mod kubernetes_objects;
pub mod launcher;
pub mod server;
pub(crate) mod shutdown;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Failed to load config.\n{0}")]
    ConfigError(#[from] config::ConfigLoadError),

    #[error("Failed to initialize kubernetes client.\n{0}")]
    KubeClientError(#[from] CredentialError),

    #[error("HTTP server stopped due to following error:\n{0}")]
    ServerError(#[from] std::io::Error),

    #[error("Failed to fetch people in space:\n{0}")]
    FetchError(#[from] astronauts::FetchError),
}

impl ExtractSpanTrace for AppError {
    fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            AppError::KubeClientError(e) => e.span_trace(),
            AppError::FetchError(e) => e.span_trace(),
            _ => None,
        }
    }
}

pub async fn app() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => config::Config::new_from_file(path).await?,
        None => config::Config::default_config()?,
    };

    info!("Config Loaded.");

    match cli.subcommand {
        SubCommands::Serve {} => {
            let client = config.credentials.connect().await?;

            info!("Kubernetes Client Initialized.");

            let submitter = KubeSubmitter::new(client, &config.launch.target);
            let launcher = Launcher::new(
                config.launch.clone(),
                Arc::new(submitter),
                Arc::new(SystemClock),
            );
            server::serve(config.server.listen, Arc::new(launcher), Shutdown::new()).await?;
        }
        SubCommands::Astronauts {} => {
            astronauts::run(&config.astronauts).await?;
        }
    }

    Ok(())
}
