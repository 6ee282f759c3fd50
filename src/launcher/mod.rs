pub mod job_name;
pub mod submitter;

use std::sync::Arc;
use std::time::Duration;

use derive_debug::Dbg;
use thiserror::Error;
use tracing::field::Empty;
use tracing::{Span, info, instrument, warn};
use tracing_error::{ExtractSpanTrace, SpanTrace};

use self::job_name::{Clock, JobName};
use self::submitter::CustomObjectSubmitter;
use crate::config::LaunchConfig;
use crate::error::{SpannedErr, SpannedExt};
use crate::kubernetes_objects::spark_application::{JobTemplate, TemplateError};

/// Outcome of a create call that the API server accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub job_name: JobName,
    pub status: SubmissionStatus,
}

/// Only reflects the create call, not what the operator does afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionStatus {
    Created,
}

impl SubmissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionStatus::Created => "created",
        }
    }
}

#[derive(Error, Debug)]
pub enum LaunchError {
    #[error("Job template could not be loaded: {0}")]
    Template(#[from] SpannedErr<TemplateError>),

    #[error("Cluster API rejected or failed to create '{0}': {1}")]
    ClusterApi(JobName, SpannedErr<kube::Error>),

    #[error("Cluster API did not answer within {1:?} while creating '{0}'")]
    Timeout(JobName, Duration, SpanTrace),
}

impl ExtractSpanTrace for LaunchError {
    fn span_trace(&self) -> Option<&SpanTrace> {
        match self {
            LaunchError::Template(e) => e.span_trace(),
            LaunchError::ClusterApi(_, e) => e.span_trace(),
            LaunchError::Timeout(_, _, span_trace) => Some(span_trace),
        }
    }
}

/// Turns the configured template into a freshly named custom resource.
#[derive(Dbg)]
pub struct Launcher {
    config: LaunchConfig,
    #[dbg(skip)]
    submitter: Arc<dyn CustomObjectSubmitter>,
    #[dbg(skip)]
    clock: Arc<dyn Clock>,
}

impl Launcher {
    pub fn new(
        config: LaunchConfig,
        submitter: Arc<dyn CustomObjectSubmitter>,
        clock: Arc<dyn Clock>,
    ) -> Launcher {
        Launcher {
            config,
            submitter,
            clock,
        }
    }

    /// Loads the template, names it and creates it. Not idempotent: every
    /// call that reaches the API server creates a new object.
    #[instrument(
        "launcher/launch",
        skip(self),
        fields(
            kubernetes_namespace = %self.config.target.namespace,
            template = %self.config.template.display(),
            job_name = Empty
        )
    )]
    pub async fn launch(&self) -> Result<Submission, LaunchError> {
        let template = JobTemplate::load(&self.config.template).await?;
        if let Some(namespace) = template
            .namespace()
            .filter(|namespace| *namespace != self.config.target.namespace)
        {
            warn!(
                "Template namespace '{}' differs from target namespace '{}'; the API server will reject the create.",
                namespace, self.config.target.namespace
            );
        }

        let job_name = JobName::at(&self.config.name_prefix, self.clock.now());
        Span::current().record("job_name", job_name.as_str());

        let object = template.into_named(&job_name);

        match tokio::time::timeout(self.config.timeout, self.submitter.create(&object)).await {
            Ok(result) => {
                result
                    .with_span_trace()
                    .map_err(|e| LaunchError::ClusterApi(job_name.clone(), e))?;
            }
            Err(_) => {
                return Err(LaunchError::Timeout(
                    job_name,
                    self.config.timeout,
                    SpanTrace::capture(),
                ));
            }
        }

        info!(
            "{} '{}' created in namespace '{}'.",
            self.config.target.kind, job_name, self.config.target.namespace
        );

        Ok(Submission {
            job_name,
            status: SubmissionStatus::Created,
        })
    }
}
