use std::path::{Path, PathBuf};

use kube::api::DynamicObject;
use kube::discovery::ApiResource;
use serde_json::Value;
use thiserror::Error;
use tracing::{Level, instrument};

use crate::error::{SpannedErr, SpannedExt};
use crate::launcher::job_name::JobName;

/// Group, version, kind, plural and namespace the launcher creates objects under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomResourceTarget {
    pub group: String,
    pub version: String,
    pub kind: String,
    pub plural: String,
    pub namespace: String,
}

impl CustomResourceTarget {
    pub fn api_version(&self) -> String {
        format!("{}/{}", self.group, self.version)
    }

    pub fn api_resource(&self) -> ApiResource {
        ApiResource {
            group: self.group.clone(),
            version: self.version.clone(),
            api_version: self.api_version(),
            kind: self.kind.clone(),
            plural: self.plural.clone(),
        }
    }
}

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read job template '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Job template '{path}' is not a valid object: {source}")]
    Parse {
        path: PathBuf,
        source: TemplateShapeError,
    },
}

#[derive(Error, Debug)]
pub enum TemplateShapeError {
    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error("top level must be a mapping")]
    NotAMapping,

    #[error("'{0}' is missing or not a string")]
    MissingType(&'static str),

    #[error("'metadata' is missing or not a mapping")]
    MissingMetadata,

    #[error(transparent)]
    Object(#[from] serde_json::Error),
}

/// A custom resource body loaded from disk.
///
/// Only `metadata` is typed. Everything else (`spec`, `status`, unknown
/// top-level keys) is carried through untouched.
#[derive(Debug, Clone)]
pub struct JobTemplate {
    object: DynamicObject,
}

impl JobTemplate {
    #[instrument("job_template/load", level = Level::TRACE)]
    pub async fn load(path: &Path) -> Result<JobTemplate, SpannedErr<TemplateError>> {
        let text = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| TemplateError::Read {
                path: path.to_path_buf(),
                source,
            })
            .with_span_trace()?;

        Self::from_yaml_str(&text)
            .map_err(|source| TemplateError::Parse {
                path: path.to_path_buf(),
                source,
            })
            .with_span_trace()
    }

    /// `apiVersion`, `kind` and a `metadata` mapping are required, since
    /// `DynamicObject` would otherwise default or drop them silently.
    pub fn from_yaml_str(text: &str) -> Result<JobTemplate, TemplateShapeError> {
        let value: Value = serde_yaml::from_str(text)?;
        let Value::Object(fields) = &value else {
            return Err(TemplateShapeError::NotAMapping);
        };
        for key in ["apiVersion", "kind"] {
            if !fields.get(key).is_some_and(Value::is_string) {
                return Err(TemplateShapeError::MissingType(key));
            }
        }
        if !fields.get("metadata").is_some_and(Value::is_object) {
            return Err(TemplateShapeError::MissingMetadata);
        }

        let object: DynamicObject = serde_json::from_value(value)?;
        Ok(JobTemplate { object })
    }

    pub fn name(&self) -> Option<&str> {
        self.object.metadata.name.as_deref()
    }

    pub fn namespace(&self) -> Option<&str> {
        self.object.metadata.namespace.as_deref()
    }

    /// Stamps `metadata.name` and hands back the object ready to be created.
    pub fn into_named(mut self, name: &JobName) -> DynamicObject {
        self.object.metadata.name = Some(name.to_string());
        self.object
    }
}
