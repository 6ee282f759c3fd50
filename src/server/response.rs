use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;

use crate::launcher::{LaunchError, Submission};

#[derive(Debug, Serialize)]
pub(crate) struct ServiceInfo {
    pub(crate) message: &'static str,
    pub(crate) version: &'static str,
}

#[derive(Debug, Serialize)]
pub(crate) struct Health {
    pub(crate) status: &'static str,
}

pub(crate) const LAUNCH_MESSAGE: &str = "Job Spark criado com sucesso";

#[derive(Debug, Serialize)]
pub(crate) struct LaunchResponse {
    pub(crate) message: &'static str,
    pub(crate) job_name: String,
    pub(crate) status: &'static str,
}

impl From<Submission> for LaunchResponse {
    fn from(submission: Submission) -> Self {
        LaunchResponse {
            message: LAUNCH_MESSAGE,
            status: submission.status.as_str(),
            job_name: submission.job_name.into_string(),
        }
    }
}

impl LaunchError {
    fn status_code(&self) -> StatusCode {
        match self {
            LaunchError::Template(_) => StatusCode::INTERNAL_SERVER_ERROR,
            LaunchError::ClusterApi(..) => StatusCode::BAD_GATEWAY,
            LaunchError::Timeout(..) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            LaunchError::Template(_) => "template_load",
            LaunchError::ClusterApi(..) => "cluster_api",
            LaunchError::Timeout(..) => "timeout",
        }
    }
}

impl IntoResponse for LaunchError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": self.kind(),
            "message": self.to_string(),
        });
        (self.status_code(), Json(body)).into_response()
    }
}
