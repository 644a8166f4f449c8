//! Wire types and the trait boundary for the async job API.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Trait for the remote batch job API - enables mocking for tests.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Submits a single URL as one job.
    async fn submit_single(&self, url: &str) -> Result<JobTicket>;

    /// Submits several URLs in one request. Tickets come back in request order.
    async fn submit_batch(&self, urls: &[String]) -> Result<Vec<JobTicket>>;

    /// Fetches the current status of a job.
    async fn status(&self, status_url: &str) -> Result<StatusReport>;
}

/// Remote job status as reported by the status endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    #[default]
    Queued,
    #[serde(alias = "running")]
    Processing,
    Finished,
    Failed,
}

impl JobStatus {
    pub fn is_finished(&self) -> bool {
        matches!(self, JobStatus::Finished)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobStatus::Queued => write!(f, "queued"),
            JobStatus::Processing => write!(f, "processing"),
            JobStatus::Finished => write!(f, "finished"),
            JobStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Descriptor returned when a job is accepted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobTicket {
    /// Remote job identifier
    #[serde(default)]
    pub id: Option<String>,
    /// Status reported at submission time
    #[serde(default)]
    pub status: JobStatus,
    /// URL to poll for this job
    pub status_url: String,
}

impl JobTicket {
    pub fn new(id: impl Into<String>, status_url: impl Into<String>) -> Self {
        Self { id: Some(id.into()), status: JobStatus::Queued, status_url: status_url.into() }
    }
}

/// Status endpoint response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusReport {
    pub status: JobStatus,
    /// Scraped response, present once the job has finished
    #[serde(default)]
    pub response: Option<JobResponse>,
}

impl StatusReport {
    pub fn pending(status: JobStatus) -> Self {
        Self { status, response: None }
    }

    pub fn finished(body: Value) -> Self {
        Self {
            status: JobStatus::Finished,
            response: Some(JobResponse { status_code: Some(200), body }),
        }
    }

    /// Returns the response body, decoding it when the API delivered JSON as a string.
    pub fn payload(&self) -> Option<Value> {
        let body = &self.response.as_ref()?.body;
        match body {
            Value::String(text) => Some(serde_json::from_str(text).unwrap_or_else(|_| body.clone())),
            other => Some(other.clone()),
        }
    }
}

/// Scraped response captured by a finished job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    #[serde(default)]
    pub status_code: Option<u16>,
    #[serde(default)]
    pub body: Value,
}
