//! Submits remote jobs and polls them until the whole batch has finished.

use super::api::{JobApi, JobStatus};
use super::batch::JobBatch;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Errors raised while submitting or polling jobs.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("Job submission failed: {0}")]
    Submission(String),

    #[error("Jobs still unfinished after {attempts} polling rounds ({pending} of {total} pending)")]
    PollTimeout { attempts: u32, pending: usize, total: usize },

    #[error("Status check failed for {status_url}: {reason}")]
    Status { status_url: String, reason: String },
}

/// Fixed-interval polling schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Pause before the first status round
    pub initial_delay: Duration,
    /// Pause between subsequent rounds
    pub interval: Duration,
    /// Maximum number of status rounds
    pub max_attempts: u32,
}

impl PollPolicy {
    pub fn new(initial_delay: Duration, interval: Duration, max_attempts: u32) -> Self {
        Self { initial_delay, interval, max_attempts }
    }

    /// Policy with no pauses, for tests and local mocks.
    pub fn immediate(max_attempts: u32) -> Self {
        Self::new(Duration::ZERO, Duration::ZERO, max_attempts)
    }

    /// Upper bound on time spent sleeping.
    pub fn max_wait(&self) -> Duration {
        if self.max_attempts == 0 {
            return Duration::ZERO;
        }
        self.initial_delay + self.interval * (self.max_attempts - 1)
    }

    fn pause_before(&self, round: u32) -> Duration {
        if round == 0 {
            self.initial_delay
        } else {
            self.interval
        }
    }
}

/// Drives job submission and status polling against a [`JobApi`].
pub struct JobPoller<'a, A: JobApi + ?Sized> {
    api: &'a A,
}

impl<'a, A: JobApi + ?Sized> JobPoller<'a, A> {
    pub fn new(api: &'a A) -> Self {
        Self { api }
    }

    /// Submits all URLs as one batch. The returned jobs are queued and in request order.
    pub async fn submit(&self, urls: &[String]) -> Result<JobBatch, JobError> {
        if urls.is_empty() {
            return Ok(JobBatch::default());
        }

        debug!("Submitting batch of {} jobs", urls.len());
        let tickets =
            self.api.submit_batch(urls).await.map_err(|e| JobError::Submission(format!("{e:#}")))?;

        if tickets.is_empty() {
            return Err(JobError::Submission("API returned no job descriptors".to_string()));
        }
        if tickets.len() != urls.len() {
            return Err(JobError::Submission(format!(
                "API returned {} job descriptors for {} requests",
                tickets.len(),
                urls.len()
            )));
        }

        Ok(JobBatch::from_tickets(tickets))
    }

    /// Submits a single URL through the single-job endpoint.
    pub async fn submit_one(&self, url: &str) -> Result<JobBatch, JobError> {
        debug!("Submitting single job");
        let ticket =
            self.api.submit_single(url).await.map_err(|e| JobError::Submission(format!("{e:#}")))?;

        Ok(JobBatch::from_tickets(vec![ticket]))
    }

    /// Polls every unfinished job once per round until the batch completes or the
    /// policy's round budget runs out. Payloads are returned in batch order.
    pub async fn poll_until_complete(
        &self,
        mut batch: JobBatch,
        policy: &PollPolicy,
    ) -> Result<Vec<Value>, JobError> {
        let mut rounds = 0;
        debug!(
            "Polling {} jobs for up to {} rounds ({}s of pauses)",
            batch.len(),
            policy.max_attempts,
            policy.max_wait().as_secs()
        );

        while rounds < policy.max_attempts && !batch.is_complete() {
            let pause = policy.pause_before(rounds);
            if !pause.is_zero() {
                debug!("Waiting {}ms before polling round {}", pause.as_millis(), rounds + 1);
                tokio::time::sleep(pause).await;
            }
            rounds += 1;

            for index in batch.unfinished() {
                let Some(job) = batch.job_mut(index) else { continue };

                let report = self.api.status(&job.status_url).await.map_err(|e| JobError::Status {
                    status_url: job.status_url.clone(),
                    reason: format!("{e:#}"),
                })?;

                if report.status == JobStatus::Failed && job.status != JobStatus::Failed {
                    warn!(
                        "Job {} reported failed by the remote service",
                        job.id.as_deref().unwrap_or(&job.status_url)
                    );
                }
                job.apply(&report);
            }

            debug!(
                "Round {}: {} of {} jobs finished",
                rounds,
                batch.len() - batch.unfinished().len(),
                batch.len()
            );
        }

        let total = batch.len();
        let pending = batch.unfinished().len();
        if pending > 0 {
            return Err(JobError::PollTimeout { attempts: rounds, pending, total });
        }

        if total > 0 {
            info!("All {} jobs finished after {} polling rounds", total, rounds);
        }

        // Complete batches always yield every payload.
        batch.into_payloads().ok_or(JobError::PollTimeout { attempts: rounds, pending, total })
    }

    /// Submits a batch and waits for all of it.
    pub async fn run_batch(&self, urls: &[String], policy: &PollPolicy) -> Result<Vec<Value>, JobError> {
        let batch = self.submit(urls).await?;
        self.poll_until_complete(batch, policy).await
    }

    /// Submits one URL and waits for its payload.
    pub async fn run_single(&self, url: &str, policy: &PollPolicy) -> Result<Value, JobError> {
        let batch = self.submit_one(url).await?;
        let mut payloads = self.poll_until_complete(batch, policy).await?;
        payloads.pop().ok_or_else(|| JobError::Submission("API returned no job descriptors".to_string()))
    }
}
