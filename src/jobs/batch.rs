//! Jobs and order-preserving job batches.

use super::api::{JobStatus, JobTicket, StatusReport};
use serde_json::Value;

/// One outstanding remote request tracked by its status URL.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    /// Remote job identifier, if the API returned one
    pub id: Option<String>,
    /// URL polled for status updates
    pub status_url: String,
    /// Last known status
    pub status: JobStatus,
    /// Result body, present only once the job is finished
    pub payload: Option<Value>,
}

impl Job {
    /// Creates a queued job from a submission ticket.
    pub fn from_ticket(ticket: JobTicket) -> Self {
        Self { id: ticket.id, status_url: ticket.status_url, status: JobStatus::Queued, payload: None }
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished() && self.payload.is_some()
    }

    /// Applies a status report. A finished report without a body stays unfinished.
    pub fn apply(&mut self, report: &StatusReport) {
        self.status = report.status;
        if report.status.is_finished() {
            self.payload = report.payload();
            if self.payload.is_none() {
                self.status = JobStatus::Processing;
            }
        }
    }
}

/// Ordered group of jobs. Index `i` always belongs to the `i`-th submitted request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobBatch {
    jobs: Vec<Job>,
}

impl JobBatch {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs }
    }

    pub fn from_tickets(tickets: Vec<JobTicket>) -> Self {
        Self::new(tickets.into_iter().map(Job::from_ticket).collect())
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn jobs(&self) -> &[Job] {
        &self.jobs
    }

    pub fn job_mut(&mut self, index: usize) -> Option<&mut Job> {
        self.jobs.get_mut(index)
    }

    /// Returns true when every job has finished with a payload.
    pub fn is_complete(&self) -> bool {
        self.jobs.iter().all(Job::is_finished)
    }

    /// Indices of jobs that still need a status check, in batch order.
    pub fn unfinished(&self) -> Vec<usize> {
        self.jobs.iter().enumerate().filter(|(_, job)| !job.is_finished()).map(|(i, _)| i).collect()
    }

    /// Consumes the batch, returning payloads in submission order.
    ///
    /// Returns `None` if any job is unfinished.
    pub fn into_payloads(self) -> Option<Vec<Value>> {
        self.jobs.into_iter().map(|job| if job.status.is_finished() { job.payload } else { None }).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_batch(n: usize) -> JobBatch {
        JobBatch::from_tickets(
            (0..n).map(|i| JobTicket::new(format!("job-{i}"), format!("https://api/jobs/{i}"))).collect(),
        )
    }

    #[test]
    fn test_from_tickets_starts_queued() {
        let batch = make_batch(3);
        assert_eq!(batch.len(), 3);
        assert!(batch.jobs().iter().all(|j| j.status == JobStatus::Queued));
        assert_eq!(batch.jobs()[2].status_url, "https://api/jobs/2");
        assert_eq!(batch.unfinished(), vec![0, 1, 2]);
    }

    #[test]
    fn test_apply_finished_stores_payload() {
        let mut job = Job::from_ticket(JobTicket::new("a", "https://api/jobs/a"));
        job.apply(&StatusReport::finished(json!({ "n": 1 })));

        assert!(job.is_finished());
        assert_eq!(job.payload, Some(json!({ "n": 1 })));
    }

    #[test]
    fn test_apply_finished_without_body_is_not_finished() {
        let mut job = Job::from_ticket(JobTicket::new("a", "https://api/jobs/a"));
        job.apply(&StatusReport { status: JobStatus::Finished, response: None });

        assert!(!job.is_finished());
        assert_eq!(job.status, JobStatus::Processing);
    }

    #[test]
    fn test_unfinished_skips_finished_jobs() {
        let mut batch = make_batch(3);
        batch.job_mut(1).unwrap().apply(&StatusReport::finished(json!(1)));

        assert_eq!(batch.unfinished(), vec![0, 2]);
        assert!(!batch.is_complete());
    }

    #[test]
    fn test_into_payloads_keeps_order() {
        let mut batch = make_batch(3);
        for i in [2, 0, 1] {
            batch.job_mut(i).unwrap().apply(&StatusReport::finished(json!(i)));
        }

        assert!(batch.is_complete());
        assert_eq!(batch.into_payloads(), Some(vec![json!(0), json!(1), json!(2)]));
    }

    #[test]
    fn test_into_payloads_incomplete() {
        let mut batch = make_batch(2);
        batch.job_mut(0).unwrap().apply(&StatusReport::finished(json!(0)));
        assert!(batch.into_payloads().is_none());
    }

    #[test]
    fn test_empty_batch_is_complete() {
        let batch = JobBatch::default();
        assert!(batch.is_empty());
        assert!(batch.is_complete());
        assert_eq!(batch.into_payloads(), Some(Vec::new()));
    }
}
