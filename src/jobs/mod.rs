//! Remote async jobs: submission, status polling and batch aggregation.

pub mod api;
pub mod batch;
pub mod client;
pub mod poller;

pub use api::{JobApi, JobStatus, JobTicket, StatusReport};
pub use batch::{Job, JobBatch};
pub use client::ScraperApiClient;
pub use poller::{JobError, JobPoller, PollPolicy};
