//! shopee-crawler - Shopee shop listing exporter
//!
//! Fetches every listing of a Shopee shop through ScraperAPI async jobs,
//! polls the jobs to completion, and exports raw JSON and parsed CSV.

pub mod commands;
pub mod config;
pub mod format;
pub mod jobs;
pub mod rates;
pub mod shopee;
pub mod storage;

pub use config::Config;
pub use jobs::{JobBatch, JobError, JobPoller, PollPolicy};
pub use shopee::{Country, Listing};
