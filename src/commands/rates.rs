//! Exchange rate refresh command implementation.

use crate::config::Config;
use crate::jobs::{JobApi, ScraperApiClient};
use crate::rates::RateTable;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use tracing::info;

/// Refreshes the cached exchange rates.
pub struct RatesCommand {
    config: Config,
}

impl RatesCommand {
    /// Creates a new rates command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Fetches fresh rates, saves them, and returns a summary table.
    pub async fn execute(&self) -> Result<String> {
        let client = ScraperApiClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client, Local::now().date_naive()).await
    }

    /// Refreshes rates with a provided client and date (for testing).
    pub async fn execute_with_client(&self, client: &impl JobApi, today: NaiveDate) -> Result<String> {
        let table = RateTable::refresh(client, &self.config.polling.rates_policy(), today).await?;

        let path = self.config.rates_path();
        table.save(&path)?;
        info!("Exchange rates written to {}", path.display());

        Ok(Self::format_table(&table))
    }

    fn format_table(table: &RateTable) -> String {
        let mut lines = Vec::new();
        lines.push(format!("{:<12} {:<10} {:>14}", "Country", "Currency", "USD rate"));
        lines.push(format!("{:-<12} {:-<10} {:->14}", "", "", ""));

        for (country, rate) in table.iter() {
            lines.push(format!("{:<12} {:<10} {:>14}", country.to_string(), country.currency(), rate));
        }

        lines.join("\n")
    }
}
