//! Exchange rate store: country currency to USD, cached on disk.

use crate::jobs::{JobApi, JobPoller, PollPolicy};
use crate::shopee::Country;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

const OANDA_BASE: &str = "https://fxds-public-exchange-rates-api.oanda.com/cc-api/currencies";

/// USD rates keyed by country.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RateTable {
    rates: BTreeMap<Country, f64>,
}

impl RateTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, country: Country, rate: f64) {
        self.rates.insert(country, rate);
    }

    pub fn get(&self, country: Country) -> Option<f64> {
        self.rates.get(&country).copied()
    }

    /// Returns the rate for `country` or an error naming the missing currency.
    pub fn require(&self, country: Country) -> Result<f64> {
        self.get(country).with_context(|| {
            format!("No {} exchange rate for {}. Run the `rates` command to refresh.", country.currency(), country)
        })
    }

    pub fn len(&self) -> usize {
        self.rates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Country, f64)> + '_ {
        self.rates.iter().map(|(c, r)| (*c, *r))
    }

    /// Loads a rate file. Rates may be stored as numbers or numeric strings.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading exchange rates from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read exchange rates: {}", path.display()))?;
        let raw: BTreeMap<String, Value> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse exchange rates: {}", path.display()))?;

        let mut table = Self::new();
        for (key, value) in raw {
            let country: Country = key.parse()?;
            let rate = rate_from_value(&value)
                .with_context(|| format!("Invalid exchange rate for {}: {}", key, value))?;
            table.insert(country, rate);
        }

        Ok(table)
    }

    /// Writes the table as a JSON object keyed by country name.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        let json = serde_json::to_string_pretty(&self.rates)?;
        std::fs::write(path, json)
            .with_context(|| format!("Failed to write exchange rates: {}", path.display()))?;

        debug!("Saved {} exchange rates to {}", self.len(), path.display());
        Ok(())
    }

    /// Fetches fresh rates for every country through one job batch.
    pub async fn refresh(api: &impl JobApi, policy: &PollPolicy, today: NaiveDate) -> Result<Self> {
        let countries = Country::all();
        let urls: Vec<String> = countries.iter().map(|c| rate_url(c.currency(), today)).collect();

        info!("Refreshing exchange rates for {} currencies", urls.len());
        let payloads = JobPoller::new(api)
            .run_batch(&urls, policy)
            .await
            .context("Exchange rate refresh failed, please try again later")?;

        let mut table = Self::new();
        for (country, payload) in countries.iter().zip(&payloads) {
            let rate = average_bid(payload)
                .with_context(|| format!("No average_bid in {} rate response", country.currency()))?;
            table.insert(*country, rate);
        }

        Ok(table)
    }

    /// Loads the cached table, refreshing and saving it when the file is missing.
    pub async fn load_or_refresh(
        path: &Path,
        api: &impl JobApi,
        policy: &PollPolicy,
        today: NaiveDate,
    ) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        warn!("No exchange rate file at {}, fetching fresh rates", path.display());
        let table = Self::refresh(api, policy, today).await?;
        table.save(path)?;
        Ok(table)
    }
}

/// OANDA currency-pair URL for `currency` → USD over the day before `today`.
pub fn rate_url(currency: &str, today: NaiveDate) -> String {
    let start = today.pred_opt().unwrap_or(today);
    format!(
        "{}?base={}&quote=USD&data_type=general_currency_pair&start_date={}&end_date={}",
        OANDA_BASE,
        currency,
        start.format("%Y-%m-%d"),
        today.format("%Y-%m-%d")
    )
}

fn average_bid(payload: &Value) -> Option<f64> {
    payload.get("response")?.get(0)?.get("average_bid").and_then(rate_from_value)
}

fn rate_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
