//! Shop export command implementation.

use crate::config::Config;
use crate::format::Formatter;
use crate::jobs::{JobApi, JobPoller, ScraperApiClient};
use crate::rates::RateTable;
use crate::shopee::{parse_shop_id, Parser, ShopQuery};
use crate::storage::DataStore;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use serde_json::Value;
use tracing::{debug, info};

/// Fetches every listing of a shop and exports it.
pub struct ShopCommand {
    config: Config,
}

impl ShopCommand {
    /// Creates a new shop command.
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Validates the request, then fetches and exports the shop.
    pub async fn execute(&self, shop_id: &str) -> Result<String> {
        self.query(shop_id)?;
        let client = ScraperApiClient::new(&self.config).context("Failed to create HTTP client")?;

        self.execute_with_client(&client, shop_id, Local::now().date_naive()).await
    }

    /// Runs the export with a provided client and date stamp (for testing).
    pub async fn execute_with_client(
        &self,
        client: &impl JobApi,
        shop_id: &str,
        today: NaiveDate,
    ) -> Result<String> {
        let query = self.query(shop_id)?;
        let country = query.country;

        let rate = if self.config.convert_usd {
            let rates = RateTable::load_or_refresh(
                &self.config.rates_path(),
                client,
                &self.config.polling.rates_policy(),
                today,
            )
            .await?;
            Some(rates.require(country)?)
        } else {
            None
        };

        let items = self.fetch_items(client, &query).await?;

        let store = DataStore::new(self.config.data_dir());
        if self.config.save_raw {
            let path = store.save_raw(query.shop_id, country, today, &items)?;
            eprintln!("Raw items saved to {}", path.display());
        }

        let listings = Parser::new(country).parse_listings(&items, rate);
        let with_usd = rate.is_some();

        if self.config.save_parsed {
            let csv = Formatter::csv_listings(&listings, country.currency(), with_usd);
            let path = store.save_parsed(query.shop_id, country, today, &csv)?;
            eprintln!("Parsed listings saved to {}", path.display());
        }

        let formatter = Formatter::new(self.config.format);
        Ok(formatter.format_listings(&listings, country.currency(), with_usd))
    }

    /// Fetches the first page as a single job, then every remaining page as one batch.
    /// Items come back in page order.
    pub async fn fetch_items(&self, client: &impl JobApi, query: &ShopQuery) -> Result<Vec<Value>> {
        let parser = Parser::new(query.country);
        let poller = JobPoller::new(client);
        let polling = &self.config.polling;

        let first_url = query.page_url(0);
        debug!("First page: {}", first_url);

        let first_payload = poller
            .run_single(&first_url, &polling.single_policy())
            .await
            .context("An error has occurred fetching the first page, please try again later")?;
        let first_page = parser.parse_page(&first_payload)?;

        info!("{} items detected. Fetching all data", first_page.total_count);

        let mut items = first_page.items;

        let remaining = query.remaining_page_urls(first_page.total_count);
        if !remaining.is_empty() {
            debug!("Fetching {} more pages", remaining.len());

            let payloads = poller
                .run_batch(&remaining, &polling.batch_policy())
                .await
                .context("Failed to fetch remaining pages")?;

            for payload in &payloads {
                items.extend(parser.parse_page(payload)?.items);
            }
        }

        info!("Extraction was successful: {} items", items.len());
        Ok(items)
    }

    fn query(&self, shop_id: &str) -> Result<ShopQuery> {
        let shop_id = parse_shop_id(shop_id)?;
        Ok(ShopQuery::new(shop_id, self.config.country, self.config.chunk_size)?
            .with_filter_sold_out(self.config.filter_sold_out))
    }
}
