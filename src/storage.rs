//! Raw and parsed output files keyed by shop, country, and date.

use crate::shopee::Country;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes aggregated shop data under a data directory.
pub struct DataStore {
    root: PathBuf,
}

impl DataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// `<root>/raw/all-items-raw-shopid-<id>-country-<country>-<date>.json`
    pub fn raw_path(&self, shop_id: u64, country: Country, date: NaiveDate) -> PathBuf {
        self.root.join("raw").join(format!("all-items-raw-{}.json", file_key(shop_id, country, date)))
    }

    /// `<root>/parsed/all-items-parsed-shopid-<id>-country-<country>-<date>.csv`
    pub fn parsed_path(&self, shop_id: u64, country: Country, date: NaiveDate) -> PathBuf {
        self.root.join("parsed").join(format!("all-items-parsed-{}.csv", file_key(shop_id, country, date)))
    }

    /// Dumps every raw item as one JSON array.
    pub fn save_raw(&self, shop_id: u64, country: Country, date: NaiveDate, items: &[Value]) -> Result<PathBuf> {
        let path = self.raw_path(shop_id, country, date);
        let json = serde_json::to_string(items).context("Failed to encode raw items")?;
        write_file(&path, json)?;

        info!("Saved {} raw items to {}", items.len(), path.display());
        Ok(path)
    }

    /// Writes pre-rendered CSV text.
    pub fn save_parsed(&self, shop_id: u64, country: Country, date: NaiveDate, csv: &str) -> Result<PathBuf> {
        let path = self.parsed_path(shop_id, country, date);
        write_file(&path, format!("{}\n", csv))?;

        info!("Saved parsed listings to {}", path.display());
        Ok(path)
    }
}

fn file_key(shop_id: u64, country: Country, date: NaiveDate) -> String {
    format!("shopid-{}-country-{}-{}", shop_id, country, date.format("%Y-%m-%d"))
}

fn write_file(path: &Path, contents: String) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("Failed to write file: {}", path.display()))
}
