//! Data models for Shopee listing pages and parsed listings.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Shopee stores prices as integers scaled by this factor.
pub const PRICE_SCALE: f64 = 100_000.0;

/// One page of the shop search endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingPage {
    /// Total items in the shop, across all pages
    #[serde(default)]
    pub total_count: u64,
    /// Raw items exactly as returned by Shopee
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<Value>,
}

// Shopee sends `"items": null` past the last page.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Value>, D::Error> {
    Ok(Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default())
}

impl ListingPage {
    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// A shop item reduced to the exported columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Item name with bracketed tags removed
    pub name: String,
    /// Price in local currency
    pub price: f64,
    /// Local currency code
    pub currency: String,
    /// Price converted to USD, if conversion is enabled
    pub price_usd: Option<f64>,
}

impl Listing {
    pub fn new(name: impl Into<String>, price: f64, currency: impl Into<String>) -> Self {
        Self { name: name.into(), price, currency: currency.into(), price_usd: None }
    }

    /// Fills in the USD price using `rate` (USD per local unit).
    pub fn with_rate(mut self, rate: f64) -> Self {
        self.price_usd = Some(self.price * rate);
        self
    }
}

/// Renders a local price without trailing zeros (`12.9`, `15`, `0.45`).
pub fn format_local_price(price: f64) -> String {
    let rounded = (price * 100.0).round() / 100.0;
    format!("{}", rounded)
}

/// Renders a USD price with two decimals.
pub fn format_usd_price(price: f64) -> String {
    format!("{:.2}", price)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_with_rate() {
        let listing = Listing::new("Mug", 20.0, "MYR").with_rate(0.25);
        assert_eq!(listing.price_usd, Some(5.0));
        assert_eq!(listing.currency, "MYR");
    }

    #[test]
    fn test_format_local_price() {
        assert_eq!(format_local_price(12.9), "12.9");
        assert_eq!(format_local_price(15.0), "15");
        assert_eq!(format_local_price(0.456), "0.46");
        assert_eq!(format_local_price(125000.0), "125000");
    }

    #[test]
    fn test_format_usd_price() {
        assert_eq!(format_usd_price(3.0), "3.00");
        assert_eq!(format_usd_price(2.346), "2.35");
    }

    #[test]
    fn test_listing_page_defaults() {
        let page: ListingPage = serde_json::from_str("{}").unwrap();
        assert_eq!(page.total_count, 0);
        assert!(page.is_empty());
    }
}
