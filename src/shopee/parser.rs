//! Parser for Shopee shop search payloads.

use crate::shopee::countries::Country;
use crate::shopee::models::{Listing, ListingPage, PRICE_SCALE};
use anyhow::{Context, Result};
use regex_lite::Regex;
use serde_json::Value;
use std::sync::LazyLock;
use tracing::{debug, info, trace, warn};

static BRACKET_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\[[^\]]*\]").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Removes bracketed tags such as `[READY STOCK]` and normalises whitespace.
pub fn clean_name(raw: &str) -> String {
    let stripped = BRACKET_TAG.replace_all(raw, " ");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

/// Parser for Shopee listing payloads.
pub struct Parser {
    country: Country,
}

impl Parser {
    /// Creates a new parser for the given country.
    pub fn new(country: Country) -> Self {
        Self { country }
    }

    /// Parses one search_items payload into a page.
    pub fn parse_page(&self, payload: &Value) -> Result<ListingPage> {
        self.check_for_errors(payload)?;

        let page: ListingPage =
            serde_json::from_value(payload.clone()).context("Unexpected shop listing payload")?;

        debug!("Parsed page with {} items (total_count: {})", page.count(), page.total_count);
        Ok(page)
    }

    /// Converts raw items to listings, skipping items without a name or price.
    pub fn parse_listings(&self, items: &[Value], rate: Option<f64>) -> Vec<Listing> {
        let listings: Vec<Listing> = items
            .iter()
            .filter_map(|item| match self.parse_listing(item) {
                Ok(listing) => {
                    trace!("Parsed listing: {}", listing.name);
                    Some(match rate {
                        Some(rate) => listing.with_rate(rate),
                        None => listing,
                    })
                }
                Err(e) => {
                    warn!("Failed to parse item: {}", e);
                    None
                }
            })
            .collect();

        let skipped = items.len() - listings.len();
        if skipped > 0 {
            info!("Skipped {} of {} items without a name or price; they remain in the raw dump", skipped, items.len());
        }

        listings
    }

    /// Parses a single raw item.
    pub fn parse_listing(&self, item: &Value) -> Result<Listing> {
        let basic = item.get("item_basic").context("Item has no item_basic section")?;

        let name = basic
            .get("name")
            .and_then(Value::as_str)
            .map(clean_name)
            .context("Item has no name")?;

        let raw_price = basic.get("price").and_then(Value::as_f64).context("Item has no price")?;

        Ok(Listing::new(name, raw_price / PRICE_SCALE, self.country.currency()))
    }

    fn check_for_errors(&self, payload: &Value) -> Result<()> {
        match payload.get("error") {
            None | Some(Value::Null) => Ok(()),
            Some(Value::Number(code)) if code.as_i64() == Some(0) => Ok(()),
            Some(code) => {
                let message = payload.get("error_msg").and_then(Value::as_str).unwrap_or("no message");
                anyhow::bail!("Shopee returned error {}: {}", code, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn make_item(name: &str, price: i64) -> Value {
        json!({ "itemid": 1, "item_basic": { "name": name, "price": price, "stock": 3 } })
    }

    #[test]
    fn test_clean_name() {
        assert_eq!(clean_name("[READY STOCK] Ceramic Mug"), "Ceramic Mug");
        assert_eq!(clean_name("Mug [Blue] [Large] 350ml"), "Mug 350ml");
        assert_eq!(clean_name("  Plain name  "), "Plain name");
        assert_eq!(clean_name("Unclosed [tag"), "Unclosed [tag");
    }

    #[test]
    fn test_parse_page() {
        let parser = Parser::new(Country::Singapore);
        let payload = json!({
            "total_count": 42,
            "items": [make_item("A", 100000), make_item("B", 250000)],
            "nomore": false
        });

        let page = parser.parse_page(&payload).unwrap();
        assert_eq!(page.total_count, 42);
        assert_eq!(page.count(), 2);
    }

    #[test]
    fn test_parse_page_null_items() {
        let parser = Parser::new(Country::Singapore);
        let page = parser.parse_page(&json!({ "total_count": 0, "items": null })).unwrap();
        assert!(page.is_empty());
    }

    #[test]
    fn test_parse_page_shopee_error() {
        let parser = Parser::new(Country::Malaysia);
        let payload = json!({ "error": 90309999, "error_msg": "blocked" });

        let err = parser.parse_page(&payload).unwrap_err().to_string();
        assert!(err.contains("90309999"));
        assert!(err.contains("blocked"));
    }

    #[test]
    fn test_parse_page_zero_error_is_ok() {
        let parser = Parser::new(Country::Malaysia);
        let page = parser.parse_page(&json!({ "error": 0, "total_count": 1, "items": [] })).unwrap();
        assert_eq!(page.total_count, 1);
    }

    #[test]
    fn test_parse_page_unexpected_shape() {
        let parser = Parser::new(Country::Malaysia);
        assert!(parser.parse_page(&json!({ "total_count": "many" })).is_err());
    }

    #[test]
    fn test_parse_listing_scales_price() {
        let parser = Parser::new(Country::Thailand);
        let listing = parser.parse_listing(&make_item("[HOT] Lamp", 1_990_000)).unwrap();

        assert_eq!(listing.name, "Lamp");
        assert_eq!(listing.price, 19.9);
        assert_eq!(listing.currency, "THB");
        assert!(listing.price_usd.is_none());
    }

    #[test]
    fn test_parse_listings_with_rate_skips_broken() {
        let parser = Parser::new(Country::Malaysia);
        let items = vec![make_item("Mug", 2_000_000), json!({ "itemid": 2 }), make_item("Cup", 1_000_000)];

        let listings = parser.parse_listings(&items, Some(0.25));
        assert_eq!(listings.len(), 2);
        assert_eq!(listings[0].price_usd, Some(5.0));
        assert_eq!(listings[1].name, "Cup");
    }

    #[test]
    fn test_parse_listings_all_broken() {
        let parser = Parser::new(Country::Vietnam);
        let items = vec![json!({ "itemid": 7 }), json!({ "item_basic": { "name": "No price" } })];

        assert!(parser.parse_listings(&items, None).is_empty());
    }
}
