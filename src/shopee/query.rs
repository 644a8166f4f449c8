//! Shop listing requests and pagination offsets.

use super::countries::Country;
use anyhow::Result;

/// Parses a shop identifier, rejecting anything that is not an unsigned integer.
pub fn parse_shop_id(raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|_| {
        anyhow::anyhow!("Invalid shop id: '{}'. The shop id should be an integer.", raw.trim())
    })
}

/// A paginated listing request for one shop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShopQuery {
    pub shop_id: u64,
    pub country: Country,
    /// Items per page
    pub chunk_size: u32,
    /// Hide sold-out items
    pub filter_sold_out: bool,
}

impl ShopQuery {
    pub fn new(shop_id: u64, country: Country, chunk_size: u32) -> Result<Self> {
        if chunk_size == 0 {
            anyhow::bail!("Chunk size must be greater than zero");
        }
        Ok(Self { shop_id, country, chunk_size, filter_sold_out: false })
    }

    pub fn with_filter_sold_out(mut self, filter: bool) -> Self {
        self.filter_sold_out = filter;
        self
    }

    /// Listing URL for the page starting at `offset`.
    pub fn page_url(&self, offset: u64) -> String {
        format!(
            "{}/api/v4/shop/search_items?filter_sold_out={}&limit={}&offset={}&order=desc&shopid={}&sort_by=pop&use_case=4",
            self.country.base_url(),
            u8::from(self.filter_sold_out),
            self.chunk_size,
            offset,
            self.shop_id
        )
    }

    /// Number of pages needed to cover `total_count` items.
    pub fn page_count(&self, total_count: u64) -> u64 {
        total_count.div_ceil(u64::from(self.chunk_size))
    }

    /// URLs for every page after the first, in offset order.
    pub fn remaining_page_urls(&self, total_count: u64) -> Vec<String> {
        (1..self.page_count(total_count))
            .map(|page| self.page_url(page * u64::from(self.chunk_size)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_shop_id() {
        assert_eq!(parse_shop_id("123456").unwrap(), 123456);
        assert_eq!(parse_shop_id(" 42 ").unwrap(), 42);
    }

    #[test]
    fn test_parse_shop_id_rejects_non_integer() {
        for raw in ["abc", "12.5", "-3", ""] {
            let err = parse_shop_id(raw).unwrap_err().to_string();
            assert!(err.contains("Invalid shop id"), "{raw}: {err}");
        }
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        assert!(ShopQuery::new(1, Country::Singapore, 0).is_err());
    }

    #[test]
    fn test_page_url() {
        let query = ShopQuery::new(777, Country::Malaysia, 30).unwrap();
        assert_eq!(
            query.page_url(60),
            "https://shopee.com.my/api/v4/shop/search_items?filter_sold_out=0&limit=30&offset=60&order=desc&shopid=777&sort_by=pop&use_case=4"
        );
    }

    #[test]
    fn test_page_url_filter_sold_out() {
        let query = ShopQuery::new(1, Country::Vietnam, 10).unwrap().with_filter_sold_out(true);
        assert!(query.page_url(0).contains("filter_sold_out=1"));
        assert!(query.page_url(0).starts_with("https://shopee.vn/"));
    }

    #[test]
    fn test_page_count() {
        let query = ShopQuery::new(1, Country::Singapore, 30).unwrap();
        assert_eq!(query.page_count(0), 0);
        assert_eq!(query.page_count(30), 1);
        assert_eq!(query.page_count(31), 2);
        assert_eq!(query.page_count(95), 4);
    }

    #[test]
    fn test_remaining_page_urls() {
        let query = ShopQuery::new(1, Country::Singapore, 30).unwrap();
        let urls = query.remaining_page_urls(95);

        assert_eq!(urls.len(), 3);
        assert!(urls[0].contains("offset=30&"));
        assert!(urls[1].contains("offset=60&"));
        assert!(urls[2].contains("offset=90&"));
        assert!(query.remaining_page_urls(30).is_empty());
    }
}
