//! Output formatting for listings (table, JSON, CSV).

use crate::config::OutputFormat;
use crate::shopee::models::{format_local_price, format_usd_price, Listing};

/// Formats listings for output.
pub struct Formatter {
    format: OutputFormat,
}

impl Formatter {
    /// Creates a new formatter.
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Formats listings priced in `currency`. The USD column appears when `with_usd` is set.
    pub fn format_listings(&self, listings: &[Listing], currency: &str, with_usd: bool) -> String {
        if listings.is_empty() {
            return match self.format {
                OutputFormat::Json => "[]".to_string(),
                OutputFormat::Csv => Self::csv_header(currency, with_usd),
                OutputFormat::Table => "No items found.".to_string(),
            };
        }

        match self.format {
            OutputFormat::Json => self.json_listings(listings),
            OutputFormat::Table => self.table_listings(listings, currency, with_usd),
            OutputFormat::Csv => Self::csv_listings(listings, currency, with_usd),
        }
    }

    // JSON formatting

    fn json_listings(&self, listings: &[Listing]) -> String {
        serde_json::to_string_pretty(listings).unwrap_or_else(|_| "[]".to_string())
    }

    // Table formatting

    fn table_listings(&self, listings: &[Listing], currency: &str, with_usd: bool) -> String {
        let price_width = 14;
        let name_width = 60;

        let mut lines = Vec::new();

        let local_header = format!("Price ({})", currency);
        if with_usd {
            lines.push(format!(
                "{:>price_width$}  {:>price_width$}  {}",
                local_header, "Price (USD)", "Name"
            ));
            lines.push(format!("{:-<price_width$}  {:-<price_width$}  {:-<name_width$}", "", "", ""));
        } else {
            lines.push(format!("{:>price_width$}  {}", local_header, "Name"));
            lines.push(format!("{:-<price_width$}  {:-<name_width$}", "", ""));
        }

        for listing in listings {
            let name = truncate(&listing.name, name_width);
            let local = format_local_price(listing.price);

            if with_usd {
                let usd = listing.price_usd.map(format_usd_price).unwrap_or_else(|| "N/A".to_string());
                lines.push(format!("{:>price_width$}  {:>price_width$}  {}", local, usd, name));
            } else {
                lines.push(format!("{:>price_width$}  {}", local, name));
            }
        }

        lines.push(String::new());
        lines.push(format!("Total: {} items", listings.len()));

        lines.join("\n")
    }

    // CSV formatting

    fn csv_header(currency: &str, with_usd: bool) -> String {
        if with_usd {
            format!("Name,Price ({}),Price (USD)", currency)
        } else {
            format!("Name,Price ({})", currency)
        }
    }

    /// Renders the CSV export: `Name, Price (<currency>)[, Price (USD)]`.
    pub fn csv_listings(listings: &[Listing], currency: &str, with_usd: bool) -> String {
        let mut lines = Vec::new();
        lines.push(Self::csv_header(currency, with_usd));

        for listing in listings {
            let name = Self::csv_escape(&listing.name);
            let local = format_local_price(listing.price);

            if with_usd {
                let usd = listing.price_usd.map(format_usd_price).unwrap_or_default();
                lines.push(format!("{},{},{}", name, local, usd));
            } else {
                lines.push(format!("{},{}", name, local));
            }
        }

        lines.join("\n")
    }

    fn csv_escape(s: &str) -> String {
        if s.contains(',') || s.contains('"') || s.contains('\n') {
            format!("\"{}\"", s.replace('"', "\"\""))
        } else {
            s.to_string()
        }
    }
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let head: String = s.chars().take(width - 3).collect();
        format!("{}...", head)
    } else {
        s.to_string()
    }
}
