//! Shopee-specific modules for countries, listing queries, parsing, and data models.

pub mod countries;
pub mod models;
pub mod parser;
pub mod query;

pub use countries::Country;
pub use models::{Listing, ListingPage};
pub use parser::Parser;
pub use query::{parse_shop_id, ShopQuery};
