//! CLI command implementations.

pub mod rates;
pub mod shop;

pub use rates::RatesCommand;
pub use shop::ShopCommand;
