//! Supported Shopee storefronts with their domains and currencies.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported Shopee countries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Country {
    #[default]
    #[serde(alias = "malasya")]
    Malaysia,
    Singapore,
    Vietnam,
    Thailand,
    Indonesia,
}

impl Country {
    /// Returns the domain suffix after `shopee.`.
    pub fn domain_suffix(&self) -> &'static str {
        match self {
            Country::Malaysia => "com.my",
            Country::Singapore => "sg",
            Country::Vietnam => "vn",
            Country::Thailand => "co.th",
            Country::Indonesia => "co.id",
        }
    }

    /// Returns the Shopee domain for this country.
    pub fn domain(&self) -> String {
        format!("shopee.{}", self.domain_suffix())
    }

    /// Returns the base URL for this country.
    pub fn base_url(&self) -> String {
        format!("https://{}", self.domain())
    }

    /// Returns the currency code for this country.
    pub fn currency(&self) -> &'static str {
        match self {
            Country::Malaysia => "MYR",
            Country::Singapore => "SGD",
            Country::Vietnam => "VND",
            Country::Thailand => "THB",
            Country::Indonesia => "IDR",
        }
    }

    /// Returns all supported countries.
    pub fn all() -> &'static [Country] {
        &[
            Country::Malaysia,
            Country::Singapore,
            Country::Vietnam,
            Country::Thailand,
            Country::Indonesia,
        ]
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Country::Malaysia => "malaysia",
            Country::Singapore => "singapore",
            Country::Vietnam => "vietnam",
            Country::Thailand => "thailand",
            Country::Indonesia => "indonesia",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for Country {
    type Err = CountryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "malaysia" | "malasya" | "my" => Ok(Country::Malaysia),
            "singapore" | "sg" => Ok(Country::Singapore),
            "vietnam" | "vn" => Ok(Country::Vietnam),
            "thailand" | "th" => Ok(Country::Thailand),
            "indonesia" | "id" => Ok(Country::Indonesia),
            _ => Err(CountryParseError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, thiserror::Error)]
#[error("Unknown country '{0}'. Valid countries: malaysia, singapore, vietnam, thailand, indonesia")]
pub struct CountryParseError(String);
