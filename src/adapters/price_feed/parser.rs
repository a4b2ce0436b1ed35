//! Price response parsing
//!
//! Providers disagree on response shape. Each shape gets one parser; the HTTP
//! client stays the same and just delegates URL building and parsing.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::PriceInfo;
use crate::ports::PriceFetchError;
use super::dexscreener::DexScreenerParser;
use super::jupiter::JupiterParser;

/// Turns one provider's batch response into `(address, PriceInfo)` pairs
pub trait PriceResponseParser: Send + Sync + fmt::Debug {
    fn name(&self) -> &'static str;

    /// Provider's per-request address limit
    fn max_batch_size(&self) -> usize;

    /// URL for one batch lookup against `base_url`
    fn request_url(&self, base_url: &str, addresses: &[String]) -> String;

    /// Parse a successful response body
    fn parse(&self, body: &[u8]) -> Result<Vec<(String, PriceInfo)>, PriceFetchError>;
}

/// Configured price source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriceSourceKind {
    /// Trading-pair list (`/latest/dex/tokens/{ids}`)
    #[default]
    DexScreener,
    /// Flat id -> price map (`/price/v2?ids=...`)
    Jupiter,
}

impl PriceSourceKind {
    pub fn parser(self) -> Box<dyn PriceResponseParser> {
        match self {
            PriceSourceKind::DexScreener => Box::new(DexScreenerParser),
            PriceSourceKind::Jupiter => Box::new(JupiterParser),
        }
    }

    pub fn default_api_url(self) -> &'static str {
        match self {
            PriceSourceKind::DexScreener => super::dexscreener::DEXSCREENER_API,
            PriceSourceKind::Jupiter => super::jupiter::JUPITER_PRICE_API,
        }
    }

    pub fn max_batch_size(self) -> usize {
        self.parser().max_batch_size()
    }
}

impl fmt::Display for PriceSourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceSourceKind::DexScreener => write!(f, "dexscreener"),
            PriceSourceKind::Jupiter => write!(f, "jupiter"),
        }
    }
}

/// Trim a configured base URL so paths can be appended
pub(crate) fn base(url: &str) -> &str {
    url.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Deserialize)]
    struct Wrapper {
        source: PriceSourceKind,
    }

    #[test]
    fn test_source_kind_from_config_string() {
        let w: Wrapper = toml::from_str("source = \"jupiter\"").unwrap();
        assert_eq!(w.source, PriceSourceKind::Jupiter);

        let w: Wrapper = toml::from_str("source = \"dexscreener\"").unwrap();
        assert_eq!(w.source, PriceSourceKind::DexScreener);

        assert!(toml::from_str::<Wrapper>("source = \"coingecko\"").is_err());
    }

    #[test]
    fn test_source_limits() {
        assert_eq!(PriceSourceKind::DexScreener.max_batch_size(), 30);
        assert_eq!(PriceSourceKind::Jupiter.max_batch_size(), 100);
        assert_eq!(PriceSourceKind::default(), PriceSourceKind::DexScreener);
    }

    #[test]
    fn test_display_matches_config_name() {
        assert_eq!(PriceSourceKind::Jupiter.to_string(), "jupiter");
        assert_eq!(PriceSourceKind::DexScreener.to_string(), "dexscreener");
    }

    #[test]
    fn test_base_trims_trailing_slash() {
        assert_eq!(base("https://api.dexscreener.com/"), "https://api.dexscreener.com");
        assert_eq!(base("https://api.jup.ag/price/v2"), "https://api.jup.ag/price/v2");
    }
}
