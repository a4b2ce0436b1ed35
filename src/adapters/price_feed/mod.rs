//! Price Feed Adapter
//!
//! HTTP implementation of the PriceProvider port. The wire format is chosen
//! per source: DexScreener trading pairs or Jupiter's flat price map.

mod client;
mod dexscreener;
mod jupiter;
mod parser;

pub use client::{HttpPriceProvider, PriceFeedConfig};
pub use dexscreener::{DexScreenerParser, DEXSCREENER_API, DEXSCREENER_MAX_BATCH};
pub use jupiter::{JupiterParser, JUPITER_MAX_BATCH, JUPITER_PRICE_API};
pub use parser::{PriceResponseParser, PriceSourceKind};
