//! Configuration Module
//!
//! Loads and validates configuration from TOML files, with `HELIUS_API_KEY`
//! and `PORT` taken from the environment when set.

pub mod loader;

pub use loader::{
    default_config, load_config, parse_config, BalancesSection, Config, ConfigError,
    LoggingSection, PricesSection, ServerSection, ValuationSection,
};
