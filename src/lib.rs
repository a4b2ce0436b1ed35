//! Meme Tracker - Solana wallet token valuation
//!
//! Lists a wallet's fungible token balances, prices them in rate-limited
//! batches and returns the holdings worth at least a USD floor, largest first.
//!
//! # Modules
//!
//! - `domain`: Holdings, fetch plans, price maps and the valuation policy
//! - `ports`: Trait abstractions (BalanceProvider, PriceProvider) and test mocks
//! - `adapters`: External implementations (Helius, DexScreener/Jupiter, HTTP, CLI)
//! - `config`: Configuration loading and validation
//! - `application`: Price fetcher and the valuation service

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod config;
pub mod application;
