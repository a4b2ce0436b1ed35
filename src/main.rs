//! Meme Tracker - Solana wallet token valuation API

use anyhow::Result;

use meme_tracker::adapters::cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (HELIUS_API_KEY, PORT)
    dotenvy::dotenv().ok();

    let app = cli::init();
    cli::execute(app).await
}
