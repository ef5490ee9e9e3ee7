//! HTTP clients for the remote data sources.

pub mod alchemy;
pub mod coingecko;
pub mod dexscreener;
pub mod retry;

pub use alchemy::AlchemyClient;
pub use coingecko::{CoinGeckoClient, CoinGeckoTier};
pub use dexscreener::DexScreenerClient;
pub use retry::RetryPolicy;
