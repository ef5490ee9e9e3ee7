//! Pipeline constants.

use std::collections::HashSet;
use std::sync::LazyLock;

/// Provider call attempts before a fetch error becomes fatal.
pub const PROVIDER_MAX_ATTEMPTS: u32 = 3;

/// Linear backoff unit: attempt `n` waits `n × 500ms` before the next try.
pub const PROVIDER_RETRY_BASE_DELAY_MS: u64 = 500;

/// Upper bound on transfers fetched per direction (sent / received).
pub const TRANSFER_MAX_COUNT: u32 = 100;

/// Parallel metadata lookups inside one token-balances call.
pub const METADATA_CONCURRENCY: usize = 8;

/// Contract tokens queried against the pair-search tier, by held balance.
pub const PRICE_TOP_N: usize = 20;

/// Gap between sequential pair-search requests.
pub const PRICE_REQUEST_DELAY_MS: u64 = 200;

/// Native assets are always 18-decimal on supported chains.
pub const NATIVE_DECIMALS: u8 = 18;

/// Metadata fallback for tokens the provider cannot describe.
pub const UNKNOWN_DECIMALS: u8 = 18;
pub const UNKNOWN_SYMBOL: &str = "UNKNOWN";
pub const UNKNOWN_NAME: &str = "Unknown Token";

/// Trailing window used by the risk scorer and the `is_active` insight.
pub const RECENT_ACTIVITY_DAYS: i64 = 30;

/// Most recent transfers carried in a report.
pub const RECENT_TRANSACTIONS_IN_REPORT: usize = 10;

/// Chain key used when the selector is missing or unrecognized.
pub const DEFAULT_CHAIN: &str = "eth";

/// USD-pegged tokens priced at exactly 1.0 (lowercase contract addresses).
pub static STABLECOINS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        // Ethereum
        "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", // USDC
        "0xdac17f958d2ee523a2206206994597c13d831ec7", // USDT
        "0x6b175474e89094c44da98b954eedeac495271d0f", // DAI
        // Polygon
        "0x3c499c542cef5e3811e1192ce70d8cc03d5c3359", // USDC
        "0x2791bca1f2de4661ed88a30c99a7a9449aa84174", // USDC.e
        "0xc2132d05d31c914a87c6611c10748aeb04b58e8f", // USDT
        "0x8f3cf7ad23cd3cadbd9735aff958023239c6a063", // DAI
        // Arbitrum
        "0xaf88d065e77c8cc2239327c5edb3a432268e5831", // USDC
        "0xff970a61a04b1ca14834a43f5de4533ebddb5cc8", // USDC.e
        "0xfd086bc7cd5c481dcc9c85ebe478a1c0b69fcbb9", // USDT
        // Arbitrum + Optimism
        "0xda10009cbd5d07dd0cecc66161fc93d7c9000da1", // DAI
        // Optimism
        "0x0b2c639c533813f4aa9d7837caf62653d097ff85", // USDC
        "0x94b008aa00579c1307b0ef2c499ad98a8ce58e58", // USDT
        // Base
        "0x833589fcd6edb6e08f4c7c32d4f71b54bda02913", // USDC
        "0x50c5725949a6f0c72e6c4a641f24049a917db0cb", // DAI
        // BNB Smart Chain
        "0x55d398326f99059ff775485246999027b3197955", // USDT
        "0x8ac76a51cc950d9822d68b83fe1ad97b32cd580d", // USDC
        "0xe9e7cea3dedca5984780bafc599bd69add087d56", // BUSD
    ]
    .into_iter()
    .collect()
});

/// Whether a contract address is in the stablecoin table (case-insensitive).
pub fn is_stablecoin(contract_address: &str) -> bool {
    STABLECOINS.contains(contract_address.to_lowercase().as_str())
}
