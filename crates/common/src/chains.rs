//! Chain registry — the static table of supported networks.
//!
//! Every chain the pipeline can analyze is listed in [`CHAINS`]. Entries are
//! `'static` and never mutated; selectors typed by users go through
//! [`resolve_selector`], which maps aliases onto registry keys.

use serde::Serialize;

use crate::constants::DEFAULT_CHAIN;
use crate::error::{LensError, LensResult};

/// One supported network and its provider endpoints.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChainDescriptor {
    /// Short registry key (`eth`, `polygon`, ...).
    pub key: &'static str,
    /// EVM chain id.
    pub chain_id: u64,
    pub display_name: &'static str,
    /// JSON-RPC endpoint without the API key path segment.
    pub endpoint_url: &'static str,
    pub explorer_url: &'static str,
    /// Gas asset symbol, uppercase.
    pub native_symbol: &'static str,
    pub native_name: &'static str,
    /// CoinGecko coin id for the gas asset.
    pub native_coingecko_id: &'static str,
    /// USD price used when the native price source is unavailable.
    pub native_fallback_price: f64,
    /// Chain identifier used by DexScreener pair listings.
    pub dex_chain_id: &'static str,
}

impl ChainDescriptor {
    /// Full RPC URL for a given API key.
    pub fn rpc_url(&self, api_key: &str) -> String {
        format!("{}/{}", self.endpoint_url.trim_end_matches('/'), api_key)
    }

    /// Block explorer page for an address.
    pub fn address_url(&self, address: &str) -> String {
        format!("{}/address/{}", self.explorer_url, address)
    }
}

pub static CHAINS: &[ChainDescriptor] = &[
    ChainDescriptor {
        key: "eth",
        chain_id: 1,
        display_name: "Ethereum",
        endpoint_url: "https://eth-mainnet.g.alchemy.com/v2",
        explorer_url: "https://etherscan.io",
        native_symbol: "ETH",
        native_name: "Ether",
        native_coingecko_id: "ethereum",
        native_fallback_price: 3000.0,
        dex_chain_id: "ethereum",
    },
    ChainDescriptor {
        key: "polygon",
        chain_id: 137,
        display_name: "Polygon",
        endpoint_url: "https://polygon-mainnet.g.alchemy.com/v2",
        explorer_url: "https://polygonscan.com",
        native_symbol: "POL",
        native_name: "Polygon Ecosystem Token",
        native_coingecko_id: "polygon-ecosystem-token",
        native_fallback_price: 0.5,
        dex_chain_id: "polygon",
    },
    ChainDescriptor {
        key: "arbitrum",
        chain_id: 42161,
        display_name: "Arbitrum One",
        endpoint_url: "https://arb-mainnet.g.alchemy.com/v2",
        explorer_url: "https://arbiscan.io",
        native_symbol: "ETH",
        native_name: "Ether",
        native_coingecko_id: "ethereum",
        native_fallback_price: 3000.0,
        dex_chain_id: "arbitrum",
    },
    ChainDescriptor {
        key: "optimism",
        chain_id: 10,
        display_name: "Optimism",
        endpoint_url: "https://opt-mainnet.g.alchemy.com/v2",
        explorer_url: "https://optimistic.etherscan.io",
        native_symbol: "ETH",
        native_name: "Ether",
        native_coingecko_id: "ethereum",
        native_fallback_price: 3000.0,
        dex_chain_id: "optimism",
    },
    ChainDescriptor {
        key: "base",
        chain_id: 8453,
        display_name: "Base",
        endpoint_url: "https://base-mainnet.g.alchemy.com/v2",
        explorer_url: "https://basescan.org",
        native_symbol: "ETH",
        native_name: "Ether",
        native_coingecko_id: "ethereum",
        native_fallback_price: 3000.0,
        dex_chain_id: "base",
    },
    ChainDescriptor {
        key: "bsc",
        chain_id: 56,
        display_name: "BNB Smart Chain",
        endpoint_url: "https://bnb-mainnet.g.alchemy.com/v2",
        explorer_url: "https://bscscan.com",
        native_symbol: "BNB",
        native_name: "BNB",
        native_coingecko_id: "binancecoin",
        native_fallback_price: 600.0,
        dex_chain_id: "bsc",
    },
];

/// Look up a chain by exact registry key.
pub fn chain(key: &str) -> LensResult<&'static ChainDescriptor> {
    CHAINS
        .iter()
        .find(|c| c.key == key)
        .ok_or_else(|| LensError::UnsupportedChain(key.to_string()))
}

/// Chain used when no selector is given.
pub fn default_chain() -> &'static ChainDescriptor {
    CHAINS
        .iter()
        .find(|c| c.key == DEFAULT_CHAIN)
        .unwrap_or(&CHAINS[0])
}

/// Map a user-supplied alias onto a registry key, case-insensitively.
pub fn alias_to_key(selector: &str) -> Option<&'static str> {
    let key = match selector.trim().to_lowercase().as_str() {
        "eth" | "ethereum" | "mainnet" => "eth",
        "polygon" | "matic" | "pol" => "polygon",
        "arbitrum" | "arb" | "arbitrum-one" => "arbitrum",
        "optimism" | "op" => "optimism",
        "base" => "base",
        "bsc" | "bnb" | "binance" | "binance-smart-chain" => "bsc",
        _ => return None,
    };
    Some(key)
}

/// Resolve a chain selector. Missing or unrecognized selectors fall back
/// to the default chain.
pub fn resolve_selector(selector: Option<&str>) -> &'static ChainDescriptor {
    resolve_selector_or(selector, default_chain())
}

/// Like [`resolve_selector`], with a caller-chosen fallback chain.
pub fn resolve_selector_or(
    selector: Option<&str>,
    fallback: &'static ChainDescriptor,
) -> &'static ChainDescriptor {
    selector
        .and_then(alias_to_key)
        .and_then(|key| chain(key).ok())
        .unwrap_or(fallback)
}
