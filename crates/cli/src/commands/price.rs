use std::sync::Arc;

use anyhow::Result;
use walletlens_common::chains::{self, ChainDescriptor, CHAINS};
use walletlens_common::error::LensError;
use walletlens_core::clients::{CoinGeckoClient, DexScreenerClient};
use walletlens_core::workspace;
use walletlens_core::{PriceEngine, PricingSettings};

use crate::output::{render, OutputFormat, PriceOutput};

/// Accept a chain alias (`matic`, `arb`) or a native symbol (`BNB`, `POL`).
fn resolve_target(target: &str) -> Result<&'static ChainDescriptor, LensError> {
    if let Some(key) = chains::alias_to_key(target) {
        return chains::chain(key);
    }
    CHAINS
        .iter()
        .find(|c| c.native_symbol.eq_ignore_ascii_case(target.trim()))
        .ok_or_else(|| LensError::UnsupportedChain(target.to_string()))
}

/// `walletlens price <symbol-or-chain>` — native asset USD price.
///
/// Falls back to the chain's fixed price when CoinGecko is unreachable,
/// exactly as report pricing does.
pub async fn run(target: &str, fmt: OutputFormat) -> Result<()> {
    let chain = resolve_target(target)?;
    let config = workspace::effective_config()?;

    let engine = PriceEngine::new(
        Arc::new(CoinGeckoClient::from_config(&config.pricing)?),
        Arc::new(DexScreenerClient::new()?),
        PricingSettings::from(&config.pricing),
    );
    let quote = engine.native_quote(chain).await;

    render(
        fmt,
        &PriceOutput {
            chain: chain.key.to_string(),
            symbol: chain.native_symbol.to_string(),
            usd_price: quote.usd_price,
            change_24h_percent: quote.change_24h_percent,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_target() {
        assert_eq!(resolve_target("matic").unwrap().key, "polygon");
        assert_eq!(resolve_target("bnb").unwrap().key, "bsc");
        // ETH is native on several chains; the first registry entry wins.
        assert_eq!(resolve_target("ETH").unwrap().key, "eth");
        assert!(matches!(
            resolve_target("doge"),
            Err(LensError::UnsupportedChain(_))
        ));
    }
}
