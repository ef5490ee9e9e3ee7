//! Source traits — the seams between the pipeline and remote providers.
//!
//! The analyzer only talks to these traits. Production implementations live
//! in `walletlens-core::clients`; tests plug in in-memory fakes.

use async_trait::async_trait;

use crate::chains::ChainDescriptor;
use crate::error::LensResult;
use crate::types::{PriceQuote, RawTokenBalance, TradingPair, Transfer};

/// Chain-data provider operations against one chain.
#[async_trait]
pub trait ChainDataSource: Send + Sync {
    /// Non-zero contract-token balances with metadata attached.
    /// Individual tokens that cannot be described are dropped, not fatal.
    async fn token_balances(
        &self,
        chain: &ChainDescriptor,
        address: &str,
    ) -> LensResult<Vec<RawTokenBalance>>;

    /// Native balance as a hex string. Degrades to `"0x0"`; never errors.
    async fn native_balance(&self, chain: &ChainDescriptor, address: &str) -> String;

    /// Latest block number as a hex string. Degrades to `"0x0"`; never errors.
    async fn block_number(&self, chain: &ChainDescriptor) -> String;

    /// Sent and received transfers, newest first, not deduplicated.
    async fn transfers(&self, chain: &ChainDescriptor, address: &str) -> LensResult<Vec<Transfer>>;
}

/// Price source for a chain's native gas asset.
#[async_trait]
pub trait NativePriceSource: Send + Sync {
    async fn native_quote(&self, chain: &ChainDescriptor) -> LensResult<PriceQuote>;
}

/// Liquidity-aware trading pair search keyed by contract address.
#[async_trait]
pub trait PairSearch: Send + Sync {
    async fn pairs_for_token(&self, contract_address: &str) -> LensResult<Vec<TradingPair>>;
}
