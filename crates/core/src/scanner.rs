//! Multi-chain scanner.
//!
//! Each chain runs its balances / native balance / transfers fetch
//! concurrently, and every chain runs concurrently with the others. The
//! join is settle-all: a chain that fails becomes a failure record in its
//! own slot and never disturbs its neighbours.

use futures::future::join_all;
use serde::Serialize;
use tracing::{info, warn};
use walletlens_common::chains::{self, ChainDescriptor};
use walletlens_common::error::{LensError, LensResult};
use walletlens_common::traits::ChainDataSource;
use walletlens_common::types::{RawTokenBalance, Transfer};

/// Raw data fetched for one wallet on one chain.
#[derive(Debug, Clone, Serialize)]
pub struct ChainSnapshot {
    /// Hex wei; `"0x0"` when the native balance call degraded.
    pub native_balance: String,
    pub tokens: Vec<RawTokenBalance>,
    /// Sent and received transfers, newest first.
    pub transactions: Vec<Transfer>,
}

/// The triple fetch for one chain. Balances or transfer failures fail the
/// whole fetch; the native balance cannot.
pub async fn fetch_chain(
    source: &dyn ChainDataSource,
    chain: &ChainDescriptor,
    address: &str,
) -> LensResult<ChainSnapshot> {
    let (tokens, native_balance, transactions) = tokio::join!(
        source.token_balances(chain, address),
        source.native_balance(chain, address),
        source.transfers(chain, address),
    );

    Ok(ChainSnapshot {
        native_balance,
        tokens: tokens?,
        transactions: transactions?,
    })
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainScanResult {
    /// The chain key exactly as requested.
    pub chain: String,
    /// 0 when the key is not in the registry.
    pub chain_id: u64,
    pub chain_name: String,
    pub success: bool,
    #[serde(flatten)]
    pub snapshot: Option<ChainSnapshot>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChainScanResult {
    fn succeeded(requested: &str, chain: &ChainDescriptor, snapshot: ChainSnapshot) -> Self {
        Self {
            chain: requested.to_string(),
            chain_id: chain.chain_id,
            chain_name: chain.display_name.to_string(),
            success: true,
            snapshot: Some(snapshot),
            error: None,
        }
    }

    fn failed(requested: &str, chain: Option<&ChainDescriptor>, error: &LensError) -> Self {
        Self {
            chain: requested.to_string(),
            chain_id: chain.map(|c| c.chain_id).unwrap_or(0),
            chain_name: chain.map(|c| c.display_name).unwrap_or_default().to_string(),
            success: false,
            snapshot: None,
            error: Some(error.to_string()),
        }
    }
}

async fn scan_one(source: &dyn ChainDataSource, address: &str, requested: &str) -> ChainScanResult {
    let chain = match chains::alias_to_key(requested).map(chains::chain) {
        Some(Ok(chain)) => chain,
        Some(Err(e)) => return ChainScanResult::failed(requested, None, &e),
        None => {
            let e = LensError::UnsupportedChain(requested.to_string());
            return ChainScanResult::failed(requested, None, &e);
        }
    };

    match fetch_chain(source, chain, address).await {
        Ok(snapshot) => ChainScanResult::succeeded(requested, chain, snapshot),
        Err(e) => {
            warn!("scan of {} failed: {e}", chain.key);
            ChainScanResult::failed(requested, Some(chain), &e)
        }
    }
}

/// Scan `chain_keys` concurrently. The output has one entry per input key,
/// in input order.
pub async fn scan_chains(
    source: &dyn ChainDataSource,
    address: &str,
    chain_keys: &[String],
) -> Vec<ChainScanResult> {
    let results = join_all(
        chain_keys
            .iter()
            .map(|key| scan_one(source, address, key)),
    )
    .await;

    let ok = results.iter().filter(|r| r.success).count();
    info!("scanned {} chains for {address}: {ok} ok, {} failed", results.len(), results.len() - ok);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    const ADDR: &str = "0x000000000000000000000000000000000000dEaD";

    /// Fails balances on the listed chains; everything else succeeds after a
    /// short per-chain delay.
    #[derive(Default)]
    struct FlakySource {
        failing: Vec<&'static str>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ChainDataSource for FlakySource {
        async fn token_balances(&self, chain: &ChainDescriptor, _address: &str) -> LensResult<Vec<RawTokenBalance>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(chain.chain_id % 7 * 10)).await;
            if self.failing.contains(&chain.key) {
                return Err(LensError::RetriesExhausted {
                    operation: "alchemy_getTokenBalances".into(),
                    attempts: 3,
                    last_error: "HTTP 503".into(),
                });
            }
            Ok(vec![RawTokenBalance {
                contract_address: format!("0x{}", chain.key),
                balance_hex: "0x1".into(),
                decimals: Some(0),
                symbol: None,
                name: None,
                logo_url: None,
            }])
        }

        async fn native_balance(&self, _chain: &ChainDescriptor, _address: &str) -> String {
            "0x0".into()
        }

        async fn block_number(&self, _chain: &ChainDescriptor) -> String {
            "0x1".into()
        }

        async fn transfers(&self, _chain: &ChainDescriptor, _address: &str) -> LensResult<Vec<Transfer>> {
            Ok(Vec::new())
        }
    }

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_is_isolated_and_order_kept() {
        let source = FlakySource {
            failing: vec!["polygon"],
            ..Default::default()
        };
        let requested = keys(&["eth", "polygon", "base", "bsc"]);
        let results = scan_chains(&source, ADDR, &requested).await;

        assert_eq!(results.len(), requested.len());
        for (result, key) in results.iter().zip(&requested) {
            assert_eq!(&result.chain, key);
        }
        assert!(results[0].success);
        assert!(!results[1].success);
        assert_eq!(results[1].chain_id, 137);
        assert!(results[1].error.as_deref().unwrap().contains("503"));
        assert!(results[1].snapshot.is_none());
        assert!(results[2].success && results[3].success);
        assert_eq!(results[3].snapshot.as_ref().unwrap().tokens[0].contract_address, "0xbsc");
    }

    #[tokio::test]
    async fn test_unknown_chain_gets_failure_slot() {
        let source = FlakySource::default();
        let results = scan_chains(&source, ADDR, &keys(&["solana", "eth"])).await;

        assert_eq!(results[0].chain, "solana");
        assert!(!results[0].success);
        assert_eq!(results[0].chain_id, 0);
        assert!(results[1].success);
        // The unknown chain never reaches the provider.
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_all_failing_still_full_length() {
        let source = FlakySource {
            failing: vec!["eth", "arbitrum"],
            ..Default::default()
        };
        let results = scan_chains(&source, ADDR, &keys(&["eth", "arbitrum"])).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| !r.success && r.error.is_some()));
    }

    #[test]
    fn test_success_record_serializes_flat() {
        let eth = chains::chain("eth").unwrap();
        let record = ChainScanResult::succeeded(
            "eth",
            eth,
            ChainSnapshot {
                native_balance: "0x0".into(),
                tokens: Vec::new(),
                transactions: Vec::new(),
            },
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["native_balance"], "0x0");
        assert!(json.get("error").is_none());
    }
}
