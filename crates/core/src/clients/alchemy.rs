//! Alchemy API client — JSON-RPC chain-data calls.
//!
//! Provides per-chain EVM data: token balances, metadata, native balance,
//! block number, and asset transfers. Every call goes through the
//! fixed-attempt [`RetryPolicy`].

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use walletlens_common::chains::ChainDescriptor;
use walletlens_common::constants::{METADATA_CONCURRENCY, TRANSFER_MAX_COUNT};
use walletlens_common::error::{LensError, LensResult};
use walletlens_common::traits::ChainDataSource;
use walletlens_common::types::{sort_newest_first, RawTokenBalance, TokenMetadata, Transfer};
use walletlens_types::config::ProviderConfig;

use super::retry::{AttemptError, RetryPolicy};
use crate::normalize::parse_hex_u256;

/// Transfer categories requested from `alchemy_getAssetTransfers`.
const TRANSFER_CATEGORIES: &[&str] = &["external", "erc20"];

/// Alchemy client, usable against any chain in the registry.
#[derive(Clone)]
pub struct AlchemyClient {
    http: Client,
    api_key: String,
    retry: RetryPolicy,
    transfer_max_count: u32,
    metadata_concurrency: usize,
}

// ── JSON-RPC Types ──────────────────────────────────────────────────

#[derive(Serialize)]
struct JsonRpcRequest<'a, T: Serialize> {
    jsonrpc: &'a str,
    method: &'a str,
    params: T,
    id: u64,
}

#[derive(Deserialize, Debug)]
struct JsonRpcResponse<T> {
    result: Option<T>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize, Debug)]
struct JsonRpcError {
    code: i64,
    message: String,
}

// ── Token API Response Types ────────────────────────────────────────

#[derive(Deserialize, Debug, Clone)]
struct TokenBalance {
    #[serde(rename = "contractAddress")]
    contract_address: String,
    #[serde(rename = "tokenBalance")]
    token_balance: Option<String>,
    error: Option<String>,
}

#[derive(Deserialize, Debug, Clone)]
struct TokenBalancesResult {
    #[serde(rename = "tokenBalances")]
    token_balances: Vec<TokenBalance>,
}

// ── Transfers API Types ─────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TransferDirection {
    Sent,
    Received,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AssetTransfersParams<'a> {
    from_block: &'a str,
    to_block: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    from_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to_address: Option<&'a str>,
    category: &'static [&'static str],
    with_metadata: bool,
    exclude_zero_value: bool,
    max_count: String,
}

#[derive(Deserialize, Debug)]
struct AssetTransfersResult {
    #[serde(default)]
    transfers: Vec<Transfer>,
}

impl AlchemyClient {
    /// Create a client with default retry and fetch limits.
    pub fn new(api_key: &str) -> LensResult<Self> {
        Self::build(api_key, Duration::from_secs(30))
    }

    /// Create a client from the `[provider]` config section.
    pub fn from_config(api_key: &str, config: &ProviderConfig) -> LensResult<Self> {
        let mut client = Self::build(api_key, Duration::from_secs(config.request_timeout_secs))?;
        client.retry = RetryPolicy {
            max_attempts: config.max_attempts,
            base_delay: Duration::from_millis(config.retry_base_delay_ms),
        };
        client.transfer_max_count = config.transfer_max_count;
        client.metadata_concurrency = config.metadata_concurrency;
        Ok(client)
    }

    fn build(api_key: &str, timeout: Duration) -> LensResult<Self> {
        if api_key.trim().is_empty() {
            return Err(LensError::ApiKeyMissing { provider: "alchemy".into() });
        }
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LensError::Internal(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.to_string(),
            retry: RetryPolicy::default(),
            transfer_max_count: TRANSFER_MAX_COUNT,
            metadata_concurrency: METADATA_CONCURRENCY,
        })
    }

    /// Execute a JSON-RPC call, retrying transport failures and non-2xx statuses.
    async fn rpc_call<P, R>(&self, chain: &ChainDescriptor, method: &str, params: P) -> LensResult<R>
    where
        P: Serialize + Send + Sync,
        R: DeserializeOwned + Send,
    {
        let url = chain.rpc_url(&self.api_key);
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            method,
            params,
            id: 1,
        };
        let operation = format!("{method} on {}", chain.key);

        let http = &self.http;
        let url = url.as_str();
        let body = &body;
        let response: JsonRpcResponse<R> = self
            .retry
            .run(&operation, || async move {
                let resp = http
                    .post(url)
                    .json(body)
                    .send()
                    .await
                    .map_err(|e| AttemptError::Retryable(e.without_url().to_string()))?;

                let status = resp.status();
                if !status.is_success() {
                    return Err(AttemptError::Retryable(format!("HTTP {status}")));
                }

                resp.json::<JsonRpcResponse<R>>()
                    .await
                    .map_err(|e| AttemptError::Fatal(LensError::Decode(e.without_url().to_string())))
            })
            .await?;

        if let Some(err) = response.error {
            return Err(LensError::Rpc {
                code: err.code,
                message: err.message,
            });
        }

        response
            .result
            .ok_or_else(|| LensError::Decode(format!("{operation} returned null result")))
    }

    // ── Token API ───────────────────────────────────────────────

    /// Raw ERC-20 balances, zero entries included.
    async fn get_token_balances(
        &self,
        chain: &ChainDescriptor,
        address: &str,
    ) -> LensResult<TokenBalancesResult> {
        self.rpc_call(chain, "alchemy_getTokenBalances", (address, "erc20"))
            .await
    }

    /// Token metadata (name, symbol, decimals, logo).
    async fn get_token_metadata(
        &self,
        chain: &ChainDescriptor,
        contract_address: &str,
    ) -> LensResult<TokenMetadata> {
        self.rpc_call(chain, "alchemy_getTokenMetadata", [contract_address])
            .await
    }

    // ── Transfers API ───────────────────────────────────────────

    async fn get_asset_transfers(
        &self,
        chain: &ChainDescriptor,
        address: &str,
        direction: TransferDirection,
    ) -> LensResult<Vec<Transfer>> {
        let params = AssetTransfersParams {
            from_block: "0x0",
            to_block: "latest",
            from_address: (direction == TransferDirection::Sent).then_some(address),
            to_address: (direction == TransferDirection::Received).then_some(address),
            category: TRANSFER_CATEGORIES,
            with_metadata: true,
            exclude_zero_value: true,
            max_count: format!("{:#x}", self.transfer_max_count),
        };
        let result: AssetTransfersResult = self
            .rpc_call(chain, "alchemy_getAssetTransfers", [params])
            .await?;
        debug!(
            "{} {:?} transfers on {}",
            result.transfers.len(),
            direction,
            chain.key
        );
        Ok(result.transfers)
    }
}

#[async_trait]
impl ChainDataSource for AlchemyClient {
    async fn token_balances(
        &self,
        chain: &ChainDescriptor,
        address: &str,
    ) -> LensResult<Vec<RawTokenBalance>> {
        let raw = self.get_token_balances(chain, address).await?;
        let balances = enrich_balances(
            raw.token_balances,
            self.metadata_concurrency,
            move |contract: String| async move { self.get_token_metadata(chain, &contract).await },
        )
        .await;
        debug!("{} non-zero token balances on {}", balances.len(), chain.key);
        Ok(balances)
    }

    async fn native_balance(&self, chain: &ChainDescriptor, address: &str) -> String {
        match self
            .rpc_call::<_, String>(chain, "eth_getBalance", (address, "latest"))
            .await
        {
            Ok(hex) => hex,
            Err(e) => {
                warn!("native balance unavailable on {}: {e}", chain.key);
                "0x0".to_string()
            }
        }
    }

    async fn block_number(&self, chain: &ChainDescriptor) -> String {
        match self
            .rpc_call::<_, String>(chain, "eth_blockNumber", serde_json::json!([]))
            .await
        {
            Ok(hex) => hex,
            Err(e) => {
                warn!("block number unavailable on {}: {e}", chain.key);
                "0x0".to_string()
            }
        }
    }

    async fn transfers(&self, chain: &ChainDescriptor, address: &str) -> LensResult<Vec<Transfer>> {
        let (sent, received) = tokio::try_join!(
            self.get_asset_transfers(chain, address, TransferDirection::Sent),
            self.get_asset_transfers(chain, address, TransferDirection::Received),
        )?;
        let mut all = sent;
        all.extend(received);
        sort_newest_first(&mut all);
        Ok(all)
    }
}

/// Keep non-zero balances and attach metadata to each.
///
/// Entries the provider flags with an error, or whose balance is missing or
/// malformed, are dropped. A failed metadata lookup degrades that token to
/// [`TokenMetadata::unknown`]. Provider order is preserved.
async fn enrich_balances<F, Fut>(
    entries: Vec<TokenBalance>,
    concurrency: usize,
    fetch_metadata: F,
) -> Vec<RawTokenBalance>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = LensResult<TokenMetadata>>,
{
    let candidates: Vec<(String, String)> = entries.into_iter().filter_map(usable_balance).collect();

    stream::iter(candidates)
        .map(|(contract, balance_hex)| {
            let lookup = fetch_metadata(contract.clone());
            async move {
                let meta = match lookup.await {
                    Ok(meta) => meta,
                    Err(e) => {
                        warn!("metadata lookup failed for {contract}: {e}");
                        TokenMetadata::unknown()
                    }
                };
                RawTokenBalance::with_metadata(contract, balance_hex, meta)
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await
}

fn usable_balance(entry: TokenBalance) -> Option<(String, String)> {
    if let Some(err) = entry.error {
        debug!("skipping {}: provider error {err}", entry.contract_address);
        return None;
    }
    let hex = entry.token_balance?;
    match parse_hex_u256(&hex) {
        Ok(value) if value.is_zero() => None,
        Ok(_) => Some((entry.contract_address, hex)),
        Err(e) => {
            warn!("skipping {}: {e}", entry.contract_address);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(contract: &str, balance: Option<&str>, error: Option<&str>) -> TokenBalance {
        TokenBalance {
            contract_address: contract.to_string(),
            token_balance: balance.map(String::from),
            error: error.map(String::from),
        }
    }

    fn meta(symbol: &str, decimals: u8) -> TokenMetadata {
        TokenMetadata {
            name: Some(format!("{symbol} Token")),
            symbol: Some(symbol.to_string()),
            decimals: Some(decimals),
            logo: None,
        }
    }

    #[tokio::test]
    async fn test_zero_balances_are_excluded() {
        let entries = vec![
            entry("0xa", Some("0x0"), None),
            entry("0xb", Some("0x0000000000000000000000000000000000000000000000000000000000000000"), None),
            entry("0xc", Some("0x64"), None),
        ];
        let out = enrich_balances(entries, 4, |_| async { Ok(meta("CCC", 6)) }).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].contract_address, "0xc");
        assert_eq!(out[0].decimals, Some(6));
    }

    #[tokio::test]
    async fn test_metadata_failure_degrades_single_token() {
        let entries = vec![entry("0xa", Some("0x1"), None), entry("0xb", Some("0x2"), None)];
        let out = enrich_balances(entries, 4, |contract| async move {
            if contract == "0xa" {
                Err(LensError::Network("reset".into()))
            } else {
                Ok(meta("BBB", 8))
            }
        })
        .await;

        assert_eq!(out.len(), 2);
        assert_eq!(out[0].symbol_or_default(), "UNKNOWN");
        assert_eq!(out[0].name_or_default(), "Unknown Token");
        assert_eq!(out[0].decimals_or_default(), 18);
        assert_eq!(out[1].symbol.as_deref(), Some("BBB"));
    }

    #[tokio::test]
    async fn test_unusable_entries_are_dropped() {
        let entries = vec![
            entry("0xa", None, None),
            entry("0xb", Some("0x5"), Some("execution reverted")),
            entry("0xc", Some("0xzz"), None),
            entry("0xd", Some("0x5"), None),
        ];
        let out = enrich_balances(entries, 1, |_| async { Ok(meta("DDD", 18)) }).await;
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].contract_address, "0xd");
    }

    #[tokio::test]
    async fn test_order_preserved_with_concurrency() {
        let entries: Vec<_> = (1..=10)
            .map(|i| entry(&format!("0x{i:x}"), Some("0x1"), None))
            .collect();
        let out = enrich_balances(entries, 3, |c| async move { Ok(meta(&c, 18)) }).await;
        let contracts: Vec<_> = out.iter().map(|b| b.contract_address.clone()).collect();
        let expected: Vec<_> = (1..=10).map(|i| format!("0x{i:x}")).collect();
        assert_eq!(contracts, expected);
    }

    #[test]
    fn test_transfer_params_shape() {
        let params = AssetTransfersParams {
            from_block: "0x0",
            to_block: "latest",
            from_address: Some("0xabc"),
            to_address: None,
            category: TRANSFER_CATEGORIES,
            with_metadata: true,
            exclude_zero_value: true,
            max_count: format!("{:#x}", 100u32),
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json["fromAddress"], "0xabc");
        assert!(json.get("toAddress").is_none());
        assert_eq!(json["maxCount"], "0x64");
        assert_eq!(json["excludeZeroValue"], true);
        assert_eq!(json["withMetadata"], true);
    }

    #[test]
    fn test_empty_api_key_is_precondition_error() {
        let err = AlchemyClient::new("  ").err().unwrap();
        assert!(matches!(err, LensError::ApiKeyMissing { .. }));
    }
}
