//! DexScreener client — liquidity-aware pair search by token address.
//!
//! Public API, no key. `GET /latest/dex/tokens/{address}` lists every pair
//! that trades the token, across all chains.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use walletlens_common::error::{LensError, LensResult};
use walletlens_common::traits::PairSearch;
use walletlens_common::types::TradingPair;

const DEXSCREENER_API_BASE: &str = "https://api.dexscreener.com";
const SOURCE: &str = "dexscreener";

#[derive(Clone)]
pub struct DexScreenerClient {
    http: Client,
}

// ── Response Types ──────────────────────────────────────────────────

#[derive(Deserialize, Debug)]
struct TokenPairsResponse {
    #[serde(default)]
    pairs: Option<Vec<DexPair>>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DexPair {
    pub chain_id: String,
    /// Decimal string, e.g. `"0.0421"`.
    #[serde(default)]
    pub price_usd: Option<String>,
    #[serde(default)]
    pub liquidity: Option<DexLiquidity>,
    #[serde(default)]
    pub price_change: Option<DexPriceChange>,
    #[serde(default)]
    pub info: Option<DexPairInfo>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DexLiquidity {
    pub usd: Option<f64>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct DexPriceChange {
    pub h24: Option<f64>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DexPairInfo {
    pub image_url: Option<String>,
}

impl From<DexPair> for TradingPair {
    fn from(pair: DexPair) -> Self {
        TradingPair {
            chain_id: pair.chain_id,
            price_usd: pair
                .price_usd
                .and_then(|p| p.parse::<f64>().ok())
                .filter(|p| p.is_finite()),
            liquidity_usd: pair.liquidity.and_then(|l| l.usd),
            change_24h_percent: pair.price_change.and_then(|c| c.h24),
            image_url: pair.info.and_then(|i| i.image_url),
        }
    }
}

impl DexScreenerClient {
    pub fn new() -> LensResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| LensError::Internal(format!("Failed to build DexScreener HTTP client: {e}")))?;
        Ok(Self { http })
    }
}

#[async_trait]
impl PairSearch for DexScreenerClient {
    async fn pairs_for_token(&self, contract_address: &str) -> LensResult<Vec<TradingPair>> {
        let url = format!("{DEXSCREENER_API_BASE}/latest/dex/tokens/{contract_address}");
        let resp = self.http.get(&url).send().await.map_err(|e| LensError::PriceSource {
            source_name: SOURCE.into(),
            message: e.to_string(),
        })?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LensError::PriceSource {
                source_name: SOURCE.into(),
                message: format!("HTTP {status}"),
            });
        }

        let body: TokenPairsResponse = resp.json().await.map_err(|e| LensError::PriceSource {
            source_name: SOURCE.into(),
            message: e.to_string(),
        })?;

        Ok(body
            .pairs
            .unwrap_or_default()
            .into_iter()
            .map(TradingPair::from)
            .collect())
    }
}
