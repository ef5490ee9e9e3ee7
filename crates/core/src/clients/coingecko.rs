//! CoinGecko client — native-asset USD prices.
//!
//! Works keyless against the public host; with a key it authenticates as
//! Demo (x-cg-demo-api-key) or Pro (x-cg-pro-api-key).

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use walletlens_common::chains::ChainDescriptor;
use walletlens_common::error::{LensError, LensResult};
use walletlens_common::traits::NativePriceSource;
use walletlens_common::types::PriceQuote;
use walletlens_types::config::PricingConfig;

const SOURCE: &str = "coingecko";

/// CoinGecko API tier — determines base URL and auth header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoinGeckoTier {
    /// Demo (free) API: api.coingecko.com/api/v3
    Demo,
    /// Pro (paid) API: pro-api.coingecko.com/api/v3
    Pro,
}

#[derive(Clone)]
pub struct CoinGeckoClient {
    http: Client,
    api_key: Option<String>,
    tier: CoinGeckoTier,
}

/// One entry of `/simple/price`: `{"usd": 3000.1, "usd_24h_change": -1.2}`.
#[derive(Deserialize, Debug, Clone)]
pub struct SimplePrice {
    pub usd: Option<f64>,
    pub usd_24h_change: Option<f64>,
}

impl CoinGeckoClient {
    pub fn new(api_key: Option<&str>, tier: CoinGeckoTier) -> LensResult<Self> {
        let http = Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| LensError::Internal(format!("Failed to build CoinGecko HTTP client: {e}")))?;

        Ok(Self {
            http,
            api_key: api_key.filter(|k| !k.is_empty()).map(String::from),
            tier,
        })
    }

    pub fn from_config(config: &PricingConfig) -> LensResult<Self> {
        let tier = if config.coingecko_pro {
            CoinGeckoTier::Pro
        } else {
            CoinGeckoTier::Demo
        };
        Self::new(config.coingecko_api_key.as_deref(), tier)
    }

    fn base_url(&self) -> &str {
        match self.tier {
            CoinGeckoTier::Pro if self.api_key.is_some() => "https://pro-api.coingecko.com/api/v3",
            _ => "https://api.coingecko.com/api/v3",
        }
    }

    fn auth_header(&self) -> &str {
        match self.tier {
            CoinGeckoTier::Demo => "x-cg-demo-api-key",
            CoinGeckoTier::Pro => "x-cg-pro-api-key",
        }
    }

    /// `/simple/price` for a set of coin ids, USD with 24h change.
    pub async fn simple_price(&self, ids: &[&str]) -> LensResult<HashMap<String, SimplePrice>> {
        let url = format!("{}/simple/price", self.base_url());
        let ids = ids.join(",");
        let mut req = self.http.get(&url).query(&[
            ("ids", ids.as_str()),
            ("vs_currencies", "usd"),
            ("include_24hr_change", "true"),
        ]);
        if let Some(key) = &self.api_key {
            req = req.header(self.auth_header(), key);
        }

        let resp = req.send().await.map_err(|e| price_error(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(price_error(format!("HTTP {status}")));
        }
        resp.json().await.map_err(|e| price_error(e.to_string()))
    }
}

fn price_error(message: String) -> LensError {
    LensError::PriceSource {
        source_name: SOURCE.into(),
        message,
    }
}

/// Pick the quote for `coin_id` out of a `/simple/price` response.
pub(crate) fn quote_from_simple_price(
    prices: &HashMap<String, SimplePrice>,
    coin_id: &str,
) -> LensResult<PriceQuote> {
    let entry = prices
        .get(coin_id)
        .ok_or_else(|| price_error(format!("no price for {coin_id}")))?;
    let usd = entry
        .usd
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| price_error(format!("no usd price for {coin_id}")))?;
    Ok(PriceQuote::new(usd, entry.usd_24h_change.unwrap_or(0.0)))
}

#[async_trait]
impl NativePriceSource for CoinGeckoClient {
    async fn native_quote(&self, chain: &ChainDescriptor) -> LensResult<PriceQuote> {
        let prices = self.simple_price(&[chain.native_coingecko_id]).await?;
        quote_from_simple_price(&prices, chain.native_coingecko_id)
    }
}
