//! Domain types shared by the provider clients and the analytics pipeline.
//!
//! Everything here is request-scoped: built fresh for one pipeline run and
//! dropped once the report is returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{UNKNOWN_DECIMALS, UNKNOWN_NAME, UNKNOWN_SYMBOL};

// ── Holdings ────────────────────────────────────────────────────────

/// Token metadata as reported by the chain-data provider.
#[derive(Deserialize, Debug, Clone, Default, Serialize)]
pub struct TokenMetadata {
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub decimals: Option<u8>,
    pub logo: Option<String>,
}

impl TokenMetadata {
    /// Metadata used when the provider lookup fails.
    pub fn unknown() -> Self {
        Self {
            name: Some(UNKNOWN_NAME.to_string()),
            symbol: Some(UNKNOWN_SYMBOL.to_string()),
            decimals: Some(UNKNOWN_DECIMALS),
            logo: None,
        }
    }
}

/// A non-zero contract-token balance, enriched with metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTokenBalance {
    pub contract_address: String,
    pub balance_hex: String,
    pub decimals: Option<u8>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub logo_url: Option<String>,
}

impl RawTokenBalance {
    pub fn with_metadata(contract_address: String, balance_hex: String, meta: TokenMetadata) -> Self {
        Self {
            contract_address,
            balance_hex,
            decimals: meta.decimals,
            symbol: meta.symbol.filter(|s| !s.is_empty()),
            name: meta.name.filter(|s| !s.is_empty()),
            logo_url: meta.logo.filter(|s| !s.is_empty()),
        }
    }

    pub fn decimals_or_default(&self) -> u8 {
        self.decimals.unwrap_or(UNKNOWN_DECIMALS)
    }

    pub fn symbol_or_default(&self) -> &str {
        self.symbol.as_deref().unwrap_or(UNKNOWN_SYMBOL)
    }

    pub fn name_or_default(&self) -> &str {
        self.name.as_deref().unwrap_or(UNKNOWN_NAME)
    }
}

/// Canonical token record: decimal-adjusted, priced once resolution runs.
///
/// `decimal_balance` is always > 0; zero balances never become tokens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedToken {
    pub symbol: String,
    pub name: String,
    pub decimal_balance: f64,
    pub raw_balance_hex: String,
    pub decimals: u8,
    pub is_native: bool,
    /// `None` for the chain's native asset.
    pub contract_address: Option<String>,
    pub logo_url: Option<String>,
    pub price_usd: f64,
    pub value_usd: f64,
    pub change_24h_percent: f64,
}

impl NormalizedToken {
    /// Key used in the price book: uppercase symbol for the native asset,
    /// lowercase contract address otherwise.
    pub fn price_key(&self) -> String {
        match &self.contract_address {
            Some(addr) if !self.is_native => addr.to_lowercase(),
            _ => self.symbol.to_uppercase(),
        }
    }
}

// ── Transfers ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContract {
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub decimal: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransferMetadata {
    #[serde(rename = "blockTimestamp", default)]
    pub block_timestamp: Option<String>,
    /// Present (and truthy) when the provider flags the transfer as failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

/// One on-chain asset transfer touching the wallet, in either direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transfer {
    #[serde(default)]
    pub hash: Option<String>,
    #[serde(rename = "blockNum", default)]
    pub block_num: Option<String>,
    #[serde(default)]
    pub from: Option<String>,
    #[serde(default)]
    pub to: Option<String>,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default)]
    pub asset: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "rawContract", default)]
    pub raw_contract: Option<RawContract>,
    #[serde(default)]
    pub metadata: Option<TransferMetadata>,
}

impl Transfer {
    /// Parsed block timestamp, if present and well-formed.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let raw = self.metadata.as_ref()?.block_timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Sort key in milliseconds; missing timestamps sort as the epoch.
    pub fn sort_key(&self) -> i64 {
        self.timestamp().map(|t| t.timestamp_millis()).unwrap_or(0)
    }

    /// A transfer is failed only when its metadata carries an explicit error.
    pub fn is_failed(&self) -> bool {
        match self.metadata.as_ref().and_then(|m| m.error.as_ref()) {
            None | Some(serde_json::Value::Null) | Some(serde_json::Value::Bool(false)) => false,
            Some(serde_json::Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        }
    }

    pub fn contract_address(&self) -> Option<&str> {
        self.raw_contract.as_ref()?.address.as_deref()
    }
}

/// Sort transfers newest first; missing timestamps go last.
pub fn sort_newest_first(transfers: &mut [Transfer]) {
    transfers.sort_by_key(|t| std::cmp::Reverse(t.sort_key()));
}

// ── Pricing ─────────────────────────────────────────────────────────

/// A resolved USD price for one asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub usd_price: f64,
    pub change_24h_percent: f64,
    pub logo_url: Option<String>,
}

impl PriceQuote {
    pub fn new(usd_price: f64, change_24h_percent: f64) -> Self {
        Self { usd_price, change_24h_percent, logo_url: None }
    }
}

/// A trading pair returned by the liquidity-aware price search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradingPair {
    pub chain_id: String,
    pub price_usd: Option<f64>,
    pub liquidity_usd: Option<f64>,
    pub change_24h_percent: Option<f64>,
    pub image_url: Option<String>,
}

// ── Analytics ───────────────────────────────────────────────────────

/// Transaction statistics derived from the wallet's transfer set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub total_transactions: usize,
    pub successful_count: usize,
    pub failed_count: usize,
    pub success_rate_percent: f64,
    pub unique_contract_count: usize,
    pub first_tx_timestamp: Option<DateTime<Utc>>,
    pub last_tx_timestamp: Option<DateTime<Utc>>,
}

/// Risk level. `Low` means low risk, i.e. a favorable (high) score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl RiskLevel {
    pub fn from_score(score: u8) -> Self {
        if score >= 70 {
            RiskLevel::Low
        } else if score >= 40 {
            RiskLevel::Medium
        } else {
            RiskLevel::High
        }
    }
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::High => write!(f, "High"),
            RiskLevel::Medium => write!(f, "Medium"),
            RiskLevel::Low => write!(f, "Low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// 0–100, higher is safer.
    pub score: u8,
    pub level: RiskLevel,
    pub factors: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn transfer_at(ts: Option<&str>) -> Transfer {
        Transfer {
            metadata: Some(TransferMetadata {
                block_timestamp: ts.map(String::from),
                error: None,
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_deserialize_alchemy_transfer() {
        let raw = json!({
            "blockNum": "0x10d4f",
            "hash": "0xabc",
            "from": "0x1111111111111111111111111111111111111111",
            "to": "0x2222222222222222222222222222222222222222",
            "value": 1.5,
            "asset": "ETH",
            "category": "external",
            "rawContract": { "value": "0x14d1120d7b160000", "address": null, "decimal": "0x12" },
            "metadata": { "blockTimestamp": "2024-03-01T12:00:00.000Z" }
        });
        let t: Transfer = serde_json::from_value(raw).unwrap();
        assert_eq!(t.hash.as_deref(), Some("0xabc"));
        assert!(t.contract_address().is_none());
        assert!(t.timestamp().is_some());
        assert!(!t.is_failed());
    }

    #[test]
    fn test_missing_timestamp_sorts_last() {
        let mut txs = vec![
            transfer_at(None),
            transfer_at(Some("2024-01-01T00:00:00Z")),
            transfer_at(Some("2024-06-01T00:00:00Z")),
        ];
        sort_newest_first(&mut txs);
        assert_eq!(
            txs[0].metadata.as_ref().unwrap().block_timestamp.as_deref(),
            Some("2024-06-01T00:00:00Z")
        );
        assert!(txs[2].timestamp().is_none());
    }

    #[test]
    fn test_error_indicator() {
        let mut t = transfer_at(Some("2024-01-01T00:00:00Z"));
        assert!(!t.is_failed());
        t.metadata.as_mut().unwrap().error = Some(json!("execution reverted"));
        assert!(t.is_failed());
        t.metadata.as_mut().unwrap().error = Some(json!(false));
        assert!(!t.is_failed());
        t.metadata.as_mut().unwrap().error = Some(json!(true));
        assert!(t.is_failed());
    }

    #[test]
    fn test_price_key() {
        let mut token = NormalizedToken {
            symbol: "eth".into(),
            name: "Ether".into(),
            decimal_balance: 1.0,
            raw_balance_hex: "0x1".into(),
            decimals: 18,
            is_native: true,
            contract_address: None,
            logo_url: None,
            price_usd: 0.0,
            value_usd: 0.0,
            change_24h_percent: 0.0,
        };
        assert_eq!(token.price_key(), "ETH");
        token.is_native = false;
        token.contract_address = Some("0xAbC".into());
        assert_eq!(token.price_key(), "0xabc");
    }

    #[test]
    fn test_risk_level_boundaries() {
        assert_eq!(RiskLevel::from_score(100), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(40), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(39), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0), RiskLevel::High);
    }
}
