use serde::{Deserialize, Serialize};
use walletlens_common::constants::{PRICE_REQUEST_DELAY_MS, PRICE_TOP_N};

// ═══════════════════════════════════════════════════════════════════════
//  APP CONFIG — top-level, stored at ~/.walletlens/config.toml
// ═══════════════════════════════════════════════════════════════════════

/// Top-level configuration stored in `$HOME/.walletlens/config.toml`.
///
/// ```toml
/// [system]
/// verbose = false
/// default_chain = "eth"
///
/// [provider]
/// alchemy_api_key = "..."
/// max_attempts = 3
/// retry_base_delay_ms = 500
/// transfer_max_count = 100
/// metadata_concurrency = 8
/// request_timeout_secs = 30
///
/// [pricing]
/// coingecko_pro = false
/// top_n = 20
/// request_delay_ms = 200
/// ```
///
/// Environment variables (`ALCHEMY_API_KEY`, `COINGECKO_API_KEY`) take
/// precedence over keys stored here.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub system: SystemConfig,
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub pricing: PricingConfig,
}

// ═══════════════════════════════════════════════════════════════════════
//  SYSTEM CONFIG
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemConfig {
    /// Enable debug-level tracing output.
    #[serde(default)]
    pub verbose: bool,
    /// Chain selector used when a command omits `--chain`.
    #[serde(default = "default_chain")]
    pub default_chain: String,
}

fn default_chain() -> String {
    "eth".to_string()
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            default_chain: default_chain(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  PROVIDER CONFIG — chain-data RPC (Alchemy)
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Alchemy API key. Required for any chain-data call.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alchemy_api_key: Option<String>,
    /// Attempts per RPC call before the error is fatal.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Linear backoff unit between attempts.
    #[serde(default = "default_retry_base_delay_ms")]
    pub retry_base_delay_ms: u64,
    /// Transfers fetched per direction.
    #[serde(default = "default_transfer_max_count")]
    pub transfer_max_count: u32,
    /// Parallel metadata lookups per balances call.
    #[serde(default = "default_metadata_concurrency")]
    pub metadata_concurrency: usize,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_max_attempts() -> u32 {
    3
}
fn default_retry_base_delay_ms() -> u64 {
    500
}
fn default_transfer_max_count() -> u32 {
    100
}
fn default_metadata_concurrency() -> usize {
    8
}
fn default_request_timeout_secs() -> u64 {
    30
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            alchemy_api_key: None,
            max_attempts: default_max_attempts(),
            retry_base_delay_ms: default_retry_base_delay_ms(),
            transfer_max_count: default_transfer_max_count(),
            metadata_concurrency: default_metadata_concurrency(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  PRICING CONFIG — CoinGecko (native) + DexScreener (contracts)
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// Optional CoinGecko key; the public API is used without one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coingecko_api_key: Option<String>,
    /// Use the Pro API host instead of the Demo host when a key is set.
    #[serde(default)]
    pub coingecko_pro: bool,
    /// Contract tokens sent to the pair search, by held balance. At most 20.
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Gap between sequential pair-search requests. At least 200ms.
    #[serde(default = "default_request_delay_ms")]
    pub request_delay_ms: u64,
}

fn default_top_n() -> usize {
    PRICE_TOP_N
}
fn default_request_delay_ms() -> u64 {
    PRICE_REQUEST_DELAY_MS
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            coingecko_api_key: None,
            coingecko_pro: false,
            top_n: default_top_n(),
            request_delay_ms: default_request_delay_ms(),
        }
    }
}

impl AppConfig {
    /// Serialize to TOML for writing to disk.
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Deserialize from a TOML string. Missing sections take defaults.
    pub fn from_toml_str(s: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(s)
    }

    /// Validate value ranges the pipeline relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.provider.max_attempts == 0 {
            return Err("provider.max_attempts must be at least 1".into());
        }
        if self.provider.metadata_concurrency == 0 {
            return Err("provider.metadata_concurrency must be at least 1".into());
        }
        if self.provider.transfer_max_count == 0 {
            return Err("provider.transfer_max_count must be at least 1".into());
        }
        // DexScreener's public limit: the queue may be slowed or narrowed, never widened.
        if self.pricing.top_n > PRICE_TOP_N {
            return Err(format!("pricing.top_n must be at most {PRICE_TOP_N}"));
        }
        if self.pricing.request_delay_ms < PRICE_REQUEST_DELAY_MS {
            return Err(format!("pricing.request_delay_ms must be at least {PRICE_REQUEST_DELAY_MS}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(!config.system.verbose);
        assert_eq!(config.system.default_chain, "eth");
        assert_eq!(config.provider.max_attempts, 3);
        assert_eq!(config.provider.retry_base_delay_ms, 500);
        assert_eq!(config.pricing.top_n, 20);
        assert_eq!(config.pricing.request_delay_ms, 200);
        assert!(config.provider.alchemy_api_key.is_none());
    }

    #[test]
    fn test_config_roundtrip_toml() {
        let mut config = AppConfig::default();
        config.provider.alchemy_api_key = Some("abc".into());
        config.system.default_chain = "polygon".into();
        let s = config.to_toml_string().unwrap();
        let parsed = AppConfig::from_toml_str(&s).unwrap();
        assert_eq!(parsed.provider.alchemy_api_key.as_deref(), Some("abc"));
        assert_eq!(parsed.system.default_chain, "polygon");
    }

    #[test]
    fn test_partial_toml_takes_defaults() {
        let parsed = AppConfig::from_toml_str("[pricing]\ntop_n = 5\n").unwrap();
        assert_eq!(parsed.pricing.top_n, 5);
        assert_eq!(parsed.pricing.request_delay_ms, 200);
        assert_eq!(parsed.provider.max_attempts, 3);
        assert_eq!(parsed.system.default_chain, "eth");
    }

    #[test]
    fn test_missing_key_not_serialized() {
        let s = AppConfig::default().to_toml_string().unwrap();
        assert!(!s.contains("alchemy_api_key"));
    }

    #[test]
    fn test_validate_rejects_zero_attempts() {
        let mut config = AppConfig::default();
        assert!(config.validate().is_ok());
        config.provider.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_keeps_pair_search_throttle() {
        let mut config = AppConfig::default();
        config.pricing.request_delay_ms = 0;
        assert!(config.validate().unwrap_err().contains("request_delay_ms"));

        let mut config = AppConfig::default();
        config.pricing.top_n = 21;
        assert!(config.validate().unwrap_err().contains("top_n"));

        let mut config = AppConfig::default();
        config.pricing.top_n = 5;
        config.pricing.request_delay_ms = 1000;
        assert!(config.validate().is_ok());
    }
}
