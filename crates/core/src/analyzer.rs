//! Analyzer — runs the wallet pipeline end to end.
//!
//! ```text
//!   validate address → resolve chain → fetch (balances ∥ native ∥ transfers ∥ block)
//!     → normalize → price → value → statistics → assemble report
//! ```
//!
//! The analyzer holds its data sources behind trait objects so the CLI wires
//! real HTTP clients and tests wire in-memory fakes.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};
use walletlens_common::chains::{self, ChainDescriptor};
use walletlens_common::error::{LensError, LensResult};
use walletlens_common::traits::{ChainDataSource, NativePriceSource, PairSearch};
use walletlens_common::types::PriceQuote;
use walletlens_types::config::AppConfig;

use crate::clients::{AlchemyClient, CoinGeckoClient, DexScreenerClient};
use crate::normalize::{normalize_tokens, parse_hex_u256};
use crate::pricing::{PriceEngine, PricingSettings};
use crate::report::{assemble_report, ReportInput, WalletReport};
use crate::scanner::{fetch_chain, scan_chains, ChainScanResult};
use crate::stats::compute_statistics;
use crate::valuation::value_portfolio;

/// Reject anything that is not `0x` followed by exactly 40 hex digits.
pub fn validate_address(address: &str) -> LensResult<()> {
    let valid = address.len() == 42
        && address.starts_with("0x")
        && address[2..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(LensError::InvalidAddress(address.to_string()))
    }
}

pub struct Analyzer {
    source: Arc<dyn ChainDataSource>,
    pricing: PriceEngine,
    default_chain: &'static ChainDescriptor,
}

impl Analyzer {
    pub fn new(
        source: Arc<dyn ChainDataSource>,
        native: Arc<dyn NativePriceSource>,
        pairs: Arc<dyn PairSearch>,
        settings: PricingSettings,
    ) -> Self {
        Self {
            source,
            pricing: PriceEngine::new(native, pairs, settings),
            default_chain: chains::default_chain(),
        }
    }

    /// Chain analyzed when the selector is missing or unrecognized. An
    /// unrecognized `selector` here keeps the built-in default.
    pub fn with_default_chain(mut self, selector: &str) -> Self {
        self.default_chain = chains::resolve_selector(Some(selector));
        self
    }

    /// Wire the HTTP clients. Fails before any network call when no Alchemy
    /// key is configured.
    pub fn from_config(config: &AppConfig) -> LensResult<Self> {
        let api_key = config
            .provider
            .alchemy_api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LensError::ApiKeyMissing {
                provider: "alchemy".into(),
            })?;

        let source = AlchemyClient::from_config(api_key, &config.provider)?;
        let native = CoinGeckoClient::from_config(&config.pricing)?;
        let pairs = DexScreenerClient::new()?;

        Ok(Self::new(
            Arc::new(source),
            Arc::new(native),
            Arc::new(pairs),
            PricingSettings::from(&config.pricing),
        )
        .with_default_chain(&config.system.default_chain))
    }

    /// Build the full single-chain report for `address`.
    ///
    /// `selector` goes through the alias table; unknown or missing selectors
    /// analyze the analyzer's default chain.
    pub async fn analyze(&self, address: &str, selector: Option<&str>) -> LensResult<WalletReport> {
        validate_address(address)?;
        let chain = chains::resolve_selector_or(selector, self.default_chain);
        info!(chain = chain.key, address, "analyzing wallet");

        let (snapshot, block_hex) = tokio::join!(
            fetch_chain(self.source.as_ref(), chain, address),
            self.source.block_number(chain),
        );
        let snapshot = snapshot.map_err(|e| fetch_failed(chain, e))?;
        debug!(
            tokens = snapshot.tokens.len(),
            transfers = snapshot.transactions.len(),
            "fetched {}",
            chain.key
        );

        let tokens = normalize_tokens(&snapshot.tokens, &snapshot.native_balance, chain);
        let book = self.pricing.resolve(chain, &tokens).await;
        if book.is_empty() {
            debug!("no prices resolved on {}", chain.key);
        } else {
            debug!(quotes = book.len(), "prices resolved on {}", chain.key);
        }
        let valuation = value_portfolio(tokens, &book);
        let statistics = compute_statistics(&snapshot.transactions);

        let block_number = parse_hex_u256(&block_hex)
            .ok()
            .and_then(|n| u64::try_from(n).ok())
            .unwrap_or(0);

        let report = assemble_report(
            ReportInput {
                address,
                chain,
                block_number,
                valuation,
                transfers: &snapshot.transactions,
                statistics,
            },
            Utc::now(),
        );
        info!(
            chain = chain.key,
            value = report.portfolio.total_value,
            score = report.risk.score,
            "report ready"
        );
        Ok(report)
    }

    /// Raw snapshot of `address` on every chain in `chain_keys`.
    pub async fn scan(&self, address: &str, chain_keys: &[String]) -> LensResult<Vec<ChainScanResult>> {
        validate_address(address)?;
        Ok(scan_chains(self.source.as_ref(), address, chain_keys).await)
    }

    /// Native asset USD price for one chain, with fallback.
    pub async fn native_price(&self, chain: &ChainDescriptor) -> PriceQuote {
        self.pricing.native_quote(chain).await
    }
}

fn fetch_failed(chain: &ChainDescriptor, err: LensError) -> LensError {
    if err.is_precondition() {
        return err;
    }
    LensError::ChainFetch {
        chain: chain.key.to_string(),
        message: err.to_string(),
    }
}
