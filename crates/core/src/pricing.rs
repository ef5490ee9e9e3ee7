//! Price resolution — tiered USD quotes for one chain's token list.
//!
//! Tiers run in a fixed order and each one only sees what the previous
//! tiers left unpriced:
//!
//! 1. **Native**: CoinGecko `simple/price`; any failure falls back to the
//!    chain's fixed default price.
//! 2. **Stablecoins**: static address table → exactly 1.0 USD, 0% change.
//! 3. **Contracts**: DexScreener pair search for the top-N remaining tokens
//!    by balance, one request at a time through a [`RateLimitedQueue`].
//!
//! Resolution never fails. Tokens nobody could price are simply absent from
//! the [`PriceBook`] and value at zero downstream.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use walletlens_common::chains::ChainDescriptor;
use walletlens_common::constants::{is_stablecoin, PRICE_REQUEST_DELAY_MS, PRICE_TOP_N};
use walletlens_common::traits::{NativePriceSource, PairSearch};
use walletlens_common::types::{NormalizedToken, PriceQuote, TradingPair};
use walletlens_types::config::PricingConfig;

use crate::throttle::RateLimitedQueue;

/// Progress marker of one resolution run. Every stage is entered exactly
/// once, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PricingStage {
    Init,
    NativePriced,
    StablecoinsPriced,
    ContractsPriced,
    Done,
}

#[derive(Debug, Clone, Copy)]
pub struct PricingSettings {
    /// Contract tokens sent to the pair search per run.
    pub top_n: usize,
    /// Pause between consecutive pair-search requests.
    pub request_delay: Duration,
}

impl Default for PricingSettings {
    fn default() -> Self {
        Self {
            top_n: PRICE_TOP_N,
            request_delay: Duration::from_millis(PRICE_REQUEST_DELAY_MS),
        }
    }
}

impl From<&PricingConfig> for PricingSettings {
    fn from(config: &PricingConfig) -> Self {
        Self {
            top_n: config.top_n,
            request_delay: Duration::from_millis(config.request_delay_ms),
        }
    }
}

/// Quotes resolved in one run, keyed by [`NormalizedToken::price_key`].
#[derive(Debug, Clone)]
pub struct PriceBook {
    quotes: HashMap<String, PriceQuote>,
    stage: PricingStage,
}

impl PriceBook {
    fn new() -> Self {
        Self {
            quotes: HashMap::new(),
            stage: PricingStage::Init,
        }
    }

    pub fn quote_for(&self, token: &NormalizedToken) -> Option<&PriceQuote> {
        self.quotes.get(&token.price_key())
    }

    pub fn get(&self, key: &str) -> Option<&PriceQuote> {
        self.quotes.get(key)
    }

    pub fn stage(&self) -> PricingStage {
        self.stage
    }

    pub fn len(&self) -> usize {
        self.quotes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quotes.is_empty()
    }

    fn is_priced(&self, token: &NormalizedToken) -> bool {
        self.quotes.contains_key(&token.price_key())
    }

    fn advance(&mut self, next: PricingStage) {
        debug!("pricing stage {:?} -> {next:?}", self.stage);
        self.stage = next;
    }
}

pub struct PriceEngine {
    native: Arc<dyn NativePriceSource>,
    pairs: Arc<dyn PairSearch>,
    settings: PricingSettings,
}

impl PriceEngine {
    pub fn new(
        native: Arc<dyn NativePriceSource>,
        pairs: Arc<dyn PairSearch>,
        settings: PricingSettings,
    ) -> Self {
        Self { native, pairs, settings }
    }

    /// Native price alone, with the per-chain fallback on failure.
    pub async fn native_quote(&self, chain: &ChainDescriptor) -> PriceQuote {
        match self.native.native_quote(chain).await {
            Ok(quote) => quote,
            Err(e) => {
                warn!(
                    "{} price unavailable ({e}); using fallback ${}",
                    chain.native_symbol, chain.native_fallback_price
                );
                PriceQuote::new(chain.native_fallback_price, 0.0)
            }
        }
    }

    pub async fn resolve(&self, chain: &ChainDescriptor, tokens: &[NormalizedToken]) -> PriceBook {
        let mut book = PriceBook::new();

        // ── Native ──
        if let Some(native) = tokens.iter().find(|t| t.is_native) {
            let quote = self.native_quote(chain).await;
            book.quotes.insert(native.price_key(), quote);
        }
        book.advance(PricingStage::NativePriced);

        // ── Stablecoins ──
        for token in tokens.iter().filter(|t| !t.is_native) {
            if let Some(addr) = &token.contract_address {
                if is_stablecoin(addr) {
                    book.quotes.insert(token.price_key(), PriceQuote::new(1.0, 0.0));
                }
            }
        }
        book.advance(PricingStage::StablecoinsPriced);

        // ── Contracts ──
        let candidates: Vec<&NormalizedToken> = tokens
            .iter()
            .filter(|t| !t.is_native && t.contract_address.is_some() && !book.is_priced(t))
            .collect();
        let mut queue = RateLimitedQueue::new(self.settings.request_delay);
        queue.extend(select_top_n(&candidates, self.settings.top_n));
        if candidates.len() > queue.len() {
            info!(
                "pricing top {} of {} contract tokens on {}",
                queue.len(),
                candidates.len(),
                chain.key
            );
        }
        let pairs = self.pairs.as_ref();
        let lookups = queue
            .drain(move |address: String| async move { pairs.pairs_for_token(&address).await })
            .await;

        for (address, result) in lookups {
            match result {
                Ok(found) => match best_pair(&found, chain.dex_chain_id) {
                    Some(pair) => {
                        let mut quote = PriceQuote::new(
                            pair.price_usd.unwrap_or(0.0),
                            pair.change_24h_percent.unwrap_or(0.0),
                        );
                        quote.logo_url = pair.image_url.clone();
                        book.quotes.insert(address, quote);
                    }
                    None => debug!("no {} pair for {address}", chain.dex_chain_id),
                },
                Err(e) => warn!("price lookup for {address} failed: {e}"),
            }
        }
        book.advance(PricingStage::ContractsPriced);

        book.advance(PricingStage::Done);
        book
    }
}

/// Lowercase addresses of the `n` largest holdings, largest first; equal
/// balances order by address so the selection is reproducible. An address
/// listed more than once ranks by its largest balance.
pub fn select_top_n(tokens: &[&NormalizedToken], n: usize) -> Vec<String> {
    let mut ranked: Vec<(f64, String)> = tokens
        .iter()
        .filter_map(|t| {
            t.contract_address
                .as_ref()
                .map(|a| (t.decimal_balance, a.to_lowercase()))
        })
        .collect();
    ranked.sort_by(|a, b| {
        b.0.partial_cmp(&a.0)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.1.cmp(&b.1))
    });
    let mut seen = HashSet::new();
    ranked.retain(|(_, addr)| seen.insert(addr.clone()));
    ranked.into_iter().take(n).map(|(_, addr)| addr).collect()
}

/// Deepest priced pair on `dex_chain_id`. Missing liquidity counts as zero;
/// on a tie the earlier pair wins.
pub fn best_pair<'a>(pairs: &'a [TradingPair], dex_chain_id: &str) -> Option<&'a TradingPair> {
    pairs
        .iter()
        .filter(|p| p.chain_id == dex_chain_id && p.price_usd.is_some())
        .fold(None, |best: Option<&TradingPair>, pair| match best {
            Some(b) if b.liquidity_usd.unwrap_or(0.0) >= pair.liquidity_usd.unwrap_or(0.0) => Some(b),
            _ => Some(pair),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use walletlens_common::chains;
    use walletlens_common::error::{LensError, LensResult};

    const USDC_ETH: &str = "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48";

    struct FixedNative(Option<f64>);

    #[async_trait]
    impl NativePriceSource for FixedNative {
        async fn native_quote(&self, _chain: &ChainDescriptor) -> LensResult<PriceQuote> {
            match self.0 {
                Some(p) => Ok(PriceQuote::new(p, 2.0)),
                None => Err(LensError::PriceSource {
                    source_name: "test".into(),
                    message: "down".into(),
                }),
            }
        }
    }

    /// Records every queried address; answers from a fixed table.
    #[derive(Default)]
    struct RecordingPairs {
        table: HashMap<String, Vec<TradingPair>>,
        queried: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl PairSearch for RecordingPairs {
        async fn pairs_for_token(&self, contract_address: &str) -> LensResult<Vec<TradingPair>> {
            self.queried.lock().unwrap().push(contract_address.to_string());
            Ok(self.table.get(contract_address).cloned().unwrap_or_default())
        }
    }

    fn pair(chain: &str, price: Option<f64>, liquidity: Option<f64>) -> TradingPair {
        TradingPair {
            chain_id: chain.into(),
            price_usd: price,
            liquidity_usd: liquidity,
            change_24h_percent: Some(1.5),
            image_url: None,
        }
    }

    fn token(address: &str, balance: f64) -> NormalizedToken {
        NormalizedToken {
            symbol: "TKN".into(),
            name: "Token".into(),
            decimal_balance: balance,
            raw_balance_hex: "0x1".into(),
            decimals: 18,
            is_native: false,
            contract_address: Some(address.into()),
            logo_url: None,
            price_usd: 0.0,
            value_usd: 0.0,
            change_24h_percent: 0.0,
        }
    }

    fn native(balance: f64) -> NormalizedToken {
        NormalizedToken {
            symbol: "ETH".into(),
            name: "Ether".into(),
            is_native: true,
            contract_address: None,
            ..token("", balance)
        }
    }

    fn engine(native_price: Option<f64>, pairs: Arc<RecordingPairs>, top_n: usize) -> PriceEngine {
        PriceEngine::new(
            Arc::new(FixedNative(native_price)),
            pairs,
            PricingSettings {
                top_n,
                request_delay: Duration::from_millis(200),
            },
        )
    }

    #[test]
    fn test_best_pair_prefers_liquidity_on_target_chain() {
        let pairs = vec![
            pair("bsc", Some(9.0), Some(1_000_000.0)),
            pair("ethereum", Some(1.0), Some(10.0)),
            pair("ethereum", None, Some(5_000_000.0)),
            pair("ethereum", Some(2.0), Some(500.0)),
            pair("ethereum", Some(3.0), Some(500.0)),
        ];
        let best = best_pair(&pairs, "ethereum").unwrap();
        assert_eq!(best.price_usd, Some(2.0));
        assert!(best_pair(&pairs, "polygon").is_none());
    }

    #[test]
    fn test_best_pair_missing_liquidity_is_zero() {
        let pairs = vec![pair("base", Some(4.0), None), pair("base", Some(5.0), Some(1.0))];
        assert_eq!(best_pair(&pairs, "base").unwrap().price_usd, Some(5.0));
    }

    #[test]
    fn test_top_n_is_deterministic() {
        let a = token("0xAAA", 5.0);
        let b = token("0xbbb", 50.0);
        let c = token("0xccc", 5.0);
        let d = token("0xddd", 1.0);

        let forward = select_top_n(&[&a, &b, &c, &d], 3);
        let reversed = select_top_n(&[&d, &c, &b, &a], 3);
        assert_eq!(forward, vec!["0xbbb", "0xaaa", "0xccc"]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn test_top_n_repeated_address_selected_once() {
        let big = token("0xAAA", 40.0);
        let other = token("0xbbb", 10.0);
        let small = token("0xaaa", 1.0);

        let selected = select_top_n(&[&big, &other, &small], 3);
        assert_eq!(selected, vec!["0xaaa", "0xbbb"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stablecoins_never_reach_pair_search() {
        let mut table = HashMap::new();
        table.insert(USDC_ETH.to_string(), vec![pair("ethereum", Some(0.97), Some(1e9))]);
        let pairs = Arc::new(RecordingPairs { table, ..Default::default() });
        let engine = engine(Some(3000.0), pairs.clone(), 20);

        let eth = chains::chain("eth").unwrap();
        let usdc = token("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48", 250.0);
        let book = engine.resolve(eth, &[native(1.0), usdc.clone()]).await;

        let quote = book.quote_for(&usdc).unwrap();
        assert_eq!(quote.usd_price, 1.0);
        assert_eq!(quote.change_24h_percent, 0.0);
        assert!(pairs.queried.lock().unwrap().is_empty());
        assert_eq!(book.get("ETH").unwrap().usd_price, 3000.0);
        assert_eq!(book.stage(), PricingStage::Done);
    }

    #[tokio::test(start_paused = true)]
    async fn test_native_failure_uses_fallback() {
        let engine = engine(None, Arc::new(RecordingPairs::default()), 20);
        let bsc = chains::chain("bsc").unwrap();
        let mut bnb = native(2.0);
        bnb.symbol = "BNB".into();
        let book = engine.resolve(bsc, &[bnb]).await;
        assert_eq!(book.get("BNB").unwrap().usd_price, bsc.native_fallback_price);
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_top_n_queried_in_order() {
        let pairs = Arc::new(RecordingPairs::default());
        let engine = engine(Some(1.0), pairs.clone(), 2);
        let eth = chains::chain("eth").unwrap();

        let tokens = vec![
            token("0x01", 1.0),
            token("0x02", 30.0),
            token("0x03", 20.0),
            token("0x04", 30.0),
        ];
        let start = tokio::time::Instant::now();
        engine.resolve(eth, &tokens).await;

        assert_eq!(*pairs.queried.lock().unwrap(), vec!["0x02", "0x04"]);
        assert_eq!(start.elapsed(), Duration::from_millis(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_token_without_pair_stays_unpriced() {
        let mut table = HashMap::new();
        table.insert("0xfeed".to_string(), vec![pair("bsc", Some(2.0), Some(1e6))]);
        table.insert("0xbeef".to_string(), vec![pair("ethereum", Some(0.5), Some(10.0))]);
        let pairs = Arc::new(RecordingPairs { table, ..Default::default() });
        let engine = engine(Some(1.0), pairs.clone(), 20);
        let eth = chains::chain("eth").unwrap();

        let orphan = token("0xfeed", 7.0);
        let listed = token("0xbeef", 3.0);
        let book = engine.resolve(eth, &[orphan.clone(), listed.clone()]).await;

        assert!(book.quote_for(&orphan).is_none());
        assert_eq!(book.quote_for(&listed).unwrap().usd_price, 0.5);
        assert_eq!(pairs.queried.lock().unwrap().len(), 2);
    }
}
