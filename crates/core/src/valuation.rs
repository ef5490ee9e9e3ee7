//! Portfolio valuation — applies a [`PriceBook`] to the token list.

use serde::Serialize;
use walletlens_common::types::NormalizedToken;

use crate::pricing::PriceBook;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioValuation {
    /// Every normalized token, priced or not, highest value first.
    pub tokens: Vec<NormalizedToken>,
    pub total_value: f64,
    pub total_change_24h: f64,
    pub total_change_percent: f64,
}

impl PortfolioValuation {
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

/// Value each token at its quoted price and sum the portfolio.
///
/// Unpriced tokens stay in the list at zero value. The 24h change of a token
/// is its current value minus the value at the implied prior price
/// `price / (1 + change/100)`; a change at or below -100% has no prior price
/// and contributes nothing.
pub fn value_portfolio(tokens: Vec<NormalizedToken>, book: &PriceBook) -> PortfolioValuation {
    let mut total_value = 0.0;
    let mut total_change_24h = 0.0;

    let mut tokens: Vec<NormalizedToken> = tokens
        .into_iter()
        .map(|mut token| {
            if let Some(quote) = book.quote_for(&token) {
                token.price_usd = quote.usd_price;
                token.change_24h_percent = quote.change_24h_percent;
                token.value_usd = token.decimal_balance * quote.usd_price;
                if token.logo_url.is_none() {
                    token.logo_url = quote.logo_url.clone();
                }

                let divisor = 1.0 + quote.change_24h_percent / 100.0;
                if divisor > 0.0 && token.price_usd > 0.0 {
                    let prior_value = token.decimal_balance * (token.price_usd / divisor);
                    total_change_24h += token.value_usd - prior_value;
                }
            }
            total_value += token.value_usd;
            token
        })
        .collect();

    tokens.sort_by(|a, b| b.value_usd.total_cmp(&a.value_usd));

    let total_change_percent = if total_value > 0.0 {
        total_change_24h / total_value * 100.0
    } else {
        0.0
    };

    PortfolioValuation {
        tokens,
        total_value,
        total_change_24h,
        total_change_percent,
    }
}
