//! Token normalization — raw hex balances → decimal-adjusted token records.
//!
//! Conversion goes through `U256` and an exact base-10 string before the
//! single final `f64` parse, so 18+ decimal tokens with large supplies keep
//! full precision up to the float rounding step.

use alloy::primitives::U256;
use tracing::warn;
use walletlens_common::chains::ChainDescriptor;
use walletlens_common::constants::NATIVE_DECIMALS;
use walletlens_common::error::{LensError, LensResult};
use walletlens_common::types::{NormalizedToken, RawTokenBalance};

/// Parse a `0x`-prefixed (or bare) hex quantity. `"0x"` reads as zero.
pub fn parse_hex_u256(hex: &str) -> LensResult<U256> {
    let trimmed = hex.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    if digits.is_empty() {
        return Ok(U256::ZERO);
    }
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(LensError::Conversion(format!("'{hex}' is not a hex quantity")));
    }
    U256::from_str_radix(digits, 16).map_err(|e| LensError::Conversion(format!("'{hex}': {e}")))
}

/// Place the decimal point `decimals` digits from the right of `digits`.
fn shift_decimal_point(digits: &str, decimals: usize) -> String {
    if decimals == 0 {
        return digits.to_string();
    }
    if digits.len() > decimals {
        let (int_part, frac_part) = digits.split_at(digits.len() - decimals);
        format!("{int_part}.{frac_part}")
    } else {
        format!("0.{}{digits}", "0".repeat(decimals - digits.len()))
    }
}

/// `value / 10^decimals` as `f64`, computed on the exact decimal expansion.
pub fn to_decimal(value: U256, decimals: u8) -> LensResult<f64> {
    let scaled = shift_decimal_point(&value.to_string(), decimals as usize);
    scaled
        .parse::<f64>()
        .map_err(|e| LensError::Conversion(format!("'{scaled}': {e}")))
}

/// Hex balance → decimal quantity.
pub fn hex_to_decimal(hex: &str, decimals: u8) -> LensResult<f64> {
    to_decimal(parse_hex_u256(hex)?, decimals)
}

/// Build the canonical token list for one chain.
///
/// The native asset comes first when its balance is positive. Contract
/// tokens keep provider order; any token that fails conversion or rounds to
/// zero is skipped without affecting the rest.
pub fn normalize_tokens(
    raw: &[RawTokenBalance],
    native_balance_hex: &str,
    chain: &ChainDescriptor,
) -> Vec<NormalizedToken> {
    let mut tokens = Vec::with_capacity(raw.len() + 1);

    match hex_to_decimal(native_balance_hex, NATIVE_DECIMALS) {
        Ok(balance) if balance > 0.0 => tokens.push(NormalizedToken {
            symbol: chain.native_symbol.to_string(),
            name: chain.native_name.to_string(),
            decimal_balance: balance,
            raw_balance_hex: native_balance_hex.to_string(),
            decimals: NATIVE_DECIMALS,
            is_native: true,
            contract_address: None,
            logo_url: None,
            price_usd: 0.0,
            value_usd: 0.0,
            change_24h_percent: 0.0,
        }),
        Ok(_) => {}
        Err(e) => warn!("native balance on {} not convertible: {e}", chain.key),
    }

    for token in raw {
        let decimals = token.decimals_or_default();
        match hex_to_decimal(&token.balance_hex, decimals) {
            Ok(balance) if balance > 0.0 => tokens.push(NormalizedToken {
                symbol: token.symbol_or_default().to_string(),
                name: token.name_or_default().to_string(),
                decimal_balance: balance,
                raw_balance_hex: token.balance_hex.clone(),
                decimals,
                is_native: false,
                contract_address: Some(token.contract_address.clone()),
                logo_url: token.logo_url.clone(),
                price_usd: 0.0,
                value_usd: 0.0,
                change_24h_percent: 0.0,
            }),
            Ok(_) => {}
            Err(e) => warn!(
                "skipping token {} on {}: {e}",
                token.contract_address, chain.key
            ),
        }
    }

    tokens
}
