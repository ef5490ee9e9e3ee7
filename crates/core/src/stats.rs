//! Transaction statistics over a wallet's transfer set.

use std::collections::HashSet;

use walletlens_common::types::{Statistics, Transfer};

pub fn compute_statistics(transfers: &[Transfer]) -> Statistics {
    let total = transfers.len();
    let failed = transfers.iter().filter(|t| t.is_failed()).count();
    let successful = total - failed;
    let success_rate_percent = if total > 0 {
        successful as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    let unique_contract_count = transfers
        .iter()
        .filter_map(|t| t.contract_address())
        .map(str::to_lowercase)
        .collect::<HashSet<_>>()
        .len();

    let mut ascending: Vec<&Transfer> = transfers.iter().collect();
    ascending.sort_by_key(|t| t.sort_key());

    Statistics {
        total_transactions: total,
        successful_count: successful,
        failed_count: failed,
        success_rate_percent,
        unique_contract_count,
        first_tx_timestamp: ascending.first().and_then(|t| t.timestamp()),
        last_tx_timestamp: ascending.last().and_then(|t| t.timestamp()),
    }
}
