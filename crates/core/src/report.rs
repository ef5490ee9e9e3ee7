//! Report assembly — a pure composition of the pipeline's outputs.

use chrono::{DateTime, Utc};
use serde::Serialize;
use walletlens_common::chains::ChainDescriptor;
use walletlens_common::constants::RECENT_TRANSACTIONS_IN_REPORT;
use walletlens_common::types::{
    NormalizedToken, RiskAssessment, Statistics, Transfer,
};

use crate::risk::{assess_risk, is_recently_active};
use crate::valuation::PortfolioValuation;

#[derive(Debug, Clone, Serialize)]
pub struct WalletReport {
    pub metadata: ReportMetadata,
    pub portfolio: PortfolioSection,
    pub activity: ActivitySection,
    pub risk: RiskAssessment,
    pub insights: Insights,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportMetadata {
    pub address: String,
    pub chain: String,
    pub chain_name: String,
    pub chain_id: u64,
    pub block_number: u64,
    pub explorer_url: String,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PortfolioSection {
    pub total_value: f64,
    pub total_change_24h: f64,
    pub total_change_percent: f64,
    pub token_count: usize,
    pub tokens: Vec<NormalizedToken>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ActivitySection {
    pub total_transactions: usize,
    pub successful_count: usize,
    pub failed_count: usize,
    pub success_rate_percent: f64,
    pub unique_contract_count: usize,
    pub first_tx_timestamp: Option<DateTime<Utc>>,
    pub last_tx_timestamp: Option<DateTime<Utc>>,
    /// Newest first.
    pub recent_transactions: Vec<Transfer>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExperienceLevel {
    Beginner,
    Intermediate,
    Advanced,
    Expert,
}

impl ExperienceLevel {
    pub fn from_tx_count(count: usize) -> Self {
        match count {
            c if c > 100 => ExperienceLevel::Expert,
            c if c > 50 => ExperienceLevel::Advanced,
            c if c > 10 => ExperienceLevel::Intermediate,
            _ => ExperienceLevel::Beginner,
        }
    }
}

impl std::fmt::Display for ExperienceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ExperienceLevel::Beginner => "Beginner",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Advanced => "Advanced",
            ExperienceLevel::Expert => "Expert",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Insights {
    /// Whole days since the first transaction; 0 without history.
    pub wallet_age_days: i64,
    pub is_active: bool,
    pub experience_level: ExperienceLevel,
}

/// Everything the assembler needs from one chain's pipeline run.
pub struct ReportInput<'a> {
    pub address: &'a str,
    pub chain: &'a ChainDescriptor,
    pub block_number: u64,
    pub valuation: PortfolioValuation,
    /// The wallet's transfers, newest first.
    pub transfers: &'a [Transfer],
    pub statistics: Statistics,
}

pub fn assemble_report(input: ReportInput<'_>, now: DateTime<Utc>) -> WalletReport {
    let ReportInput {
        address,
        chain,
        block_number,
        valuation,
        transfers,
        statistics: stats,
    } = input;

    let risk = assess_risk(&stats, valuation.token_count(), now);

    let insights = Insights {
        wallet_age_days: stats
            .first_tx_timestamp
            .map(|first| (now - first).num_days().max(0))
            .unwrap_or(0),
        is_active: is_recently_active(&stats, now),
        experience_level: ExperienceLevel::from_tx_count(stats.total_transactions),
    };

    WalletReport {
        metadata: ReportMetadata {
            address: address.to_string(),
            chain: chain.key.to_string(),
            chain_name: chain.display_name.to_string(),
            chain_id: chain.chain_id,
            block_number,
            explorer_url: chain.address_url(address),
            fetched_at: now,
        },
        portfolio: PortfolioSection {
            total_value: valuation.total_value,
            total_change_24h: valuation.total_change_24h,
            total_change_percent: valuation.total_change_percent,
            token_count: valuation.token_count(),
            tokens: valuation.tokens,
        },
        activity: ActivitySection {
            total_transactions: stats.total_transactions,
            successful_count: stats.successful_count,
            failed_count: stats.failed_count,
            success_rate_percent: stats.success_rate_percent,
            unique_contract_count: stats.unique_contract_count,
            first_tx_timestamp: stats.first_tx_timestamp,
            last_tx_timestamp: stats.last_tx_timestamp,
            recent_transactions: transfers
                .iter()
                .take(RECENT_TRANSACTIONS_IN_REPORT)
                .cloned()
                .collect(),
        },
        risk,
        insights,
    }
}
