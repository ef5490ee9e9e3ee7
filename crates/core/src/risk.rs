//! Wallet risk scoring.
//!
//! The score starts at 100 and moves through four independent checks, each
//! of which records a human-readable factor:
//!
//! ```text
//!   diversification   tokens < 3   → -20     tokens > 10  → +10
//!   activity          tx < 10      → -15     tx > 50      → +10
//!   reliability       success < 80 → -25     success > 95 → +5
//!   recency           no tx in 30d → -15     otherwise    → +5
//! ```
//!
//! The result is clamped to 0..=100. Higher is safer, so a score of 70+
//! maps to [`RiskLevel::Low`].

use chrono::{DateTime, Duration, Utc};
use walletlens_common::constants::RECENT_ACTIVITY_DAYS;
use walletlens_common::types::{RiskAssessment, RiskLevel, Statistics};

/// True when the last transaction falls inside the trailing activity window.
pub fn is_recently_active(stats: &Statistics, now: DateTime<Utc>) -> bool {
    stats
        .last_tx_timestamp
        .is_some_and(|last| now - last <= Duration::days(RECENT_ACTIVITY_DAYS))
}

pub fn assess_risk(stats: &Statistics, token_count: usize, now: DateTime<Utc>) -> RiskAssessment {
    let mut score: i32 = 100;
    let mut factors = Vec::new();

    if token_count < 3 {
        score -= 20;
        factors.push("Low portfolio diversification".to_string());
    } else if token_count > 10 {
        score += 10;
        factors.push("Good portfolio diversification".to_string());
    }

    if stats.total_transactions < 10 {
        score -= 15;
        factors.push("Low transaction activity".to_string());
    } else if stats.total_transactions > 50 {
        score += 10;
        factors.push("Active wallet".to_string());
    }

    if stats.success_rate_percent < 80.0 {
        score -= 25;
        factors.push("High failure rate on transactions".to_string());
    } else if stats.success_rate_percent > 95.0 {
        score += 5;
        factors.push("Excellent transaction success rate".to_string());
    }

    if is_recently_active(stats, now) {
        score += 5;
        factors.push("Recently active".to_string());
    } else {
        score -= 15;
        factors.push(format!("No recent activity ({RECENT_ACTIVITY_DAYS} days)"));
    }

    let score = score.clamp(0, 100) as u8;
    RiskAssessment {
        score,
        level: RiskLevel::from_score(score),
        factors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn stats(total: usize, success_rate: f64, last_days_ago: Option<i64>) -> Statistics {
        let failed = (total as f64 * (100.0 - success_rate) / 100.0).round() as usize;
        Statistics {
            total_transactions: total,
            successful_count: total - failed,
            failed_count: failed,
            success_rate_percent: success_rate,
            unique_contract_count: 0,
            first_tx_timestamp: last_days_ago.map(|d| now() - Duration::days(d + 100)),
            last_tx_timestamp: last_days_ago.map(|d| now() - Duration::days(d)),
        }
    }

    #[test]
    fn test_dormant_small_wallet() {
        // 2 tokens, 5 transfers all successful, last one 60 days ago.
        let risk = assess_risk(&stats(5, 100.0, Some(60)), 2, now());
        assert!(risk.factors.contains(&"Low portfolio diversification".to_string()));
        assert!(risk.factors.contains(&"Low transaction activity".to_string()));
        assert!(risk.factors.contains(&"No recent activity (30 days)".to_string()));
        // The perfect success rate still earns its +5.
        assert!(risk.factors.contains(&"Excellent transaction success rate".to_string()));
        assert_eq!(risk.score, 55);
        assert_eq!(risk.level, RiskLevel::Medium);
    }

    #[test]
    fn test_active_diversified_wallet_clamps() {
        let risk = assess_risk(&stats(60, 98.0, Some(1)), 12, now());
        assert_eq!(
            risk.factors,
            vec![
                "Good portfolio diversification",
                "Active wallet",
                "Excellent transaction success rate",
                "Recently active",
            ]
        );
        assert_eq!(risk.score, 100);
        assert_eq!(risk.level, RiskLevel::Low);
    }

    #[test]
    fn test_worst_case() {
        let risk = assess_risk(&stats(0, 0.0, None), 0, now());
        // 100 - 20 - 15 - 25 - 15
        assert_eq!(risk.score, 25);
        assert_eq!(risk.level, RiskLevel::High);
    }

    #[test]
    fn test_neutral_band_has_no_bonus() {
        // 5 tokens, 20 tx, 90% success: only the recency check fires.
        let risk = assess_risk(&stats(20, 90.0, Some(3)), 5, now());
        assert_eq!(risk.factors, vec!["Recently active"]);
        assert_eq!(risk.score, 100);
    }

    #[test]
    fn test_score_bounds_and_level_mapping() {
        for tokens in [0, 2, 5, 11] {
            for tx in [0, 9, 30, 51] {
                for rate in [0.0, 79.9, 90.0, 96.0] {
                    for last in [None, Some(1), Some(45)] {
                        let risk = assess_risk(&stats(tx, rate, last), tokens, now());
                        assert!(risk.score <= 100);
                        let expected = match risk.score {
                            70..=100 => RiskLevel::Low,
                            40..=69 => RiskLevel::Medium,
                            _ => RiskLevel::High,
                        };
                        assert_eq!(risk.level, expected);
                    }
                }
            }
        }
    }
}
