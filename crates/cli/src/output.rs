// Structured output types for JSON/table rendering.
//
// Every data-producing command returns one of these types.
// They all derive `Serialize` for JSON output, and implement
// `TableDisplay` for human-readable table rendering.

use serde::Serialize;
use walletlens_common::error::LensError;
use walletlens_core::fmt::{format_balance, format_percent, format_usd, short_address, truncate_str};
use walletlens_core::{ChainScanResult, WalletReport};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable table (default).
    Table,
    /// Compact JSON (for piping to jq, scripts).
    Json,
    /// Pretty-printed JSON (for reading).
    JsonPretty,
}

pub trait TableDisplay {
    fn print_table(&self);
}

/// Success envelope: `{"ok":true,"data":...}`.
#[derive(Serialize)]
struct ApiResponse<'a, T> {
    ok: bool,
    data: &'a T,
}

/// Render structured output — JSON or table depending on format.
pub fn render<T: Serialize + TableDisplay>(format: OutputFormat, data: &T) -> anyhow::Result<()> {
    let response = ApiResponse { ok: true, data };
    match format {
        OutputFormat::Table => data.print_table(),
        OutputFormat::Json => println!("{}", serde_json::to_string(&response)?),
        OutputFormat::JsonPretty => println!("{}", serde_json::to_string_pretty(&response)?),
    }
    Ok(())
}

/// Print an error the way the active format expects and return the exit code.
pub fn render_error(format: OutputFormat, err: &anyhow::Error) -> i32 {
    let fallback;
    let lens = match err.downcast_ref::<LensError>() {
        Some(lens) => lens,
        None => {
            fallback = LensError::Internal(format!("{err:#}"));
            &fallback
        }
    };

    match format {
        OutputFormat::Table => {
            eprintln!("Error: {lens}");
            for hint in lens.detail().hints {
                eprintln!("  hint: {hint}");
            }
        }
        OutputFormat::Json => println!("{}", lens.to_json()),
        OutputFormat::JsonPretty => println!(
            "{}",
            serde_json::to_string_pretty(&lens.to_json()).unwrap_or_default()
        ),
    }
    lens.exit_code()
}

// ─── Report ─────────────────────────────────────────────────────────

impl TableDisplay for WalletReport {
    fn print_table(&self) {
        let m = &self.metadata;
        let p = &self.portfolio;
        let a = &self.activity;
        let dash = "—".to_string();

        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║  WALLET REPORT                                           ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║  Address     : {:<42}║", m.address);
        println!("║  Chain       : {:<42}║", format!("{} ({})", m.chain_name, m.chain_id));
        println!("║  Block       : {:<42}║", m.block_number);
        println!("║  Fetched     : {:<42}║", m.fetched_at.format("%Y-%m-%d %H:%M:%S UTC").to_string());
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║  Total Value : {:<42}║", format_usd(p.total_value));
        println!(
            "║  24h Change  : {:<42}║",
            format!("{} ({})", format_usd(p.total_change_24h), format_percent(p.total_change_percent))
        );
        println!("║  Tokens      : {:<42}║", p.token_count);
        println!("╠══════════════════════════════════════════════════════════╣");

        if p.tokens.is_empty() {
            println!("║  No token holdings.                                      ║");
        } else {
            println!(
                "║  {:<8} │ {:>14} │ {:>12} │ {:>12} ║",
                "Token", "Balance", "Price", "Value"
            );
            println!("║  ─────────┼────────────────┼──────────────┼────────────── ║");
            for t in &p.tokens {
                let price = if t.price_usd > 0.0 { format_usd(t.price_usd) } else { dash.clone() };
                println!(
                    "║  {:<8} │ {:>14} │ {:>12} │ {:>12} ║",
                    truncate_str(&t.symbol, 8),
                    format_balance(t.decimal_balance),
                    price,
                    format_usd(t.value_usd),
                );
            }
        }

        println!("╠══════════════════════════════════════════════════════════╣");
        println!(
            "║  Transactions: {:<42}║",
            format!(
                "{} ({} ok, {} failed, {:.1}% success)",
                a.total_transactions, a.successful_count, a.failed_count, a.success_rate_percent
            )
        );
        println!("║  Contracts   : {:<42}║", a.unique_contract_count);
        println!(
            "║  First Tx    : {:<42}║",
            a.first_tx_timestamp.map(|t| t.format("%Y-%m-%d").to_string()).unwrap_or_else(|| dash.clone())
        );
        println!(
            "║  Last Tx     : {:<42}║",
            a.last_tx_timestamp.map(|t| t.format("%Y-%m-%d").to_string()).unwrap_or_else(|| dash.clone())
        );
        println!("╠══════════════════════════════════════════════════════════╣");
        println!(
            "║  Risk        : {:<42}║",
            format!("{}/100 ({} risk)", self.risk.score, self.risk.level)
        );
        for factor in &self.risk.factors {
            println!("║    • {:<52}║", factor);
        }
        println!(
            "║  Experience  : {:<42}║",
            format!(
                "{}, {} days old, {}",
                self.insights.experience_level,
                self.insights.wallet_age_days,
                if self.insights.is_active { "active" } else { "dormant" }
            )
        );
        println!("╚══════════════════════════════════════════════════════════╝");

        if !a.recent_transactions.is_empty() {
            println!();
            println!("Recent transactions:");
            for tx in &a.recent_transactions {
                let when = tx
                    .timestamp()
                    .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                    .unwrap_or_else(|| dash.clone());
                let amount = tx.value.map(format_balance).unwrap_or_else(|| dash.clone());
                let status = if tx.is_failed() { "✗" } else { "✓" };
                println!(
                    "  {status} {when}  {:>14} {:<8} {}",
                    amount,
                    tx.asset.as_deref().unwrap_or(""),
                    tx.hash.as_deref().map(short_address).unwrap_or_default(),
                );
            }
        }
    }
}

// ─── Scan ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ScanOutput {
    pub address: String,
    pub results: Vec<ChainScanResult>,
}

impl TableDisplay for ScanOutput {
    fn print_table(&self) {
        println!("Scan of {}", self.address);
        println!("┌────────────┬──────────┬──────────┬────────┬────────────────────────────┐");
        println!("│ Chain      │ Chain ID │ Tokens   │ Txs    │ Status                     │");
        println!("├────────────┼──────────┼──────────┼────────┼────────────────────────────┤");
        for r in &self.results {
            let (tokens, txs, status) = match (&r.snapshot, &r.error) {
                (Some(s), _) => (
                    s.tokens.len().to_string(),
                    s.transactions.len().to_string(),
                    "✓ ok".to_string(),
                ),
                (None, err) => (
                    "—".to_string(),
                    "—".to_string(),
                    format!("✗ {}", truncate_str(err.as_deref().unwrap_or("failed"), 24)),
                ),
            };
            println!(
                "│ {:<10} │ {:>8} │ {:>8} │ {:>6} │ {:<26} │",
                truncate_str(&r.chain, 10),
                r.chain_id,
                tokens,
                txs,
                status
            );
        }
        println!("└────────────┴──────────┴──────────┴────────┴────────────────────────────┘");
    }
}

// ─── Chains ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ChainRow {
    pub key: String,
    pub chain_id: u64,
    pub name: String,
    pub native_symbol: String,
    pub explorer_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChainsOutput {
    pub chains: Vec<ChainRow>,
}

impl TableDisplay for ChainsOutput {
    fn print_table(&self) {
        println!("┌──────────┬──────────┬────────────┬────────┬──────────────────────────────┐");
        println!("│ Key      │ Chain ID │ Name       │ Native │ Explorer                     │");
        println!("├──────────┼──────────┼────────────┼────────┼──────────────────────────────┤");
        for c in &self.chains {
            println!(
                "│ {:<8} │ {:>8} │ {:<10} │ {:<6} │ {:<28} │",
                c.key, c.chain_id, c.name, c.native_symbol, c.explorer_url
            );
        }
        println!("└──────────┴──────────┴────────────┴────────┴──────────────────────────────┘");
    }
}

// ─── Price ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct PriceOutput {
    pub chain: String,
    pub symbol: String,
    pub usd_price: f64,
    pub change_24h_percent: f64,
}

impl TableDisplay for PriceOutput {
    fn print_table(&self) {
        println!(
            "{} ({}): {}  {}",
            self.symbol,
            self.chain,
            format_usd(self.usd_price),
            format_percent(self.change_24h_percent)
        );
    }
}

// ─── Config ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub struct ConfigOutput {
    pub path: String,
    pub verbose: bool,
    pub default_chain: String,
    pub alchemy_api_key: String,
    pub coingecko_api_key: String,
    pub coingecko_pro: bool,
    pub max_attempts: u32,
    pub retry_base_delay_ms: u64,
    pub transfer_max_count: u32,
    pub metadata_concurrency: usize,
    pub price_top_n: usize,
    pub price_request_delay_ms: u64,
}

impl TableDisplay for ConfigOutput {
    fn print_table(&self) {
        println!("╔══════════════════════════════════════════════════════════╗");
        println!("║  WALLETLENS CONFIGURATION                                ║");
        println!("╠══════════════════════════════════════════════════════════╣");
        println!("║  Default chain : {:<40}║", self.default_chain);
        println!("║  Verbose       : {:<40}║", self.verbose);
        println!("║  Alchemy key   : {:<40}║", self.alchemy_api_key);
        println!(
            "║  CoinGecko key : {:<40}║",
            format!("{}{}", self.coingecko_api_key, if self.coingecko_pro { " (pro)" } else { "" })
        );
        println!("╠══════════════════════════════════════════════════════════╣");
        println!(
            "║  Retries       : {:<40}║",
            format!("{} attempts, {}ms base delay", self.max_attempts, self.retry_base_delay_ms)
        );
        println!("║  Transfers     : {:<40}║", format!("{} per direction", self.transfer_max_count));
        println!("║  Metadata      : {:<40}║", format!("{} concurrent lookups", self.metadata_concurrency));
        println!(
            "║  Pricing       : {:<40}║",
            format!("top {}, {}ms apart", self.price_top_n, self.price_request_delay_ms)
        );
        println!("╚══════════════════════════════════════════════════════════╝");
        println!("  {}", self.path);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chains_output_serializes() {
        let output = ChainsOutput {
            chains: vec![ChainRow {
                key: "base".into(),
                chain_id: 8453,
                name: "Base".into(),
                native_symbol: "ETH".into(),
                explorer_url: "https://basescan.org".into(),
            }],
        };
        let json = serde_json::to_string(&ApiResponse { ok: true, data: &output }).unwrap();
        assert!(json.starts_with("{\"ok\":true,\"data\":"));
        assert!(json.contains("\"chain_id\":8453"));
    }

    #[test]
    fn test_error_exit_code_from_lens_error() {
        let err = anyhow::Error::new(LensError::InvalidAddress("0x1".into()));
        assert_eq!(render_error(OutputFormat::Json, &err), 1);
        let err = anyhow::Error::new(LensError::ChainFetch {
            chain: "eth".into(),
            message: "HTTP 503".into(),
        });
        assert_eq!(render_error(OutputFormat::Json, &err), 2);
    }

    #[test]
    fn test_foreign_error_is_system() {
        let err = anyhow::anyhow!("disk on fire");
        assert_eq!(render_error(OutputFormat::Json, &err), 3);
    }
}
