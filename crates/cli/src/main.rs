mod commands;
mod output;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use commands::config::KeyProvider;
use output::OutputFormat;

#[derive(Parser)]
#[command(
    name = "walletlens",
    about = "WalletLens — multi-chain EVM wallet analytics.\nPortfolio value, activity statistics, and a risk score for any address.",
    version,
    propagate_version = true
)]
struct Cli {
    #[arg(long, short = 'o', global = true, default_value = "table")]
    output: CliOutputFormat,

    /// Debug-level logging (overridden by RUST_LOG).
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat { Table, Json, JsonPretty }

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> OutputFormat {
        match f {
            CliOutputFormat::Table => OutputFormat::Table,
            CliOutputFormat::Json => OutputFormat::Json,
            CliOutputFormat::JsonPretty => OutputFormat::JsonPretty,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  TOP-LEVEL
// ═══════════════════════════════════════════════════════════════════════

#[derive(Subcommand)]
enum Commands {
    // ── ANALYTICS ───────────────────────────────────────────────

    /// Full single-chain report: portfolio, activity, risk, insights.
    Report {
        /// Wallet address (0x + 40 hex digits).
        address: String,
        /// Chain key or alias (eth, polygon, arb, op, base, bsc).
        #[arg(long, short = 'c')]
        chain: Option<String>,
    },

    /// Raw balances and transfers across several chains at once.
    Scan {
        address: String,
        /// Comma-separated chain keys; defaults to every supported chain.
        #[arg(long, value_delimiter = ',')]
        chains: Vec<String>,
    },

    // ── REFERENCE ───────────────────────────────────────────────

    /// List supported chains.
    Chains,

    /// Native asset USD price for a chain (e.g. `eth`, `bnb`, `polygon`).
    Price { target: String },

    // ── CONFIG ──────────────────────────────────────────────────

    /// Show or edit ~/.walletlens/config.toml.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Show the effective configuration.
    Show,
    /// Store an API key in the config file.
    SetKey { provider: KeyProvider, key: String },
}

// ═══════════════════════════════════════════════════════════════════════
//  ENTRYPOINT
// ═══════════════════════════════════════════════════════════════════════

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(command: Commands, fmt: OutputFormat) -> Result<()> {
    match command {
        Commands::Report { address, chain } => commands::report::run(&address, chain.as_deref(), fmt).await,
        Commands::Scan { address, chains } => commands::scan::run(&address, &chains, fmt).await,
        Commands::Chains => commands::chains::run(fmt),
        Commands::Price { target } => commands::price::run(&target, fmt).await,
        Commands::Config { action } => match action {
            ConfigAction::Show => commands::config::show(fmt),
            ConfigAction::SetKey { provider, key } => commands::config::set_key(provider, &key),
        },
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let fmt: OutputFormat = cli.output.into();

    let file_verbose = walletlens_core::workspace::load_config()
        .map(|c| c.system.verbose)
        .unwrap_or(false);
    init_tracing(cli.verbose || file_verbose);

    if let Err(err) = run(cli.command, fmt).await {
        std::process::exit(output::render_error(fmt, &err));
    }
}
