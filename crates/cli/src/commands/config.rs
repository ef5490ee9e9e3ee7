use anyhow::Result;
use walletlens_core::workspace;

use crate::output::{render, ConfigOutput, OutputFormat};

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum KeyProvider {
    Alchemy,
    Coingecko,
}

/// Show only the edges of a secret.
fn mask(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(k) if k.len() <= 8 || !k.is_ascii() => "****".to_string(),
        Some(k) => format!("{}…{}", &k[..4], &k[k.len() - 4..]),
    }
}

/// `walletlens config show` — effective configuration, env overrides applied.
pub fn show(fmt: OutputFormat) -> Result<()> {
    let config = workspace::effective_config()?;
    let output = ConfigOutput {
        path: workspace::config_path()?.display().to_string(),
        verbose: config.system.verbose,
        default_chain: config.system.default_chain.clone(),
        alchemy_api_key: mask(config.provider.alchemy_api_key.as_deref()),
        coingecko_api_key: mask(config.pricing.coingecko_api_key.as_deref()),
        coingecko_pro: config.pricing.coingecko_pro,
        max_attempts: config.provider.max_attempts,
        retry_base_delay_ms: config.provider.retry_base_delay_ms,
        transfer_max_count: config.provider.transfer_max_count,
        metadata_concurrency: config.provider.metadata_concurrency,
        price_top_n: config.pricing.top_n,
        price_request_delay_ms: config.pricing.request_delay_ms,
    };
    render(fmt, &output)?;

    if fmt == OutputFormat::Table {
        println!();
        println!("Tip: ALCHEMY_API_KEY / COINGECKO_API_KEY in the environment override stored keys.");
    }
    Ok(())
}

/// `walletlens config set-key <alchemy|coingecko> <key>`
pub fn set_key(provider: KeyProvider, key: &str) -> Result<()> {
    let key = key.trim();
    if key.is_empty() {
        anyhow::bail!("API key must not be empty");
    }

    workspace::init_workspace()?;
    // File values only; env overrides are never written back.
    let mut config = workspace::load_config()?;
    match provider {
        KeyProvider::Alchemy => config.provider.alchemy_api_key = Some(key.to_string()),
        KeyProvider::Coingecko => config.pricing.coingecko_api_key = Some(key.to_string()),
    }
    workspace::save_config(&config)?;
    println!("✓ {provider:?} key saved ({})", mask(Some(key)));
    Ok(())
}
