use anyhow::Result;
use walletlens_common::chains::CHAINS;
use walletlens_core::workspace;
use walletlens_core::Analyzer;

use crate::output::{render, OutputFormat, ScanOutput};

/// `walletlens scan <address> [--chains eth,base,...]`
///
/// Without `--chains` every registry chain is scanned.
pub async fn run(address: &str, chains: &[String], fmt: OutputFormat) -> Result<()> {
    let config = workspace::effective_config()?;
    let analyzer = Analyzer::from_config(&config)?;

    let keys: Vec<String> = if chains.is_empty() {
        CHAINS.iter().map(|c| c.key.to_string()).collect()
    } else {
        chains.iter().map(|c| c.trim().to_string()).collect()
    };

    let results = analyzer.scan(address, &keys).await?;
    render(
        fmt,
        &ScanOutput {
            address: address.to_string(),
            results,
        },
    )
}
