use anyhow::Result;
use walletlens_core::workspace;
use walletlens_core::Analyzer;

use crate::output::{render, OutputFormat};

/// `walletlens report <address> [--chain <selector>]`
pub async fn run(address: &str, chain: Option<&str>, fmt: OutputFormat) -> Result<()> {
    let config = workspace::effective_config()?;
    let analyzer = Analyzer::from_config(&config)?;

    let report = analyzer.analyze(address, chain).await?;
    render(fmt, &report)
}
