use anyhow::Result;
use walletlens_common::chains::CHAINS;

use crate::output::{render, ChainRow, ChainsOutput, OutputFormat};

/// `walletlens chains` — list the chain registry.
pub fn run(fmt: OutputFormat) -> Result<()> {
    let chains = CHAINS
        .iter()
        .map(|c| ChainRow {
            key: c.key.to_string(),
            chain_id: c.chain_id,
            name: c.display_name.to_string(),
            native_symbol: c.native_symbol.to_string(),
            explorer_url: c.explorer_url.to_string(),
        })
        .collect();
    render(fmt, &ChainsOutput { chains })
}
