use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::{debug, info};
use walletlens_types::config::AppConfig;

/// Dotfolder name under `$HOME`.
const DOTFOLDER: &str = ".walletlens";

const CONFIG_FILE: &str = "config.toml";

pub const ALCHEMY_KEY_ENV: &str = "ALCHEMY_API_KEY";
pub const COINGECKO_KEY_ENV: &str = "COINGECKO_API_KEY";

/// Resolve the root path: `$HOME/.walletlens/`.
pub fn root_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(DOTFOLDER))
}

pub fn config_path() -> Result<PathBuf> {
    Ok(root_dir()?.join(CONFIG_FILE))
}

/// Ensure `$HOME/.walletlens/config.toml` exists, seeding defaults on first
/// run. Idempotent.
pub fn init_workspace() -> Result<()> {
    let root = root_dir()?;
    init_workspace_at(&root)?;
    debug!("workspace ready at {}", root.display());
    Ok(())
}

pub fn init_workspace_at(root: &Path) -> Result<()> {
    if !root.exists() {
        fs::create_dir_all(root)
            .with_context(|| format!("Failed to create directory: {}", root.display()))?;
        info!("created directory: {}", root.display());
    }

    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
        save_config_to(&config_path, &AppConfig::default())?;
        info!("created default config: {}", config_path.display());
    }
    Ok(())
}

/// Load the config from the default location.
pub fn load_config() -> Result<AppConfig> {
    load_config_from(&config_path()?)
}

/// Load and validate a config file.
///
/// Unknown or missing fields fall back to defaults, so older files keep
/// loading after new settings are added.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let config = AppConfig::from_toml_str(&raw)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    if let Err(reason) = config.validate() {
        bail!("Invalid config in {}: {reason}", path.display());
    }
    Ok(config)
}

/// Write the config back to the default location.
pub fn save_config(config: &AppConfig) -> Result<()> {
    save_config_to(&config_path()?, config)
}

pub fn save_config_to(path: &Path, config: &AppConfig) -> Result<()> {
    let toml_str = config
        .to_toml_string()
        .context("Failed to serialize config")?;
    fs::write(path, &toml_str).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

/// Apply environment overrides (`.env` honored) on top of file values.
pub fn apply_env_overrides(config: &mut AppConfig) {
    let _ = dotenvy::dotenv();
    apply_overrides_from(config, |name| std::env::var(name).ok());
}

fn apply_overrides_from(config: &mut AppConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(key) = lookup(ALCHEMY_KEY_ENV).filter(|k| !k.trim().is_empty()) {
        config.provider.alchemy_api_key = Some(key);
    }
    if let Some(key) = lookup(COINGECKO_KEY_ENV).filter(|k| !k.trim().is_empty()) {
        config.pricing.coingecko_api_key = Some(key);
    }
}

/// Config as the pipeline sees it: file values, then environment.
pub fn effective_config() -> Result<AppConfig> {
    init_workspace()?;
    let mut config = load_config()?;
    apply_env_overrides(&mut config);
    Ok(config)
}
