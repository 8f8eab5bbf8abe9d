//! Configuration management for vaultkit.
//!
//! Settings are layered from:
//! 1. Default values
//! 2. Config file (`~/.vaultkit/config.toml`, or `$VAULTKIT_CONFIG`)
//! 3. Environment variables (`EVM_PROVIDER_URL`, `EVM_PRIVATE_KEY`)

mod schema;

pub use schema::{
    ChainDeployment, ConfigIssue, IssueLevel, PRIVATE_KEY_ENV, PROVIDER_URL_ENV,
    TokenDescriptor, VaultDescriptor, VaultkitConfig, WalletConfig,
};

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::wallet::{EvmWallet, WalletError};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_PATH_ENV: &str = "VAULTKIT_CONFIG";

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// TOML serialization error.
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    /// Missing required field.
    #[error("missing required config: {0}")]
    MissingField(String),
    /// Invalid value.
    #[error("invalid config value: {0}")]
    InvalidValue(String),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".vaultkit")
}

/// Get the config file path, honoring `VAULTKIT_CONFIG`.
#[must_use]
pub fn config_path() -> PathBuf {
    std::env::var_os(CONFIG_PATH_ENV)
        .filter(|p| !p.is_empty())
        .map_or_else(|| default_config_dir().join("config.toml"), PathBuf::from)
}

/// Load configuration from the default path.
pub async fn load_config() -> ConfigResult<VaultkitConfig> {
    load_config_from(config_path()).await
}

/// Load configuration from a specific path.
///
/// A missing file yields the defaults.
pub async fn load_config_from(path: impl AsRef<Path>) -> ConfigResult<VaultkitConfig> {
    let path = path.as_ref();
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(VaultkitConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: VaultkitConfig = toml::from_str(&content)?;
    debug!(
        path = %path.display(),
        vaults = config.vaults.len(),
        tokens = config.tokens.len(),
        "loaded config file",
    );

    Ok(config)
}

/// Save configuration to a specific path.
pub async fn save_config_to(config: &VaultkitConfig, path: impl AsRef<Path>) -> ConfigResult<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    let content = toml::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    info!(path = %path.display(), "saved config file");

    Ok(())
}

/// Create a default config at `path` if none exists, then load it.
pub async fn init_config(path: impl AsRef<Path>) -> ConfigResult<VaultkitConfig> {
    let path = path.as_ref();
    if !path.exists() {
        save_config_to(&VaultkitConfig::default(), path).await?;
        info!("created default config at {}", path.display());
    }

    load_config_from(path).await
}

impl VaultkitConfig {
    /// Connect the configured wallet.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingField`] when the RPC endpoint or key is
    /// unset, or [`ConfigError::InvalidValue`] when the wallet cannot connect.
    pub async fn connect_wallet(&self) -> ConfigResult<EvmWallet> {
        let rpc_url = self
            .wallet
            .rpc_url
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ConfigError::MissingField(format!("wallet.rpc_url ({PROVIDER_URL_ENV})")))?;
        let key = self
            .wallet
            .private_key
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                ConfigError::MissingField(format!("wallet.private_key ({PRIVATE_KEY_ENV})"))
            })?;

        EvmWallet::from_private_key(key, rpc_url)
            .await
            .map_err(|e: WalletError| ConfigError::InvalidValue(e.to_string()))
    }
}
