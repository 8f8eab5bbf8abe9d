//! Configuration schema definitions.
//!
//! The file describes the wallet connection plus the vaults and tokens the
//! agent knows by name, each with per-chain contract addresses:
//!
//! ```toml
//! [wallet]
//! rpc_url = "https://rpc.sepolia.mantle.xyz"
//!
//! [[vaults]]
//! name = "SozuHausResidentVault"
//!
//! [vaults.chains.5003]
//! contract_address = "0x28c52E6c053AD4F2727E2F8de2AD5B81139ca9D4"
//! ```

use std::collections::{BTreeMap, HashSet};

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};

/// Environment variable overriding `wallet.rpc_url`.
pub const PROVIDER_URL_ENV: &str = "EVM_PROVIDER_URL";

/// Environment variable overriding `wallet.private_key`.
pub const PRIVATE_KEY_ENV: &str = "EVM_PRIVATE_KEY";

/// Root configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VaultkitConfig {
    /// Wallet connection settings.
    #[serde(default)]
    pub wallet: WalletConfig,

    /// Vaults addressable by name.
    #[serde(default)]
    pub vaults: Vec<VaultDescriptor>,

    /// ERC-20 tokens addressable by symbol.
    #[serde(default)]
    pub tokens: Vec<TokenDescriptor>,
}

/// Wallet connection settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct WalletConfig {
    /// JSON-RPC endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rpc_url: Option<String>,

    /// Hex private key, with or without `0x`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
}

impl std::fmt::Debug for WalletConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WalletConfig")
            .field("rpc_url", &self.rpc_url)
            .field("private_key", &self.private_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A contract deployment on one chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDeployment {
    /// `0x` contract address.
    #[serde(alias = "contractAddress")]
    pub contract_address: String,
}

impl ChainDeployment {
    /// Parsed contract address, if well-formed.
    #[must_use]
    pub fn address(&self) -> Option<Address> {
        self.contract_address.trim().parse().ok()
    }
}

/// A named vault with its deployments, keyed by chain id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultDescriptor {
    /// Name the agent refers to the vault by.
    pub name: String,

    /// Deployments keyed by decimal chain id.
    #[serde(default)]
    pub chains: BTreeMap<String, ChainDeployment>,
}

impl VaultDescriptor {
    /// Create a descriptor with a single deployment.
    #[must_use]
    pub fn new(name: impl Into<String>, chain_id: u64, address: Address) -> Self {
        Self {
            name: name.into(),
            chains: single_deployment(chain_id, address),
        }
    }

    /// Address of the vault on `chain_id`.
    #[must_use]
    pub fn address_on(&self, chain_id: u64) -> Option<Address> {
        deployment_on(&self.chains, chain_id)
    }
}

/// An ERC-20 token with its deployments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDescriptor {
    /// Ticker symbol, e.g. `SHR`.
    pub symbol: String,

    /// Display name.
    #[serde(default)]
    pub name: String,

    /// Decimal places of the base unit.
    #[serde(default = "default_decimals")]
    pub decimals: u8,

    /// Deployments keyed by decimal chain id.
    #[serde(default)]
    pub chains: BTreeMap<String, ChainDeployment>,
}

const fn default_decimals() -> u8 {
    18
}

impl TokenDescriptor {
    /// Create a descriptor with a single deployment.
    #[must_use]
    pub fn new(
        symbol: impl Into<String>,
        name: impl Into<String>,
        decimals: u8,
        chain_id: u64,
        address: Address,
    ) -> Self {
        Self {
            symbol: symbol.into(),
            name: name.into(),
            decimals,
            chains: single_deployment(chain_id, address),
        }
    }

    /// Address of the token on `chain_id`.
    #[must_use]
    pub fn address_on(&self, chain_id: u64) -> Option<Address> {
        deployment_on(&self.chains, chain_id)
    }
}

fn single_deployment(chain_id: u64, address: Address) -> BTreeMap<String, ChainDeployment> {
    BTreeMap::from([(
        chain_id.to_string(),
        ChainDeployment {
            contract_address: address.to_checksum(None),
        },
    )])
}

fn deployment_on(chains: &BTreeMap<String, ChainDeployment>, chain_id: u64) -> Option<Address> {
    chains
        .get(&chain_id.to_string())
        .and_then(ChainDeployment::address)
}

impl VaultkitConfig {
    /// Validate the configuration and return any issues found.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        if self.wallet.rpc_url.as_deref().is_none_or(str::is_empty) {
            issues.push(ConfigIssue::warning(
                "wallet.rpc_url",
                format!("No RPC endpoint set. Set {PROVIDER_URL_ENV} env var."),
            ));
        }
        if self.wallet.private_key.as_deref().is_none_or(str::is_empty) {
            issues.push(ConfigIssue::warning(
                "wallet.private_key",
                format!("No private key set. Set {PRIVATE_KEY_ENV} env var."),
            ));
        }

        let mut names = HashSet::new();
        for (i, vault) in self.vaults.iter().enumerate() {
            let path = format!("vaults[{i}]");
            if vault.name.trim().is_empty() {
                issues.push(ConfigIssue::error(format!("{path}.name"), "Vault name is empty"));
            } else if !names.insert(vault.name.to_lowercase()) {
                issues.push(ConfigIssue::error(
                    format!("{path}.name"),
                    format!("Duplicate vault name '{}'", vault.name),
                ));
            }
            if vault.chains.is_empty() {
                issues.push(ConfigIssue::warning(
                    format!("{path}.chains"),
                    format!("Vault '{}' has no deployments", vault.name),
                ));
            }
            check_deployments(&mut issues, &path, &vault.chains);
        }

        let mut symbols = HashSet::new();
        for (i, token) in self.tokens.iter().enumerate() {
            let path = format!("tokens[{i}]");
            if token.symbol.trim().is_empty() {
                issues.push(ConfigIssue::error(
                    format!("{path}.symbol"),
                    "Token symbol is empty",
                ));
            } else if !symbols.insert(token.symbol.to_uppercase()) {
                issues.push(ConfigIssue::error(
                    format!("{path}.symbol"),
                    format!("Duplicate token symbol '{}'", token.symbol),
                ));
            }
            check_deployments(&mut issues, &path, &token.chains);
        }

        issues
    }

    /// Check if the configuration is valid (no errors).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.level != IssueLevel::Error)
    }

    /// Merge environment variables into the configuration.
    ///
    /// Environment values win over the file.
    #[must_use]
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var(PROVIDER_URL_ENV)
            && !url.is_empty()
        {
            self.wallet.rpc_url = Some(url);
        }
        if let Ok(key) = std::env::var(PRIVATE_KEY_ENV)
            && !key.is_empty()
        {
            self.wallet.private_key = Some(key);
        }
        self
    }
}

fn check_deployments(
    issues: &mut Vec<ConfigIssue>,
    path: &str,
    chains: &BTreeMap<String, ChainDeployment>,
) {
    for (chain, deployment) in chains {
        if chain.parse::<u64>().is_err() {
            issues.push(ConfigIssue::error(
                format!("{path}.chains.{chain}"),
                "Chain key must be a numeric chain id",
            ));
        }
        match deployment.address() {
            None => issues.push(ConfigIssue::error(
                format!("{path}.chains.{chain}.contract_address"),
                format!("'{}' is not a valid address", deployment.contract_address),
            )),
            Some(address) if address.is_zero() => issues.push(ConfigIssue::error(
                format!("{path}.chains.{chain}.contract_address"),
                "Contract address is the zero address",
            )),
            Some(_) => {}
        }
    }
}

/// Configuration validation issue.
#[derive(Debug, Clone)]
pub struct ConfigIssue {
    /// Issue severity level.
    pub level: IssueLevel,
    /// Configuration path (e.g., "vaults[0].name").
    pub path: String,
    /// Human-readable message.
    pub message: String,
}

impl ConfigIssue {
    /// Create an error-level issue.
    #[must_use]
    pub fn error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a warning-level issue.
    #[must_use]
    pub fn warning(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            path: path.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let prefix = match self.level {
            IssueLevel::Error => "ERROR",
            IssueLevel::Warning => "WARN",
        };
        write!(f, "[{prefix}] {}: {}", self.path, self.message)
    }
}

/// Severity level for configuration issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// The configuration cannot be used as is.
    Error,
    /// Usable, but something will fail later.
    Warning,
}
