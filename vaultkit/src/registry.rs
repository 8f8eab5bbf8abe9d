//! Name-to-address lookup for configured vaults and tokens.
//!
//! Vault names match case-insensitively and token symbols match
//! ignoring case. Lookups are always scoped to a chain id, so the same
//! name can point at different deployments on different chains.

use alloy::primitives::Address;

use crate::config::{TokenDescriptor, VaultDescriptor, VaultkitConfig};

/// Known vault and token deployments.
#[derive(Debug, Clone, Default)]
pub struct VaultRegistry {
    vaults: Vec<VaultDescriptor>,
    tokens: Vec<TokenDescriptor>,
}

impl VaultRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from the `[[vaults]]` and `[[tokens]]` tables.
    #[must_use]
    pub fn from_config(config: &VaultkitConfig) -> Self {
        Self {
            vaults: config.vaults.clone(),
            tokens: config.tokens.clone(),
        }
    }

    /// Add a vault.
    #[must_use]
    pub fn with_vault(mut self, vault: VaultDescriptor) -> Self {
        self.vaults.push(vault);
        self
    }

    /// Add a token.
    #[must_use]
    pub fn with_token(mut self, token: TokenDescriptor) -> Self {
        self.tokens.push(token);
        self
    }

    /// All configured vaults.
    #[must_use]
    pub fn vaults(&self) -> &[VaultDescriptor] {
        &self.vaults
    }

    /// All configured tokens.
    #[must_use]
    pub fn tokens(&self) -> &[TokenDescriptor] {
        &self.tokens
    }

    /// Find a vault by name.
    #[must_use]
    pub fn vault(&self, name: &str) -> Option<&VaultDescriptor> {
        let name = name.trim();
        self.vaults
            .iter()
            .find(|v| v.name.eq_ignore_ascii_case(name))
    }

    /// Address of the vault called `name` on `chain_id`.
    #[must_use]
    pub fn vault_address(&self, name: &str, chain_id: u64) -> Option<Address> {
        self.vault(name).and_then(|v| v.address_on(chain_id))
    }

    /// Find a token by symbol.
    #[must_use]
    pub fn token(&self, symbol: &str) -> Option<&TokenDescriptor> {
        let symbol = symbol.trim();
        self.tokens
            .iter()
            .find(|t| t.symbol.eq_ignore_ascii_case(symbol))
    }

    /// Address of the token `symbol` on `chain_id`.
    #[must_use]
    pub fn token_address(&self, symbol: &str, chain_id: u64) -> Option<Address> {
        self.token(symbol).and_then(|t| t.address_on(chain_id))
    }

    /// The configured token deployed at `address` on `chain_id`, if any.
    #[must_use]
    pub fn token_at(&self, address: Address, chain_id: u64) -> Option<&TokenDescriptor> {
        self.tokens
            .iter()
            .find(|t| t.address_on(chain_id) == Some(address))
    }
}
