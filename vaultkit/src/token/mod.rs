//! ERC-20 interactions for vault share and underlying tokens.
//!
//! A deposit pulls the underlying token from the depositor, so the vault
//! needs an allowance first; [`Erc20::approve`] grants it. Calls go
//! through the same [`EvmClient`] as the vault adapter.

use std::sync::Arc;

use alloy::primitives::{Address, U256};
use alloy::sol_types::SolCall;
use tracing::debug;

use crate::registry::VaultRegistry;
use crate::wallet::{ContractCall, EvmClient, WalletError};

pub mod tools;

/// Interface name recorded on every token [`ContractCall`].
pub const INTERFACE: &str = "IERC20";

/// Minimal ERC-20 ABI fragments.
mod abi {
    alloy::sol! {
        function balanceOf(address owner) external view returns (uint256);
        function approve(address spender, uint256 amount) external returns (bool);
        function transfer(address to, uint256 amount) external returns (bool);
        function allowance(address owner, address spender) external view returns (uint256);
        function decimals() external view returns (uint8);
        function symbol() external view returns (string);
    }
}

/// ERC-20 access through an [`EvmClient`].
#[derive(Debug, Clone)]
pub struct Erc20 {
    client: Arc<dyn EvmClient>,
    registry: Arc<VaultRegistry>,
}

impl Erc20 {
    /// Create with an empty registry.
    #[must_use]
    pub fn new(client: Arc<dyn EvmClient>) -> Self {
        Self {
            client,
            registry: Arc::default(),
        }
    }

    /// Use `registry` to resolve token symbols.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<VaultRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// The transport this helper calls through.
    #[must_use]
    pub fn client(&self) -> &Arc<dyn EvmClient> {
        &self.client
    }

    /// The registry used for symbol resolution.
    #[must_use]
    pub fn registry(&self) -> &VaultRegistry {
        &self.registry
    }

    /// Resolve a `0x` address or configured symbol on the client's chain.
    ///
    /// # Errors
    ///
    /// Returns a config error if the reference is malformed or unknown.
    pub fn resolve(&self, reference: &str) -> Result<Address, WalletError> {
        let reference = reference.trim();
        if reference.starts_with("0x") || reference.starts_with("0X") {
            return reference
                .parse()
                .map_err(|e| WalletError::config(format!("invalid token address '{reference}': {e}")));
        }
        let chain_id = self.client.chain_id();
        self.registry
            .token_address(reference, chain_id)
            .ok_or_else(|| {
                WalletError::config(format!("unknown token '{reference}' on chain {chain_id}"))
            })
    }

    /// Raw balance of `owner` (not adjusted for decimals).
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call or ABI decoding fails.
    pub async fn balance_of(&self, token: Address, owner: Address) -> Result<U256, WalletError> {
        self.read(token, &abi::balanceOfCall { owner }).await
    }

    /// Current allowance `owner` has granted `spender`.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call or ABI decoding fails.
    pub async fn allowance(
        &self,
        token: Address,
        owner: Address,
        spender: Address,
    ) -> Result<U256, WalletError> {
        self.read(token, &abi::allowanceCall { owner, spender }).await
    }

    /// Token decimals.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call or ABI decoding fails.
    pub async fn decimals(&self, token: Address) -> Result<u8, WalletError> {
        self.read(token, &abi::decimalsCall {}).await
    }

    /// Token symbol.
    ///
    /// # Errors
    ///
    /// Returns an error if the RPC call or ABI decoding fails.
    pub async fn symbol(&self, token: Address) -> Result<String, WalletError> {
        self.read(token, &abi::symbolCall {}).await
    }

    /// Approve `spender` to pull `amount` of `token` from the wallet.
    ///
    /// Returns the `0x`-prefixed transaction hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn approve(
        &self,
        token: Address,
        spender: Address,
        amount: U256,
    ) -> Result<String, WalletError> {
        let call = ContractCall::new(token, INTERFACE, &abi::approveCall { spender, amount });
        debug!(call = %call, "submitting approval");
        self.client.send_transaction(call).await
    }

    /// Transfer `amount` of `token` from the wallet to `to`.
    ///
    /// Returns the `0x`-prefixed transaction hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction fails.
    pub async fn transfer(
        &self,
        token: Address,
        to: Address,
        amount: U256,
    ) -> Result<String, WalletError> {
        let call = ContractCall::new(token, INTERFACE, &abi::transferCall { to, amount });
        debug!(call = %call, "submitting token transfer");
        self.client.send_transaction(call).await
    }

    async fn read<C: SolCall>(&self, token: Address, call: &C) -> Result<C::Return, WalletError> {
        let call = ContractCall::new(token, INTERFACE, call);
        let name = call.function_name().to_owned();
        let data = self.client.read(call).await?;
        C::abi_decode_returns(&data)
            .map_err(|e| WalletError::provider(format!("ERC-20 {name} decode failed: {e}")))
    }
}
